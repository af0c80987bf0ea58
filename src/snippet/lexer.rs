//! Tokenizer for snippet bodies.

use tracing::trace;

use super::SnippetError;

/// A lexical token with the 1-based body line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // Keywords
    True,
    False,
    None,
    And,
    Or,
    Not,
    If,
    Else,
    Return,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Assign,
    LParen,
    RParen,
    Comma,

    // Statement separators
    Newline,
    Semicolon,
    Eof,
}

impl TokenKind {
    /// Short human-readable name used in syntax errors.
    pub fn describe(&self) -> String {
        match self {
            Self::Int(v) => format!("integer {v}"),
            Self::Float(v) => format!("float {v:?}"),
            Self::Str(_) => "string literal".to_string(),
            Self::Ident(name) => format!("name '{name}'"),
            Self::Newline => "end of line".to_string(),
            Self::Eof => "end of snippet".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    const fn symbol(&self) -> &'static str {
        match self {
            Self::True => "True",
            Self::False => "False",
            Self::None => "None",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::If => "if",
            Self::Else => "else",
            Self::Return => "return",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::StarStar => "**",
            Self::Slash => "/",
            Self::SlashSlash => "//",
            Self::Percent => "%",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Assign => "=",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Comma => ",",
            Self::Semicolon => ";",
            _ => "?",
        }
    }
}

/// Splits a snippet body into tokens.
///
/// Newlines inside parentheses are dropped so long calls can wrap across
/// lines. `#` starts a comment running to the end of the line.
pub fn tokenize(body: &str) -> Result<Vec<Token>, SnippetError> {
    let chars: Vec<char> = body.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line = 1;
    let mut depth = 0usize;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            '\n' => {
                if depth == 0 {
                    tokens.push(Token { kind: TokenKind::Newline, line });
                }
                line += 1;
                pos += 1;
            }
            ' ' | '\t' | '\r' => pos += 1,
            '#' => {
                while pos < chars.len() && chars[pos] != '\n' {
                    pos += 1;
                }
            }
            '0'..='9' | '.'
                if c != '.' || chars.get(pos + 1).is_some_and(|n| n.is_ascii_digit()) =>
            {
                let (kind, next) = lex_number(&chars, pos, line)?;
                tokens.push(Token { kind, line });
                pos = next;
            }
            '\'' | '"' => {
                let (text, next) = lex_string(&chars, pos, line)?;
                tokens.push(Token { kind: TokenKind::Str(text), line });
                pos = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                let word: String = chars[start..pos].iter().collect();
                tokens.push(Token { kind: keyword_or_ident(word), line });
            }
            _ => {
                let next = chars.get(pos + 1).copied();
                let (kind, width) = match (c, next) {
                    ('*', Some('*')) => (TokenKind::StarStar, 2),
                    ('/', Some('/')) => (TokenKind::SlashSlash, 2),
                    ('=', Some('=')) => (TokenKind::EqEq, 2),
                    ('!', Some('=')) => (TokenKind::NotEq, 2),
                    ('<', Some('=')) => (TokenKind::LtEq, 2),
                    ('>', Some('=')) => (TokenKind::GtEq, 2),
                    ('+', _) => (TokenKind::Plus, 1),
                    ('-', _) => (TokenKind::Minus, 1),
                    ('*', _) => (TokenKind::Star, 1),
                    ('/', _) => (TokenKind::Slash, 1),
                    ('%', _) => (TokenKind::Percent, 1),
                    ('<', _) => (TokenKind::Lt, 1),
                    ('>', _) => (TokenKind::Gt, 1),
                    ('=', _) => (TokenKind::Assign, 1),
                    (',', _) => (TokenKind::Comma, 1),
                    (';', _) => (TokenKind::Semicolon, 1),
                    ('(', _) => {
                        depth += 1;
                        (TokenKind::LParen, 1)
                    }
                    (')', _) => {
                        depth = depth.saturating_sub(1);
                        (TokenKind::RParen, 1)
                    }
                    _ => {
                        return Err(SnippetError::Syntax {
                            line,
                            message: format!("unexpected character '{c}'"),
                        });
                    }
                };
                tokens.push(Token { kind, line });
                pos += width;
            }
        }
    }

    if depth > 0 {
        return Err(SnippetError::Syntax {
            line,
            message: "unclosed '('".to_string(),
        });
    }

    tokens.push(Token { kind: TokenKind::Eof, line });
    trace!(count = tokens.len(), "Tokenized snippet body");
    Ok(tokens)
}

fn keyword_or_ident(word: String) -> TokenKind {
    match word.as_str() {
        "True" => TokenKind::True,
        "False" => TokenKind::False,
        "None" => TokenKind::None,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "return" => TokenKind::Return,
        _ => TokenKind::Ident(word),
    }
}

fn lex_number(
    chars: &[char],
    start: usize,
    line: usize,
) -> Result<(TokenKind, usize), SnippetError> {
    let mut pos = start;
    let mut is_float = false;

    while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '_') {
        pos += 1;
    }
    if pos < chars.len() && chars[pos] == '.' {
        is_float = true;
        pos += 1;
        while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '_') {
            pos += 1;
        }
    }
    if pos < chars.len() && matches!(chars[pos], 'e' | 'E') {
        let mut exp_pos = pos + 1;
        if exp_pos < chars.len() && matches!(chars[exp_pos], '+' | '-') {
            exp_pos += 1;
        }
        if exp_pos < chars.len() && chars[exp_pos].is_ascii_digit() {
            is_float = true;
            pos = exp_pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }

    let literal: String = chars[start..pos].iter().filter(|c| **c != '_').collect();
    let kind = if is_float {
        literal.parse::<f64>().map(TokenKind::Float).map_err(|_| SnippetError::Syntax {
            line,
            message: format!("invalid float literal '{literal}'"),
        })?
    } else {
        literal.parse::<i64>().map(TokenKind::Int).map_err(|_| SnippetError::Syntax {
            line,
            message: format!("integer literal '{literal}' is out of range"),
        })?
    };
    Ok((kind, pos))
}

/// Returns the unescaped text and the position after the closing quote.
/// String literals never span lines.
fn lex_string(chars: &[char], start: usize, line: usize) -> Result<(String, usize), SnippetError> {
    let quote = chars[start];
    let mut pos = start + 1;
    let mut text = String::new();

    while pos < chars.len() {
        match chars[pos] {
            c if c == quote => return Ok((text, pos + 1)),
            '\n' => break,
            '\\' => {
                let escaped = chars.get(pos + 1).copied().ok_or_else(|| SnippetError::Syntax {
                    line,
                    message: "unterminated string literal".to_string(),
                })?;
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
                pos += 2;
            }
            c => {
                text.push(c);
                pos += 1;
            }
        }
    }

    Err(SnippetError::Syntax {
        line,
        message: "unterminated string literal".to_string(),
    })
}
