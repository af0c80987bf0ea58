//! Recursive-descent parser producing the snippet AST.

use super::lexer::{Token, TokenKind};
use super::{SnippetError, Value};

/// One statement of a snippet body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { name: String, value: Expr, line: usize },
    Return { value: Option<Expr>, line: usize },
    Expr { expr: Expr, line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

/// Functions callable from a snippet. Anything else is rejected at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Abs,
    Min,
    Max,
    Round,
    Len,
    Str,
    Int,
    Float,
    Bool,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => Self::Abs,
            "min" => Self::Min,
            "max" => Self::Max,
            "round" => Self::Round,
            "len" => Self::Len,
            "str" => Self::Str,
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
            Self::Round => "round",
            Self::Len => "len",
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Name {
        name: String,
        line: usize,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        line: usize,
    },
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        line: usize,
    },
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        line: usize,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        function: Builtin,
        args: Vec<Expr>,
        line: usize,
    },
}

/// Parses a token stream (ending in `Eof`) into statements.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, SnippetError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    parser.program()
}

/// Deepest expression nesting a snippet may use. Parentheses, unary and
/// `not` operators, and operator chains each count a level.
pub const MAX_NESTING: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn line(&self) -> usize {
        self.tokens[self.pos].line
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, context: &str) -> Result<(), SnippetError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(context))
        }
    }

    fn unexpected(&self, context: &str) -> SnippetError {
        SnippetError::Syntax {
            line: self.line(),
            message: format!("unexpected {} {context}", self.peek().describe()),
        }
    }

    fn at_separator(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn program(&mut self) -> Result<Vec<Stmt>, SnippetError> {
        let mut stmts = Vec::new();
        self.skip_separators();
        while *self.peek() != TokenKind::Eof {
            stmts.push(self.statement()?);
            if !self.at_separator() {
                return Err(self.unexpected("after statement"));
            }
            self.skip_separators();
        }
        Ok(stmts)
    }

    fn statement(&mut self) -> Result<Stmt, SnippetError> {
        let line = self.line();

        if self.eat(&TokenKind::Return) {
            let value = if self.at_separator() {
                None
            } else {
                Some(self.expression()?)
            };
            return Ok(Stmt::Return { value, line });
        }

        if let (TokenKind::Ident(name), TokenKind::Assign) = (self.peek(), self.peek_at(1)) {
            let name = name.clone();
            self.advance();
            self.advance();
            let value = self.expression()?;
            return Ok(Stmt::Assign { name, value, line });
        }

        let expr = self.expression()?;
        if *self.peek() == TokenKind::Assign {
            return Err(SnippetError::Syntax {
                line: self.line(),
                message: "can only assign to a plain name".to_string(),
            });
        }
        Ok(Stmt::Expr { expr, line })
    }

    fn descend(&mut self) -> Result<(), SnippetError> {
        if self.depth >= MAX_NESTING {
            return Err(SnippetError::Syntax {
                line: self.line(),
                message: format!("expression nested more than {MAX_NESTING} levels deep"),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr, SnippetError> {
        self.descend()?;
        let expr = self.conditional()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn conditional(&mut self) -> Result<Expr, SnippetError> {
        let then = self.or_expr()?;
        if self.eat(&TokenKind::If) {
            let cond = self.or_expr()?;
            self.expect(&TokenKind::Else, "in conditional expression, expected 'else'")?;
            let otherwise = self.expression()?;
            return Ok(Expr::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }
        Ok(then)
    }

    fn or_expr(&mut self) -> Result<Expr, SnippetError> {
        let mark = self.depth;
        let mut lhs = self.and_expr()?;
        while self.eat(&TokenKind::Or) {
            self.descend()?;
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        self.depth = mark;
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, SnippetError> {
        let mark = self.depth;
        let mut lhs = self.not_expr()?;
        while self.eat(&TokenKind::And) {
            self.descend()?;
            let rhs = self.not_expr()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        self.depth = mark;
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr, SnippetError> {
        if self.eat(&TokenKind::Not) {
            self.descend()?;
            let operand = self.not_expr()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.comparison()
    }

    fn compare_op(&self) -> Option<CompareOp> {
        Some(match self.peek() {
            TokenKind::EqEq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::LtEq => CompareOp::LtEq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::GtEq => CompareOp::GtEq,
            _ => return None,
        })
    }

    fn comparison(&mut self) -> Result<Expr, SnippetError> {
        let lhs = self.sum()?;
        let Some(op) = self.compare_op() else {
            return Ok(lhs);
        };
        let line = self.line();
        self.advance();
        let rhs = self.sum()?;
        if self.compare_op().is_some() {
            return Err(SnippetError::Syntax {
                line: self.line(),
                message: "chained comparisons are not supported; combine them with 'and'"
                    .to_string(),
            });
        }
        Ok(Expr::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            line,
        })
    }

    fn sum(&mut self) -> Result<Expr, SnippetError> {
        let mark = self.depth;
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let line = self.line();
            self.advance();
            self.descend()?;
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs, line);
        }
        self.depth = mark;
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, SnippetError> {
        let mark = self.depth;
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::SlashSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let line = self.line();
            self.advance();
            self.descend()?;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs, line);
        }
        self.depth = mark;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, SnippetError> {
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.power(),
        };
        let line = self.line();
        self.advance();
        self.descend()?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            line,
        })
    }

    fn power(&mut self) -> Result<Expr, SnippetError> {
        let base = self.primary()?;
        if *self.peek() == TokenKind::StarStar {
            let line = self.line();
            self.advance();
            // Right-associative, and binds tighter than a unary minus on its left.
            self.descend()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(binary(BinaryOp::Pow, base, exponent, line));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, SnippetError> {
        let token = self.advance();
        let line = token.line;
        match token.kind {
            TokenKind::Int(v) => Ok(Expr::Literal(Value::Int(v))),
            TokenKind::Float(v) => Ok(Expr::Literal(Value::Float(v))),
            TokenKind::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            TokenKind::True => Ok(Expr::Literal(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Value::Bool(false))),
            TokenKind::None => Ok(Expr::Literal(Value::None)),
            TokenKind::LParen => {
                let inner = self.expression()?;
                self.expect(&TokenKind::RParen, "inside parentheses, expected ')'")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if *self.peek() != TokenKind::LParen {
                    return Ok(Expr::Name { name, line });
                }
                let function =
                    Builtin::from_name(&name).ok_or(SnippetError::UnknownFunction { line, name })?;
                self.advance();
                let args = self.arguments()?;
                Ok(Expr::Call {
                    function,
                    args,
                    line,
                })
            }
            other => Err(SnippetError::Syntax {
                line,
                message: format!("expected an expression, found {}", other.describe()),
            }),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, SnippetError> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&TokenKind::RParen) {
                return Ok(args);
            }
            self.expect(&TokenKind::Comma, "in argument list, expected ',' or ')'")?;
            // Trailing comma
            if self.eat(&TokenKind::RParen) {
                return Ok(args);
            }
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, line: usize) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        line,
    }
}
