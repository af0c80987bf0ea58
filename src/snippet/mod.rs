//! Executable snippet values.
//!
//! A [`Snippet`] is a configuration value that can be called like a function.
//! Its parameter list is fixed by the schema; only the body text is stored in
//! the config file, between `"""` markers.
//!
//! Bodies are written in a small, Python-flavoured statement language:
//!
//! ```text
//! total = a + b          # assignment
//! bonus = 10 if total > 100 else 0
//! return round(total * 1.1 + bonus, 2)
//! ```
//!
//! Statements are separated by newlines or `;`. Indentation is ignored.
//! Supported: `name = expr`, `return [expr]`, bare expressions, arithmetic
//! (`+ - * / // % **`), comparisons, `and`/`or`/`not`, conditional
//! expressions and the builtins `abs min max round len str int float bool`.
//! A body without `return` evaluates to `None`.
//!
//! Snippet bodies are trusted input written by whoever controls the config
//! file. They are checked for syntax and unbound names when compiled; nothing
//! else is sandboxed beyond what the language itself lacks (no I/O, no loops).

mod eval;
mod lexer;
mod parser;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use parser::{Expr, Stmt};

/// Marker that opens and closes a snippet body in the config file.
pub const SNIPPET_DELIMITER: &str = "\"\"\"";

/// Errors raised while compiling or calling a snippet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnippetError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("invalid parameter name '{0}'")]
    InvalidParam(String),

    #[error("parameter '{0}' is listed twice")]
    DuplicateParam(String),

    #[error("line {line}: name '{name}' is not a parameter and is never assigned")]
    UndefinedName { line: usize, name: String },

    #[error("line {line}: unknown function '{name}'")]
    UnknownFunction { line: usize, name: String },

    #[error("expected {expected} argument(s) ({params}), got {actual}")]
    Arity {
        expected: usize,
        actual: usize,
        params: String,
    },

    #[error("line {line}: {message}")]
    Type { line: usize, message: String },

    #[error("line {line}: division by zero")]
    DivisionByZero { line: usize },

    #[error("line {line}: integer overflow")]
    Overflow { line: usize },

    #[error("line {line}: local '{name}' referenced before assignment")]
    UnboundLocal { line: usize, name: String },
}

/// A runtime value produced or consumed by a snippet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Python-style truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(v) => *v != 0,
            Self::Float(v) => *v != 0.0,
            Self::Str(s) => !s.is_empty(),
        }
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
        }
    }

    /// Parses a single literal the way a snippet would read it.
    ///
    /// Accepts `None`, `True`, `False`, integers, floats and quoted strings.
    /// Anything else is taken as a bare string, so `F1` becomes `"F1"`.
    pub fn parse_literal(text: &str) -> Self {
        let text = text.trim();
        match text {
            "None" => return Self::None,
            "True" => return Self::Bool(true),
            "False" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(v) = text.parse::<i64>() {
            return Self::Int(v);
        }
        if text.contains(|c: char| c.is_ascii_digit()) {
            if let Ok(v) = text.parse::<f64>() {
                return Self::Float(v);
            }
        }
        if let Ok(tokens) = lexer::tokenize(text) {
            if let [token, eof] = tokens.as_slice() {
                if let (lexer::TokenKind::Str(s), lexer::TokenKind::Eof) =
                    (&token.kind, &eof.kind)
                {
                    return Self::Str(s.clone());
                }
            }
        }
        Self::Str(text.to_string())
    }
}

/// Renders floats so they always read back as floats (`1.0`, not `1`).
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// A compiled, callable configuration value.
#[derive(Clone)]
pub struct Snippet {
    body: String,
    params: Vec<String>,
    program: Vec<Stmt>,
}

impl Snippet {
    /// Compiles `body` into a callable taking exactly `params`.
    ///
    /// # Errors
    ///
    /// Fails on a malformed parameter list, a syntax error, a call to an
    /// unknown function, or a name that is neither a parameter nor assigned
    /// anywhere in the body.
    #[instrument(skip_all, fields(body_len = body.as_ref().len(), params = ?params))]
    pub fn new<B, P>(body: B, params: &[P]) -> Result<Self, SnippetError>
    where
        B: AsRef<str>,
        P: AsRef<str> + fmt::Debug,
    {
        let body = body.as_ref().to_string();
        let params: Vec<String> = params.iter().map(|p| p.as_ref().to_string()).collect();

        let mut seen = HashSet::new();
        for param in &params {
            if !is_identifier(param) || lexer_keyword(param) {
                return Err(SnippetError::InvalidParam(param.clone()));
            }
            if !seen.insert(param.as_str()) {
                return Err(SnippetError::DuplicateParam(param.clone()));
            }
        }

        if let Some(offset) = body.find(SNIPPET_DELIMITER) {
            let line = body[..offset].matches('\n').count() + 1;
            return Err(SnippetError::Syntax {
                line,
                message: format!("a body cannot contain the {SNIPPET_DELIMITER} marker"),
            });
        }

        let program = parser::parse(lexer::tokenize(&body)?)?;
        check_names(&program, &params)?;
        debug!(statements = program.len(), "Compiled snippet");

        Ok(Self {
            body,
            params,
            program,
        })
    }

    /// Raw body text as stored between the delimiters.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parameter names, in call order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Invokes the snippet with positional arguments.
    ///
    /// # Errors
    ///
    /// Fails when the argument count does not match the parameter list, or
    /// when evaluation hits a type error, division by zero or overflow.
    pub fn call(&self, args: &[Value]) -> Result<Value, SnippetError> {
        if args.len() != self.params.len() {
            return Err(SnippetError::Arity {
                expected: self.params.len(),
                actual: args.len(),
                params: self.params.join(", "),
            });
        }
        let locals: HashMap<String, Value> = self
            .params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect();
        trace!(params = ?self.params, "Calling snippet");
        eval::run(&self.program, locals)
    }
}

impl fmt::Debug for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snippet")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Snippet {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body && self.params == other.params
    }
}

/// Serialized form used in the config file: the delimited body.
impl fmt::Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SNIPPET_DELIMITER}{}{SNIPPET_DELIMITER}", self.body)
    }
}

impl Serialize for Snippet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Snippet", 2)?;
        state.serialize_field("body", &self.body)?;
        state.serialize_field("params", &self.params)?;
        state.end()
    }
}

/// True for `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn lexer_keyword(name: &str) -> bool {
    matches!(
        name,
        "True" | "False" | "None" | "and" | "or" | "not" | "if" | "else" | "return"
    )
}

/// Rejects names that can never be bound: not a parameter and never assigned.
fn check_names(program: &[Stmt], params: &[String]) -> Result<(), SnippetError> {
    let mut bound: HashSet<&str> = params.iter().map(String::as_str).collect();
    for stmt in program {
        if let Stmt::Assign { name, .. } = stmt {
            bound.insert(name.as_str());
        }
    }

    for stmt in program {
        match stmt {
            Stmt::Assign { value: expr, .. } | Stmt::Expr { expr, .. } => check_expr(expr, &bound)?,
            Stmt::Return { value: Some(expr), .. } => check_expr(expr, &bound)?,
            Stmt::Return { value: None, .. } => {}
        }
    }
    Ok(())
}

fn check_expr(expr: &Expr, bound: &HashSet<&str>) -> Result<(), SnippetError> {
    match expr {
        Expr::Literal(_) => Ok(()),
        Expr::Name { name, line } => {
            if bound.contains(name.as_str()) {
                Ok(())
            } else {
                Err(SnippetError::UndefinedName {
                    line: *line,
                    name: name.clone(),
                })
            }
        }
        Expr::Unary { operand, .. } | Expr::Not(operand) => check_expr(operand, bound),
        Expr::Binary { lhs, rhs, .. }
        | Expr::Compare { lhs, rhs, .. }
        | Expr::And(lhs, rhs)
        | Expr::Or(lhs, rhs) => {
            check_expr(lhs, bound)?;
            check_expr(rhs, bound)
        }
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => {
            check_expr(cond, bound)?;
            check_expr(then, bound)?;
            check_expr(otherwise, bound)
        }
        Expr::Call { args, .. } => args.iter().try_for_each(|arg| check_expr(arg, bound)),
    }
}
