//! Typed configuration values and their text form.

use std::fmt;

use serde::Serialize;

use crate::error::{ConfError, Result};
use crate::snippet::{self, Snippet, Value};

/// A plain configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
        }
    }

    /// Reads `text` as a value of the same kind as `self`.
    ///
    /// Booleans are an exact match on `True`; any other text is false.
    /// Returns `None` when an int or float does not parse.
    pub fn parse_same_kind(&self, text: &str) -> Option<Self> {
        match self {
            Self::Bool(_) => Some(Self::Bool(text == "True")),
            Self::Int(_) => text.parse().ok().map(Self::Int),
            Self::Float(_) => text.parse().ok().map(Self::Float),
            Self::Str(_) => Some(Self::Str(text.to_string())),
        }
    }

    /// Why this value would not read back unchanged from a config file.
    ///
    /// Only strings can fail: the file stores them bare on one line, trimmed,
    /// up to the next `=`.
    pub fn unrepresentable_reason(&self) -> Option<&'static str> {
        let Self::Str(s) = self else {
            return None;
        };
        if s.contains(['\n', '\r']) {
            Some("it spans more than one line")
        } else if s.contains(snippet::SNIPPET_DELIMITER) {
            Some("it contains the snippet marker \"\"\"")
        } else if s.contains('=') {
            Some("it contains '='")
        } else if s.trim() != s {
            Some("it has leading or trailing whitespace")
        } else {
            None
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&snippet::format_float(*v)),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&Scalar> for Value {
    fn from(scalar: &Scalar) -> Self {
        match scalar {
            Scalar::Bool(v) => Self::Bool(*v),
            Scalar::Int(v) => Self::Int(*v),
            Scalar::Float(v) => Self::Float(*v),
            Scalar::Str(v) => Self::Str(v.clone()),
        }
    }
}

/// A configuration value: either a scalar or a callable snippet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Scalar(Scalar),
    Snippet(Snippet),
}

impl ConfigValue {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(scalar) => scalar.kind(),
            Self::Snippet(_) => "snippet",
        }
    }

    /// Suffix appended to an entry's comment when it is declared.
    pub fn comment_suffix(&self) -> String {
        match self {
            Self::Scalar(scalar) => format!("(DEFAULT: {scalar})"),
            Self::Snippet(snippet) => format!("(PARAMS: {})", snippet.params().join(", ")),
        }
    }

    /// Builds the value for `key` from scalar file text, using `self` (the
    /// declared default) to pick the type.
    pub(crate) fn coerce_scalar_text(&self, key: &str, text: &str) -> Result<Self> {
        let coercion_error = || ConfError::Coercion {
            key: key.to_string(),
            kind: self.kind(),
            text: text.to_string(),
        };
        match self {
            Self::Scalar(default) => default
                .parse_same_kind(text)
                .map(Self::Scalar)
                .ok_or_else(coercion_error),
            Self::Snippet(_) => Err(coercion_error()),
        }
    }

    /// Builds the value for `key` from a snippet body, reusing the declared
    /// default's parameter list.
    pub(crate) fn compile_snippet_text(&self, key: &str, body: &str) -> Result<Self> {
        match self {
            Self::Snippet(default) => Snippet::new(body, default.params())
                .map(Self::Snippet)
                .map_err(|source| ConfError::Compile {
                    key: key.to_string(),
                    source,
                }),
            Self::Scalar(scalar) => Err(ConfError::Coercion {
                key: key.to_string(),
                kind: scalar.kind(),
                text: format!("{}{body}{}", snippet::SNIPPET_DELIMITER, snippet::SNIPPET_DELIMITER),
            }),
        }
    }

    pub const fn as_snippet(&self) -> Option<&Snippet> {
        match self {
            Self::Snippet(snippet) => Some(snippet),
            Self::Scalar(_) => None,
        }
    }
}

/// Text written after `key = ` in the config file.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => fmt::Display::fmt(scalar, f),
            Self::Snippet(snippet) => fmt::Display::fmt(snippet, f),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        Self::Scalar(Scalar::Bool(v))
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        Self::Scalar(Scalar::Int(v))
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        Self::Scalar(Scalar::Int(i64::from(v)))
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        Self::Scalar(Scalar::Float(v))
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        Self::Scalar(Scalar::Str(v.to_string()))
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        Self::Scalar(Scalar::Str(v))
    }
}

impl From<Scalar> for ConfigValue {
    fn from(v: Scalar) -> Self {
        Self::Scalar(v)
    }
}

impl From<Snippet> for ConfigValue {
    fn from(v: Snippet) -> Self {
        Self::Snippet(v)
    }
}
