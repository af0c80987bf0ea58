//! Structural scanner for the config file text.
//!
//! Walks the file once, classifying each logical unit as it goes: blank and
//! `#` lines are skipped, `key = """..."""` is a snippet assignment (which may
//! span many lines and contain `=`), `key = value` is a scalar assignment, and
//! anything else is a stray line. A snippet is consumed up to its closing
//! marker before scanning resumes, so text inside a body is never read as a
//! top-level assignment.

use thiserror::Error;
use tracing::trace;

use crate::snippet::SNIPPET_DELIMITER;

/// One classified unit of config text. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit<'a> {
    /// `key = value`; `value` is trimmed and stops at the next `=`.
    Scalar {
        key: &'a str,
        text: &'a str,
        line: usize,
    },
    /// `key = """body"""`; `body` is the raw text between the markers.
    Snippet {
        key: &'a str,
        body: &'a str,
        line: usize,
    },
    /// A non-comment line that is not an assignment.
    Stray { text: &'a str, line: usize },
}

impl Unit<'_> {
    pub const fn line(&self) -> usize {
        match self {
            Self::Scalar { line, .. } | Self::Snippet { line, .. } | Self::Stray { line, .. } => {
                *line
            }
        }
    }
}

/// Malformed snippet markers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("snippet for '{key}' has no closing {SNIPPET_DELIMITER}")]
    Unterminated { key: String, line: usize },

    #[error("unexpected text after closing {SNIPPET_DELIMITER}: '{trailing}'")]
    TrailingText { trailing: String, line: usize },
}

impl ScanError {
    pub const fn line(&self) -> usize {
        match self {
            Self::Unterminated { line, .. } | Self::TrailingText { line, .. } => *line,
        }
    }
}

/// Iterator over the [`Unit`]s of a config file. Stops after the first error.
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub const fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
        }
    }

    /// Byte offset just past the line that contains `from`.
    fn end_of_line(&self, from: usize) -> usize {
        self.text[from..]
            .find('\n')
            .map_or(self.text.len(), |i| from + i + 1)
    }

    fn advance_to(&mut self, next: usize) {
        self.line += self.text[self.pos..next].matches('\n').count();
        self.pos = next;
    }

    fn fail(&mut self, err: ScanError) -> Option<Result<Unit<'a>, ScanError>> {
        self.pos = self.text.len();
        Some(Err(err))
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Unit<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos >= self.text.len() {
                return None;
            }

            let start = self.pos;
            let line_no = self.line;
            let next_line = self.end_of_line(start);
            let raw_line = self.text[start..next_line].trim_end_matches(['\n', '\r']);
            let trimmed = raw_line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                self.advance_to(next_line);
                continue;
            }

            let Some(eq) = raw_line.find('=') else {
                self.advance_to(next_line);
                trace!(line = line_no, "Stray line");
                return Some(Ok(Unit::Stray {
                    text: trimmed,
                    line: line_no,
                }));
            };

            let key = raw_line[..eq].trim();
            let after_eq = &raw_line[eq + 1..];
            let value = after_eq.trim_start();

            if key.is_empty() {
                self.advance_to(next_line);
                return Some(Ok(Unit::Stray {
                    text: trimmed,
                    line: line_no,
                }));
            }

            if value.starts_with(SNIPPET_DELIMITER) {
                let body_start =
                    start + eq + 1 + (after_eq.len() - value.len()) + SNIPPET_DELIMITER.len();
                let Some(body_len) = self.text[body_start..].find(SNIPPET_DELIMITER) else {
                    return self.fail(ScanError::Unterminated {
                        key: key.to_string(),
                        line: line_no,
                    });
                };
                let body_end = body_start + body_len;
                let close_end = body_end + SNIPPET_DELIMITER.len();
                let after_close = self.end_of_line(close_end);
                let trailing = self.text[close_end..after_close].trim();
                if !trailing.is_empty() {
                    let close_line = line_no + self.text[start..close_end].matches('\n').count();
                    return self.fail(ScanError::TrailingText {
                        trailing: trailing.to_string(),
                        line: close_line,
                    });
                }

                let body = &self.text[body_start..body_end];
                self.advance_to(after_close);
                trace!(key, line = line_no, body_len = body.len(), "Snippet assignment");
                return Some(Ok(Unit::Snippet {
                    key,
                    body,
                    line: line_no,
                }));
            }

            let text = value.split('=').next().unwrap_or_default().trim();
            self.advance_to(next_line);
            trace!(key, line = line_no, "Scalar assignment");
            return Some(Ok(Unit::Scalar {
                key,
                text,
                line: line_no,
            }));
        }
    }
}
