//! Quoting: turn argument values back into a command line.
//!
//! Each string is quoted independently, picking the first rule that applies:
//!
//! - The empty string becomes `''`.
//! - A string with no special characters is left as is.
//! - A string containing `'` is double-quoted, with `"`, `\`, `$` and
//!   `` ` `` backslash-escaped.
//! - A string containing whitespace or `"` is single-quoted.
//! - Otherwise each special character is backslash-escaped in place.
//!
//! Special characters are whitespace, the quotes, `\`, and
//! ``# ( ) { } * ? | [ ] ! ; < > & $ ` ``.
//!
//! Feeding the result back through [`parse`](crate::parse::parse) yields the
//! original strings as words.
//!
//! ```
//! use shell_tokens::quote::{quote, quoted};
//!
//! assert_eq!(quote(["a", "b", "c d"]), "a b 'c d'");
//! assert_eq!(format!("--name={}", quoted("it's")), r#"--name="it's""#);
//! ```

use std::borrow::Cow;
use std::fmt::{self, Write as _};

use log::debug;

use crate::error::ArgError;
use crate::parse::Operator;

fn is_special(c: char) -> bool {
    matches!(
        c,
        '\'' | '"'
            | '\\'
            | '#'
            | '('
            | ')'
            | '{'
            | '}'
            | '*'
            | '?'
            | '|'
            | '['
            | ']'
            | '!'
            | ';'
            | '<'
            | '>'
            | '&'
            | '$'
            | '`'
    ) || c.is_whitespace()
}

/// Characters a backslash escapes inside double quotes.
fn escaped_in_double(c: char) -> bool {
    matches!(c, '"' | '\\' | '$' | '`')
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Bare,
    Single,
    Double,
    Escaped,
}

impl Style {
    fn of(s: &str) -> Style {
        if s.is_empty() {
            Style::Single
        } else if !s.chars().any(is_special) {
            Style::Bare
        } else if s.contains('\'') {
            Style::Double
        } else if s.chars().any(|c| c.is_whitespace() || c == '"') {
            Style::Single
        } else {
            Style::Escaped
        }
    }
}

/// Wrapper for quoting a string.
///
/// `Quoted` implements `Display` to produce the quoted form of the string,
/// so it can be written into a larger formatted string without an
/// intermediate allocation.
#[derive(Clone, Copy, Debug)]
#[must_use = "`Quoted` does nothing unless printed"]
pub struct Quoted<'a> {
    raw: &'a str,
    style: Style,
}

impl<'a> Quoted<'a> {
    /// Returns the original string.
    pub fn as_raw(&self) -> &'a str {
        self.raw
    }

    /// Whether the string is written differently from the original.
    pub fn needs_quoting(&self) -> bool {
        self.style != Style::Bare
    }
}

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            Style::Bare => f.write_str(self.raw),
            Style::Single => write!(f, "'{}'", self.raw),
            Style::Double => {
                f.write_char('"')?;
                for c in self.raw.chars() {
                    if escaped_in_double(c) {
                        f.write_char('\\')?;
                    }
                    f.write_char(c)?;
                }
                f.write_char('"')
            }
            Style::Escaped => {
                for c in self.raw.chars() {
                    if is_special(c) {
                        f.write_char('\\')?;
                    }
                    f.write_char(c)?;
                }
                Ok(())
            }
        }
    }
}

/// Wrap a string in [`Quoted`].
pub fn quoted(raw: &str) -> Quoted<'_> {
    Quoted {
        raw,
        style: Style::of(raw),
    }
}

/// Quote a single string, borrowing it when no quoting is needed.
#[must_use]
pub fn quote_word(raw: &str) -> Cow<'_, str> {
    let q = quoted(raw);
    if q.needs_quoting() {
        Cow::Owned(q.to_string())
    } else {
        Cow::Borrowed(raw)
    }
}

/// One value to be written into a command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Undefined,
    /// Written with every character backslash-escaped, so it reads back as
    /// a plain word rather than an operator.
    Operator(Operator),
}

/// Writes the shell form of the argument.
impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => fmt::Display::fmt(&quoted(s), f),
            Arg::Int(n) => write!(f, "{n}"),
            Arg::Float(n) => write!(f, "{n}"),
            Arg::Bool(b) => write!(f, "{b}"),
            Arg::Null => f.write_str("null"),
            Arg::Undefined => f.write_str("undefined"),
            Arg::Operator(op) => {
                for c in op.as_str().chars() {
                    f.write_char('\\')?;
                    f.write_char(c)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Arg::Str(s.clone())
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Int(n)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Int(n.into())
    }
}

impl From<u32> for Arg {
    fn from(n: u32) -> Self {
        Arg::Int(n.into())
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Float(n)
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl From<Operator> for Arg {
    fn from(op: Operator) -> Self {
        Arg::Operator(op)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Null, Into::into)
    }
}

/// Accepts strings, numbers, booleans, `null` and `{"op": ...}` objects.
impl TryFrom<serde_json::Value> for Arg {
    type Error = ArgError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;
        match value {
            Value::String(s) => Ok(Arg::Str(s)),
            Value::Bool(b) => Ok(Arg::Bool(b)),
            Value::Null => Ok(Arg::Null),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Arg::Int(i)),
                None => n
                    .as_f64()
                    .map(Arg::Float)
                    .ok_or_else(|| ArgError::Unsupported(n.to_string())),
            },
            Value::Object(map) => match map.get("op") {
                Some(Value::String(op)) => Ok(Arg::Operator(Operator::from_symbol(op))),
                _ => Err(ArgError::MissingOp),
            },
            other @ Value::Array(_) => Err(ArgError::Unsupported(other.to_string())),
        }
    }
}

/// Quote each argument and join them with single spaces.
pub fn quote<I>(args: I) -> String
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    let mut out = String::new();
    let mut count = 0;
    for arg in args {
        if count > 0 {
            out.push(' ');
        }
        let arg: Arg = arg.into();
        // Writing to a String cannot fail.
        let _ = write!(out, "{arg}");
        count += 1;
    }
    debug!("quoted {count} argument(s)");
    out
}
