//! Types produced by the parser and consumed by the quoter.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Shell control operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `;;` — case clause terminator
    DoubleSemi,
    /// `|&` — pipe stdout+stderr
    PipeErr,
    /// `&&` — run next only if previous succeeded
    And,
    /// `||` — run next only if previous failed
    Or,
    /// `>>` — append output
    Append,
    /// `>&` — duplicate output descriptor
    DupOutput,
    /// `<(` — open process substitution
    ProcessSubst,
    /// `;` — run next unconditionally
    Semi,
    /// `&` — run in background
    Background,
    /// `|` — pipe stdout
    Pipe,
    /// `<` — redirect input
    Input,
    /// `>` — redirect output
    Output,
    /// `(` — open subshell
    OpenParen,
    /// `)` — close subshell or process substitution
    CloseParen,
    /// Any other symbol, injected by a structured substitution.
    Custom(String),
}

impl Operator {
    /// Operators recognized by the scanner, longest first.
    pub const RECOGNIZED: [Operator; 14] = [
        Operator::DoubleSemi,
        Operator::PipeErr,
        Operator::And,
        Operator::Or,
        Operator::Append,
        Operator::DupOutput,
        Operator::ProcessSubst,
        Operator::Semi,
        Operator::Background,
        Operator::Pipe,
        Operator::Input,
        Operator::Output,
        Operator::OpenParen,
        Operator::CloseParen,
    ];

    /// The operator's shell syntax.
    pub fn as_str(&self) -> &str {
        match self {
            Operator::DoubleSemi => ";;",
            Operator::PipeErr => "|&",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Append => ">>",
            Operator::DupOutput => ">&",
            Operator::ProcessSubst => "<(",
            Operator::Semi => ";",
            Operator::Background => "&",
            Operator::Pipe => "|",
            Operator::Input => "<",
            Operator::Output => ">",
            Operator::OpenParen => "(",
            Operator::CloseParen => ")",
            Operator::Custom(symbol) => symbol,
        }
    }

    /// Map a symbol to its operator, falling back to [`Operator::Custom`].
    pub fn from_symbol(symbol: &str) -> Operator {
        Self::RECOGNIZED
            .iter()
            .find(|op| op.as_str() == symbol)
            .cloned()
            .unwrap_or_else(|| Operator::Custom(symbol.to_string()))
    }

    /// Longest recognized operator at the start of `input`.
    pub fn match_prefix(input: &[char]) -> Option<Operator> {
        Self::RECOGNIZED
            .iter()
            .find(|op| {
                let symbol = op.as_str();
                symbol.len() <= input.len() && symbol.chars().zip(input).all(|(a, &b)| a == b)
            })
            .cloned()
    }

    /// Whether `c` can begin an operator.
    pub fn starts_with(c: char) -> bool {
        matches!(c, ';' | '&' | '|' | '<' | '>' | '(' | ')')
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A literal argument, quotes and escapes removed.
    Word(String),
    /// A control operator such as `|` or `&&`.
    Operator(Operator),
    /// Text after an unquoted `#`. Always the last token.
    Comment(String),
    /// An unquoted word containing wildcard characters, left unexpanded.
    Glob(String),
}

impl Token {
    /// The word text, if this is a [`Token::Word`].
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }
}

/// Serializes to the conventional JSON shape: a bare string for words,
/// `{"op": ..}` for operators, `{"comment": ..}` for comments and
/// `{"op": "glob", "pattern": ..}` for globs.
impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Token::Word(w) => serializer.serialize_str(w),
            Token::Operator(op) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("op", op.as_str())?;
                map.end()
            }
            Token::Comment(text) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("comment", text)?;
                map.end()
            }
            Token::Glob(pattern) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("op", "glob")?;
                map.serialize_entry("pattern", pattern)?;
                map.end()
            }
        }
    }
}
