//! Error types for parsing and quoting.

use thiserror::Error;

/// Error returned by a [`Resolver`](crate::parse::Resolver) lookup.
///
/// Resolvers are caller code, so any error type can be carried through.
pub type ResolveError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while parsing a command line.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A `'` or `"` was opened but never closed.
    #[error("unterminated {quote} quote starting at offset {offset}")]
    UnterminatedQuote {
        /// The quote character that was left open.
        quote: char,
        /// Byte offset of the opening quote in the input.
        offset: usize,
    },

    /// A `${...}` reference that is empty, unterminated, or not a plain name.
    #[error("bad substitution: {text}")]
    BadSubstitution { text: String },

    /// The environment resolver failed while looking up `name`.
    #[error("failed to resolve ${name}")]
    Resolve {
        name: String,
        #[source]
        source: ResolveError,
    },
}

/// A JSON value that cannot be used as a quote argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("unsupported argument: {0}")]
    Unsupported(String),

    #[error("operator object must have a string \"op\" field")]
    MissingOp,
}
