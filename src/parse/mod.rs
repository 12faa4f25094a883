//! Command-line parsing: scanner, substitution, token assembly.

pub mod assemble;
pub mod env;
pub mod scan;
pub mod types;

pub use env::{FromFn, NoEnv, ProcessEnv, Resolver, Substitution, from_fn};
pub use types::{Operator, Token};

use log::debug;

use crate::error::ParseError;

/// Parser options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Escape character outside single quotes. Defaults to `\`.
    pub escape: char,
}

impl Default for Options {
    fn default() -> Self {
        Self { escape: '\\' }
    }
}

impl Options {
    /// Options using `escape` as the escape character.
    pub fn with_escape(escape: char) -> Self {
        Self { escape }
    }
}

/// Parse a command line with no environment: every `$VAR` expands to nothing.
pub fn parse(command: &str) -> Result<Vec<Token>, ParseError> {
    parse_with(command, &NoEnv, &Options::default())
}

/// Parse a command line, expanding variables through `env`.
///
/// ```
/// use std::collections::HashMap;
/// use shell_tokens::parse::{parse_with, Operator, Options, Token};
///
/// let env = HashMap::from([("X".to_string(), "b".to_string())]);
/// let tokens = parse_with("a${X}c | wc", &env, &Options::default()).unwrap();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Word("abc".into()),
///         Token::Operator(Operator::Pipe),
///         Token::Word("wc".into()),
///     ]
/// );
/// ```
pub fn parse_with<R: Resolver + ?Sized>(
    command: &str,
    env: &R,
    options: &Options,
) -> Result<Vec<Token>, ParseError> {
    let fragments = scan::scan(command, options.escape)?;
    let fragments = env::resolve(fragments, env)?;
    let tokens = assemble::assemble(fragments);

    let cmd_truncated: String = command.chars().take(200).collect();
    debug!("parsed {} token(s) from {cmd_truncated:?}", tokens.len());
    Ok(tokens)
}
