//! shell-tokens: parse shell command lines into tokens, and quote argument
//! lists back into command lines.
//!
//! [`parse`](parse::parse) scans a command line honoring single and double
//! quotes, escapes, `#` comments and `$VAR` / `${VAR}` substitution, and
//! returns words, operators, globs and a trailing comment.
//! [`quote`](quote::quote) goes the other way: it picks a minimal quoting for
//! each value so that parsing the result gives back the same words.
//!
//! # Architecture
//!
//! - **[`parse`]** — Scanner state machine, substitution pass, token assembly.
//! - **[`quote`]** — Per-argument quoting and joining.
//! - **[`error`]** — Error types.
//! - **[`config`]** — Configuration loading: embedded defaults + user overlay.
//! - **[`logging`]** — Logger setup for the command-line tool.
//!
//! ```
//! use shell_tokens::{parse, quote, Operator, Token};
//!
//! let tokens = parse("grep -r 'TODO list' src | wc -l").unwrap();
//! assert_eq!(tokens[2], Token::Word("TODO list".into()));
//! assert_eq!(tokens[4], Token::Operator(Operator::Pipe));
//!
//! assert_eq!(quote(["grep", "-r", "TODO list"]), "grep -r 'TODO list'");
//! ```

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Parse and quote errors.
pub mod error;
/// Logger initialization.
pub mod logging;
/// Command-line parsing: scanner, resolver, assembler, token types.
pub mod parse;
/// Argument quoting.
pub mod quote;

pub use error::{ArgError, ParseError, ResolveError};
pub use parse::{
    NoEnv, Operator, Options, ProcessEnv, Resolver, Substitution, Token, from_fn, parse,
    parse_with,
};
pub use quote::{Arg, quote, quoted};
