//! Variable substitution: resolvers and the pass that applies them.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use log::trace;

use super::scan::{Fragment, Origin};
use super::types::Operator;
use crate::error::{ParseError, ResolveError};

/// The value a variable reference expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// Literal text, spliced into the surrounding word.
    Text(String),
    /// An operator token, splitting the surrounding word.
    Operator(Operator),
}

impl Substitution {
    /// Structured substitution for an operator symbol.
    pub fn op(symbol: &str) -> Self {
        Substitution::Operator(Operator::from_symbol(symbol))
    }
}

impl From<String> for Substitution {
    fn from(text: String) -> Self {
        Substitution::Text(text)
    }
}

impl From<&str> for Substitution {
    fn from(text: &str) -> Self {
        Substitution::Text(text.to_string())
    }
}

impl From<Operator> for Substitution {
    fn from(op: Operator) -> Self {
        Substitution::Operator(op)
    }
}

/// Source of values for `$name` and `${name}` references.
///
/// `Ok(None)` means the variable is unset; it expands to nothing. An `Err`
/// aborts the parse and is returned to the caller as
/// [`ParseError::Resolve`].
pub trait Resolver {
    fn resolve(&self, name: &str) -> Result<Option<Substitution>, ResolveError>;
}

/// Resolver for when no environment is given: every variable is unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnv;

impl Resolver for NoEnv {
    fn resolve(&self, _name: &str) -> Result<Option<Substitution>, ResolveError> {
        Ok(None)
    }
}

/// Resolver backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Resolver for ProcessEnv {
    fn resolve(&self, name: &str) -> Result<Option<Substitution>, ResolveError> {
        Ok(std::env::var_os(name).map(|v| Substitution::Text(v.to_string_lossy().into_owned())))
    }
}

impl<V, S> Resolver for HashMap<String, V, S>
where
    V: Clone + Into<Substitution>,
    S: BuildHasher,
{
    fn resolve(&self, name: &str) -> Result<Option<Substitution>, ResolveError> {
        Ok(self.get(name).cloned().map(Into::into))
    }
}

impl<V> Resolver for BTreeMap<String, V>
where
    V: Clone + Into<Substitution>,
{
    fn resolve(&self, name: &str) -> Result<Option<Substitution>, ResolveError> {
        Ok(self.get(name).cloned().map(Into::into))
    }
}

/// Resolver wrapping a closure. See [`from_fn`].
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

impl<F> Resolver for FromFn<F>
where
    F: Fn(&str) -> Result<Option<Substitution>, ResolveError>,
{
    fn resolve(&self, name: &str) -> Result<Option<Substitution>, ResolveError> {
        (self.0)(name)
    }
}

/// Build a resolver from a closure.
///
/// ```
/// use shell_tokens::parse::{from_fn, parse_with, Options, Substitution, Token};
///
/// let env = from_fn(|name| Ok(Some(Substitution::Text(name.to_lowercase()))));
/// let tokens = parse_with("echo $HOME", &env, &Options::default()).unwrap();
/// assert_eq!(tokens[1], Token::Word("home".into()));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&str) -> Result<Option<Substitution>, ResolveError>,
{
    FromFn(f)
}

/// Replace every variable fragment with its substitution.
///
/// Results are never re-scanned: text comes back as a literal whose origin
/// only records whether it was quoted.
pub fn resolve<R: Resolver + ?Sized>(
    fragments: Vec<Fragment>,
    env: &R,
) -> Result<Vec<Fragment>, ParseError> {
    let mut out = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let (name, quoted) = match fragment {
            Fragment::Variable { name, quoted } => (name, quoted),
            other => {
                out.push(other);
                continue;
            }
        };
        let value = match env.resolve(&name) {
            Ok(value) => value,
            Err(source) => return Err(ParseError::Resolve { name, source }),
        };
        trace!("resolve ${name} -> {value:?}");
        match value {
            Some(Substitution::Operator(op)) => out.push(Fragment::Spliced(op)),
            Some(Substitution::Text(text)) => out.push(literal(text, quoted)),
            None => out.push(literal(String::new(), quoted)),
        }
    }
    Ok(out)
}

fn literal(text: String, quoted: bool) -> Fragment {
    Fragment::Literal {
        text,
        origin: if quoted {
            Origin::Quoted
        } else {
            Origin::Substituted
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, quoted: bool) -> Fragment {
        Fragment::Variable {
            name: name.into(),
            quoted,
        }
    }

    #[test]
    fn map_lookup() {
        let env = HashMap::from([("X".to_string(), "1".to_string())]);
        assert_eq!(env.resolve("X").unwrap(), Some(Substitution::Text("1".into())));
        assert_eq!(env.resolve("Y").unwrap(), None);
    }

    #[test]
    fn btree_map_of_substitutions() {
        let env = BTreeMap::from([("P".to_string(), Substitution::op("|"))]);
        assert_eq!(
            env.resolve("P").unwrap(),
            Some(Substitution::Operator(Operator::Pipe))
        );
    }

    #[test]
    fn unset_variables_become_empty_literals() {
        let out = resolve(vec![var("X", false), var("Y", true)], &NoEnv).unwrap();
        assert_eq!(
            out,
            vec![
                Fragment::Literal {
                    text: String::new(),
                    origin: Origin::Substituted
                },
                Fragment::Literal {
                    text: String::new(),
                    origin: Origin::Quoted
                },
            ]
        );
    }

    #[test]
    fn operator_substitution_is_spliced() {
        let env = from_fn(|_| Ok(Some(Substitution::op("@@"))));
        let out = resolve(vec![var("XYZ", false)], &env).unwrap();
        assert_eq!(out, vec![Fragment::Spliced(Operator::Custom("@@".into()))]);
    }

    #[test]
    fn resolver_error_propagates() {
        let env = from_fn(|name| Err(format!("no access to {name}").into()));
        let err = resolve(vec![var("SECRET", false)], &env).unwrap_err();
        match err {
            ParseError::Resolve { name, source } => {
                assert_eq!(name, "SECRET");
                assert_eq!(source.to_string(), "no access to SECRET");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_variable_fragments_pass_through() {
        let frags = vec![Fragment::Separator, Fragment::Operator(Operator::Semi)];
        assert_eq!(resolve(frags.clone(), &NoEnv).unwrap(), frags);
    }

    #[test]
    fn process_env_reads_environment() {
        let path = std::env::var("PATH").ok();
        let resolved = ProcessEnv.resolve("PATH").unwrap();
        assert_eq!(resolved, path.map(Substitution::Text));
    }
}
