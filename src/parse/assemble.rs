//! Token assembly: joins resolved fragments into words and classifies globs.

use super::scan::{Fragment, Origin};
use super::types::Token;

/// Accumulates the pieces of one word.
#[derive(Debug, Default)]
struct WordBuilder {
    text: String,
    started: bool,
    /// Some part came from inside quotes.
    quoted: bool,
    /// A bare `*`, `?` or bracket expression was seen.
    glob: bool,
    open_bracket: bool,
    /// This piece borders a structured operator substitution.
    spliced: bool,
}

impl WordBuilder {
    fn push(&mut self, text: &str, origin: Origin) {
        self.started = true;
        self.text.push_str(text);
        match origin {
            Origin::Quoted => self.quoted = true,
            Origin::Bare => {
                for c in text.chars() {
                    match c {
                        '*' | '?' => self.glob = true,
                        '[' => self.open_bracket = true,
                        ']' if self.open_bracket => self.glob = true,
                        _ => {}
                    }
                }
            }
            Origin::Escaped | Origin::Substituted => {}
        }
    }

    /// Finish the current word, if any, and reset.
    ///
    /// An empty word survives only when it was quoted and not cut by a
    /// structured substitution: `''` is an argument, an unset `$X` is not.
    fn flush(&mut self, tokens: &mut Vec<Token>) {
        let word = std::mem::take(self);
        if !word.started {
            return;
        }
        if word.text.is_empty() && (!word.quoted || word.spliced) {
            return;
        }
        if word.glob && !word.quoted {
            tokens.push(Token::Glob(word.text));
        } else {
            tokens.push(Token::Word(word.text));
        }
    }
}

/// Merge resolved fragments into tokens.
///
/// Expects the output of [`resolve`](super::env::resolve); any variable
/// fragment still present is treated as unset.
pub fn assemble(fragments: Vec<Fragment>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = WordBuilder::default();

    for fragment in fragments {
        match fragment {
            Fragment::Literal { text, origin } => word.push(&text, origin),
            Fragment::Variable { quoted, .. } => {
                let origin = if quoted {
                    Origin::Quoted
                } else {
                    Origin::Substituted
                };
                word.push("", origin);
            }
            Fragment::Separator => word.flush(&mut tokens),
            Fragment::Operator(op) => {
                word.flush(&mut tokens);
                tokens.push(Token::Operator(op));
            }
            Fragment::Spliced(op) => {
                word.spliced = true;
                word.flush(&mut tokens);
                tokens.push(Token::Operator(op));
                word.spliced = true;
            }
            Fragment::Comment(text) => {
                word.flush(&mut tokens);
                tokens.push(Token::Comment(text));
            }
        }
    }
    word.flush(&mut tokens);
    tokens
}
