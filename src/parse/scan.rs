//! Character-level scanner: an explicit state machine over the input.
//!
//! The scanner classifies each character, looks up the action for the
//! (state, class) pair in [`transition`], and performs it. It emits raw
//! [`Fragment`]s; variable references are left unresolved for the
//! substitution pass.

use log::trace;

use super::types::Operator;
use crate::error::ParseError;

/// Where a span of literal text came from. Drives glob classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Unquoted, unescaped input text.
    Bare,
    /// A character made literal by the escape character outside quotes.
    Escaped,
    /// Text inside single or double quotes.
    Quoted,
    /// The result of an unquoted variable substitution.
    Substituted,
}

/// Raw output of the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Literal { text: String, origin: Origin },
    /// `$name`, `${name}` or a special parameter, not yet resolved.
    Variable { name: String, quoted: bool },
    Operator(Operator),
    /// An operator produced by a structured substitution. Splits the word
    /// it appears in.
    Spliced(Operator),
    /// Whitespace between words.
    Separator,
    Comment(String),
}

/// Quoting context to return to when a `${...}` reference closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Normal,
    DoubleQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Normal,
    InSingleQuote,
    InDoubleQuote,
    InComment,
    InVariableBrace(Resume),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Space,
    SingleQuote,
    DoubleQuote,
    Escape,
    Dollar,
    Hash,
    OperatorStart,
    CloseBrace,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Keep the character as literal word text.
    Append,
    /// End the current word.
    Separate,
    OpenSingle,
    OpenDouble,
    CloseQuote,
    /// Outside quotes: the next character is literal, whatever it is.
    EscapeNext,
    /// Inside double quotes: escape only `"`, `$`, backtick or the escape
    /// character itself.
    EscapeInDouble,
    BeginVariable,
    EmitOperator,
    BeginComment,
    /// Inside a comment: consume.
    Absorb,
    /// Inside `${`: collect a name character.
    BraceName,
    CloseBrace,
}

fn classify(c: char, escape: char) -> Class {
    if c == escape {
        return Class::Escape;
    }
    match c {
        '\'' => Class::SingleQuote,
        '"' => Class::DoubleQuote,
        '$' => Class::Dollar,
        '#' => Class::Hash,
        '}' => Class::CloseBrace,
        c if Operator::starts_with(c) => Class::OperatorStart,
        c if c.is_whitespace() => Class::Space,
        _ => Class::Other,
    }
}

/// The transition table.
fn transition(state: State, class: Class) -> Action {
    use Action::*;
    match (state, class) {
        (State::Normal, Class::Space) => Separate,
        (State::Normal, Class::SingleQuote) => OpenSingle,
        (State::Normal, Class::DoubleQuote) => OpenDouble,
        (State::Normal, Class::Escape) => EscapeNext,
        (State::Normal, Class::Dollar) => BeginVariable,
        (State::Normal, Class::Hash) => BeginComment,
        (State::Normal, Class::OperatorStart) => EmitOperator,
        (State::Normal, Class::CloseBrace | Class::Other) => Append,

        (State::InSingleQuote, Class::SingleQuote) => CloseQuote,
        (State::InSingleQuote, _) => Append,

        (State::InDoubleQuote, Class::DoubleQuote) => CloseQuote,
        (State::InDoubleQuote, Class::Escape) => EscapeInDouble,
        (State::InDoubleQuote, Class::Dollar) => BeginVariable,
        (State::InDoubleQuote, _) => Append,

        (State::InComment, _) => Absorb,

        (State::InVariableBrace(_), Class::CloseBrace) => CloseBrace,
        (State::InVariableBrace(_), _) => BraceName,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_special_parameter(c: char) -> bool {
    matches!(c, '*' | '@' | '#' | '?' | '-' | '$' | '!' | '0' | '_')
}

fn is_valid_brace_name(name: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (None, _) => false,
        (Some(c), None) => is_name_char(c) || is_special_parameter(c),
        _ => name.chars().all(is_name_char),
    }
}

struct Scanner<'a> {
    input: &'a str,
    chars: Vec<char>,
    escape: char,
    pos: usize,
    state: State,
    /// Char indices of the innermost open quote, `${` and `#`.
    quote_at: usize,
    brace_at: usize,
    comment_at: usize,
    brace_name: String,
    fragments: Vec<Fragment>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, escape: char) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            escape,
            pos: 0,
            state: State::Normal,
            quote_at: 0,
            brace_at: 0,
            comment_at: 0,
            brace_name: String::new(),
            fragments: Vec::new(),
        }
    }

    /// Byte offset of the char at index `pos`.
    fn offset(&self, pos: usize) -> usize {
        self.chars[..pos].iter().map(|c| c.len_utf8()).sum()
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn quoting(&self) -> Origin {
        match self.state {
            State::Normal => Origin::Bare,
            _ => Origin::Quoted,
        }
    }

    /// Append literal text, extending the previous literal of the same origin.
    fn push_literal(&mut self, text: &str, origin: Origin) {
        if let Some(Fragment::Literal { text: last, origin: o }) = self.fragments.last_mut()
            && *o == origin
        {
            last.push_str(text);
            return;
        }
        self.fragments.push(Fragment::Literal {
            text: text.to_string(),
            origin,
        });
    }

    fn push_char(&mut self, c: char, origin: Origin) {
        let mut buf = [0u8; 4];
        self.push_literal(c.encode_utf8(&mut buf), origin);
    }

    fn run(mut self) -> Result<Vec<Fragment>, ParseError> {
        while let Some(c) = self.peek(0) {
            let action = transition(self.state, classify(c, self.escape));
            trace!("scan {:?} {:?} -> {:?}", self.state, c, action);
            self.step(c, action)?;
        }
        self.finish()
    }

    fn step(&mut self, c: char, action: Action) -> Result<(), ParseError> {
        match action {
            Action::Append => {
                let origin = self.quoting();
                self.push_char(c, origin);
                self.pos += 1;
            }
            Action::Separate => {
                if !matches!(self.fragments.last(), None | Some(Fragment::Separator)) {
                    self.fragments.push(Fragment::Separator);
                }
                self.pos += 1;
            }
            Action::OpenSingle | Action::OpenDouble => {
                // An empty quoted literal marks the word as quoted even if
                // the quotes enclose nothing.
                self.push_literal("", Origin::Quoted);
                self.quote_at = self.pos;
                self.state = if action == Action::OpenSingle {
                    State::InSingleQuote
                } else {
                    State::InDoubleQuote
                };
                self.pos += 1;
            }
            Action::CloseQuote => {
                self.state = State::Normal;
                self.pos += 1;
            }
            Action::EscapeNext => match self.peek(1) {
                Some(next) => {
                    self.push_char(next, Origin::Escaped);
                    self.pos += 2;
                }
                None => {
                    self.push_char(c, Origin::Escaped);
                    self.pos += 1;
                }
            },
            Action::EscapeInDouble => match self.peek(1) {
                Some(next) if matches!(next, '"' | '$' | '`') || next == self.escape => {
                    self.push_char(next, Origin::Quoted);
                    self.pos += 2;
                }
                _ => {
                    self.push_char(c, Origin::Quoted);
                    self.pos += 1;
                }
            },
            Action::BeginVariable => self.begin_variable(),
            Action::EmitOperator => match Operator::match_prefix(&self.chars[self.pos..]) {
                Some(op) => {
                    self.pos += op.as_str().chars().count();
                    self.fragments.push(Fragment::Operator(op));
                }
                None => {
                    self.push_char(c, Origin::Bare);
                    self.pos += 1;
                }
            },
            Action::BeginComment => {
                self.state = State::InComment;
                self.pos += 1;
                self.comment_at = self.pos;
            }
            Action::Absorb => self.pos += 1,
            Action::BraceName => {
                self.brace_name.push(c);
                self.pos += 1;
            }
            Action::CloseBrace => {
                let State::InVariableBrace(resume) = self.state else {
                    return Ok(());
                };
                if !is_valid_brace_name(&self.brace_name) {
                    let start = self.offset(self.brace_at);
                    let end = self.offset(self.pos + 1);
                    return Err(ParseError::BadSubstitution {
                        text: self.input[start..end].to_string(),
                    });
                }
                let name = std::mem::take(&mut self.brace_name);
                self.fragments.push(Fragment::Variable {
                    name,
                    quoted: resume == Resume::DoubleQuote,
                });
                self.state = match resume {
                    Resume::Normal => State::Normal,
                    Resume::DoubleQuote => State::InDoubleQuote,
                };
                self.pos += 1;
            }
        }
        Ok(())
    }

    /// Handle a `$` at `pos` in normal or double-quoted state.
    fn begin_variable(&mut self) {
        let quoted = self.state == State::InDoubleQuote;
        match self.peek(1) {
            Some('{') => {
                self.brace_at = self.pos;
                self.brace_name.clear();
                self.state = State::InVariableBrace(if quoted {
                    Resume::DoubleQuote
                } else {
                    Resume::Normal
                });
                self.pos += 2;
            }
            Some(c) if is_name_char(c) => {
                let start = self.pos + 1;
                let mut end = start;
                while end < self.chars.len() && is_name_char(self.chars[end]) {
                    end += 1;
                }
                let name: String = self.chars[start..end].iter().collect();
                self.fragments.push(Fragment::Variable { name, quoted });
                self.pos = end;
            }
            Some(c) if is_special_parameter(c) => {
                self.fragments.push(Fragment::Variable {
                    name: c.to_string(),
                    quoted,
                });
                self.pos += 2;
            }
            _ => {
                let origin = self.quoting();
                self.push_char('$', origin);
                self.pos += 1;
            }
        }
    }

    fn finish(mut self) -> Result<Vec<Fragment>, ParseError> {
        match self.state {
            State::Normal => {}
            State::InSingleQuote | State::InDoubleQuote => {
                return Err(ParseError::UnterminatedQuote {
                    quote: self.chars[self.quote_at],
                    offset: self.offset(self.quote_at),
                });
            }
            State::InComment => {
                let start = self.offset(self.comment_at);
                let text = self.input[start..].trim().to_string();
                self.fragments.push(Fragment::Comment(text));
            }
            State::InVariableBrace(_) => {
                let start = self.offset(self.brace_at);
                return Err(ParseError::BadSubstitution {
                    text: self.input[start..].to_string(),
                });
            }
        }
        Ok(self.fragments)
    }
}

/// Scan `input` into fragments, using `escape` as the escape character.
pub fn scan(input: &str, escape: char) -> Result<Vec<Fragment>, ParseError> {
    Scanner::new(input, escape).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(s: &str) -> Fragment {
        Fragment::Literal {
            text: s.into(),
            origin: Origin::Bare,
        }
    }

    fn quoted(s: &str) -> Fragment {
        Fragment::Literal {
            text: s.into(),
            origin: Origin::Quoted,
        }
    }

    fn var(name: &str, quoted: bool) -> Fragment {
        Fragment::Variable {
            name: name.into(),
            quoted,
        }
    }

    #[test]
    fn words_and_separators() {
        let frags = scan("ls  -la", '\\').unwrap();
        assert_eq!(frags, vec![bare("ls"), Fragment::Separator, bare("-la")]);
    }

    #[test]
    fn whitespace_only() {
        assert!(scan(" \t ", '\\').unwrap().is_empty());
    }

    #[test]
    fn single_quote_is_literal() {
        let frags = scan(r"'a $X \n'", '\\').unwrap();
        assert_eq!(frags, vec![quoted(r"a $X \n")]);
    }

    #[test]
    fn empty_quotes_leave_marker() {
        assert_eq!(scan("''", '\\').unwrap(), vec![quoted("")]);
    }

    #[test]
    fn double_quote_escapes() {
        let frags = scan(r#""a\"b\$c\\d\`e\xf""#, '\\').unwrap();
        assert_eq!(frags, vec![quoted(r#"a"b$c\d`e\xf"#)]);
    }

    #[test]
    fn escaped_char_outside_quotes() {
        let frags = scan(r"a\|b", '\\').unwrap();
        assert_eq!(
            frags,
            vec![
                bare("a"),
                Fragment::Literal {
                    text: "|".into(),
                    origin: Origin::Escaped
                },
                bare("b"),
            ]
        );
    }

    #[test]
    fn trailing_escape_is_literal() {
        let frags = scan("ab\\", '\\').unwrap();
        assert_eq!(
            frags,
            vec![
                bare("ab"),
                Fragment::Literal {
                    text: "\\".into(),
                    origin: Origin::Escaped
                },
            ]
        );
    }

    #[test]
    fn variable_forms() {
        let frags = scan("$A ${B_1}x \"$?\"", '\\').unwrap();
        assert_eq!(
            frags,
            vec![
                var("A", false),
                Fragment::Separator,
                var("B_1", false),
                bare("x"),
                Fragment::Separator,
                quoted(""),
                var("?", true),
            ]
        );
    }

    #[test]
    fn lone_dollar_is_literal() {
        assert_eq!(scan("$", '\\').unwrap(), vec![bare("$")]);
        assert_eq!(scan("\"xy$\"", '\\').unwrap(), vec![quoted("xy$")]);
    }

    #[test]
    fn dollar_hash_is_a_parameter_not_a_comment() {
        assert_eq!(scan("$#", '\\').unwrap(), vec![var("#", false)]);
    }

    #[test]
    fn operators_split_words() {
        let frags = scan("a&&b", '\\').unwrap();
        assert_eq!(
            frags,
            vec![bare("a"), Fragment::Operator(Operator::And), bare("b")]
        );
    }

    #[test]
    fn comment_absorbs_rest() {
        let frags = scan("beep # > \"boop\"", '\\').unwrap();
        assert_eq!(
            frags,
            vec![
                bare("beep"),
                Fragment::Separator,
                Fragment::Comment("> \"boop\"".into()),
            ]
        );
    }

    #[test]
    fn unterminated_single_quote() {
        let err = scan("echo 'abc", '\\').unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedQuote {
                quote: '\'',
                offset: 5
            }
        ));
    }

    #[test]
    fn unterminated_double_quote() {
        let err = scan("\"abc\\\"", '\\').unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedQuote {
                quote: '"',
                offset: 0
            }
        ));
    }

    #[test]
    fn bad_substitutions() {
        for input in ["${}", "a${X:-d}b", "${abc"] {
            let err = scan(input, '\\').unwrap_err();
            assert!(
                matches!(err, ParseError::BadSubstitution { .. }),
                "input: {input}"
            );
        }
    }

    #[test]
    fn bad_substitution_text() {
        let err = scan("a${X:-d}b", '\\').unwrap_err();
        assert_eq!(err.to_string(), "bad substitution: ${X:-d}");
    }

    #[test]
    fn custom_escape_character() {
        let frags = scan("a^ b \\", '^').unwrap();
        assert_eq!(
            frags,
            vec![
                bare("a"),
                Fragment::Literal {
                    text: " ".into(),
                    origin: Origin::Escaped
                },
                bare("b"),
                Fragment::Separator,
                bare("\\"),
            ]
        );
    }

    #[test]
    fn multibyte_offsets() {
        let err = scan("é 'x", '\\').unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedQuote { offset: 3, .. }));
    }
}
