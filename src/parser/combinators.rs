use std::rc::Rc;

use tracing::{debug, trace};

use crate::lexer::TokenKind;

use super::recover::recover;
use super::state::{ErrorKind, ParseResult, ParseState, Parser};
use super::tree::{NamedValue, Parsed, Production, Sequence};

type ParserFn = Rc<dyn Fn(ParseState) -> ParseResult>;

// === Boxed Parser for type erasure ===

pub struct BoxedParser {
    parser: ParserFn,
}

impl Clone for BoxedParser {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl BoxedParser {
    pub fn new<P: Parser + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state| parser.parse(state)),
        }
    }
}

impl Parser for BoxedParser {
    fn parse(&self, state: ParseState) -> ParseResult {
        (self.parser)(state)
    }
}

impl std::fmt::Debug for BoxedParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoxedParser")
    }
}

// === Combinators as methods ===

impl BoxedParser {
    /// Label the result, see [`named`].
    pub fn named(self, name: impl Into<String>) -> BoxedParser {
        named(name, self)
    }

    /// Zero or one, see [`maybe`].
    pub fn maybe(self) -> BoxedParser {
        maybe(self)
    }

    /// Zero or more, see [`many`].
    pub fn many(self) -> BoxedParser {
        many(self)
    }
}

/// `seq![a, b, c]`: [`seq`] without building the `Vec` by hand.
#[macro_export]
macro_rules! seq {
    ($($parser:expr),* $(,)?) => {
        $crate::parser::seq(vec![$($crate::parser::BoxedParser::from($parser)),*])
    };
}

/// `or![a, b, c]`: [`or`] without building the `Vec` by hand.
#[macro_export]
macro_rules! or {
    ($($parser:expr),* $(,)?) => {
        $crate::parser::or(vec![$($crate::parser::BoxedParser::from($parser)),*])
    };
}

// === Primitive Parsers ===

/// Match one token of the given kind. The token is only consumed on a match.
pub fn tok(kind: impl Into<TokenKind>) -> BoxedParser {
    let kind = kind.into();
    BoxedParser::new(move |state: ParseState| {
        let item = state.peek();
        if item.kind == kind {
            let (item, state) = state.advance();
            return (Parsed::Item(item), state);
        }

        let error = ErrorKind::expected(kind.clone(), &item);
        (Parsed::Err, state.add_error(item, error))
    })
}

/// Match a single-character token such as `[` or `,`.
pub fn char(c: char) -> BoxedParser {
    tok(c)
}

/// Match the end of the token stream.
pub fn eof() -> BoxedParser {
    tok(TokenKind::EOF)
}

// === Composition ===

/// Run every parser in order. Stops at the first failure without rolling
/// back what was consumed before it; wrap in [`maybe`] or
/// [`crate::parser::try_parse`] for all-or-nothing behaviour.
pub fn seq(parsers: Vec<BoxedParser>) -> BoxedParser {
    BoxedParser::new(move |mut state: ParseState| {
        let mut results = Sequence::new();
        for parser in &parsers {
            let (result, next) = parser.parse(state);
            state = next;
            if result.is_err() {
                return (Parsed::Err, state);
            }
            results.push(result);
        }
        (Parsed::Sequence(results), state)
    })
}

/// Try each alternative from the same starting state, accepting the first
/// that does not fail.
///
/// When all of them fail, the state of the alternative that got furthest is
/// returned so that its diagnostics surface. When none of them consumed
/// anything, a single [`ErrorKind::NoAlternative`] is reported instead.
pub fn or(parsers: Vec<BoxedParser>) -> BoxedParser {
    BoxedParser::new(move |state: ParseState| {
        let start = state.position();
        let logged = state.errors().len();
        let mut furthest: Option<(usize, ParseState)> = None;
        let mut expected: Vec<String> = Vec::new();

        for (index, parser) in parsers.iter().enumerate() {
            let (result, end) = parser.parse(state.clone());
            if !result.is_err() {
                trace!(alternative = index, position = start, "alternative matched");
                return (result, end);
            }

            let consumed = end.position().saturating_sub(start);
            trace!(alternative = index, consumed, "alternative failed");
            if consumed == 0 {
                for error in end.errors().since(logged) {
                    let kinds = match &error.kind {
                        ErrorKind::Expected { expected: kind, .. } => vec![kind.to_string()],
                        ErrorKind::NoAlternative { expected, .. } => expected.clone(),
                        _ => continue,
                    };
                    for kind in kinds {
                        if !expected.contains(&kind) {
                            expected.push(kind);
                        }
                    }
                }
            }
            if furthest
                .as_ref()
                .is_none_or(|(longest, _)| consumed > *longest)
            {
                furthest = Some((consumed, end));
            }
        }

        match furthest {
            Some((consumed, end)) if consumed > 0 => (Parsed::Err, end),
            _ => {
                let found = state.peek();
                let error = ErrorKind::NoAlternative {
                    expected,
                    found: found.to_string(),
                };
                (Parsed::Err, state.add_error(found, error))
            }
        }
    })
}

// === Repetition and optionality ===

/// Run `parser`, returning `Nil` at the starting state if it fails. Errors
/// from the failed attempt are discarded.
pub fn maybe(parser: impl Into<BoxedParser>) -> BoxedParser {
    recover(parser, |start, _end| (Parsed::Nil, start), false)
}

/// Run `parser` without consuming input. The position is rewound whether or
/// not it succeeds; errors it raised stay in the log.
pub fn peek(parser: impl Into<BoxedParser>) -> BoxedParser {
    let parser = parser.into();
    BoxedParser::new(move |state: ParseState| {
        let (result, end) = parser.parse(state.clone());
        (result, end.rewind_to(&state))
    })
}

/// Lookahead that neither consumes input nor reports errors.
pub fn maybe_peek(parser: impl Into<BoxedParser>) -> BoxedParser {
    peek(maybe(parser))
}

/// Zero or more matches of `parser`, collected into a `Sequence`.
///
/// A `Nil` that consumed input (a [`crate::parser::recover_to`] placeholder)
/// is kept as an element; a match that consumed nothing ends the loop.
pub fn many(parser: impl Into<BoxedParser>) -> BoxedParser {
    let parser = parser.into();
    BoxedParser::new(move |state: ParseState| repeat(&parser, Sequence::new(), state))
}

/// One or more matches of `parser`. A failure of the first attempt is
/// propagated.
pub fn many1(parser: impl Into<BoxedParser>) -> BoxedParser {
    let parser = parser.into();
    BoxedParser::new(move |state: ParseState| {
        let (first, state) = parser.parse(state);
        if first.is_err() {
            return (Parsed::Err, state);
        }
        repeat(&parser, Sequence::from(vec![first]), state)
    })
}

fn repeat(parser: &BoxedParser, mut results: Sequence, mut state: ParseState) -> ParseResult {
    loop {
        let (result, next) = parser.parse(state.clone());
        if result.is_err() {
            break;
        }
        if next.position() == state.position() {
            debug!(
                position = state.position(),
                "repetition matched without consuming input, stopping"
            );
            break;
        }
        results.push(result);
        state = next;
    }
    (Parsed::Sequence(results), state)
}

/// Zero or more `parser`s separated by `delim`.
pub fn sep_by(parser: impl Into<BoxedParser>, delim: impl Into<BoxedParser>) -> BoxedParser {
    separated(parser.into(), delim.into(), None, false)
}

/// Zero or more `parser`s separated by `delim`, closed by `terminator`.
pub fn sep_by_term(
    parser: impl Into<BoxedParser>,
    delim: impl Into<BoxedParser>,
    terminator: impl Into<BoxedParser>,
) -> BoxedParser {
    separated(parser.into(), delim.into(), Some(terminator.into()), false)
}

/// One or more `parser`s separated by `delim`.
pub fn sep_by1(parser: impl Into<BoxedParser>, delim: impl Into<BoxedParser>) -> BoxedParser {
    separated(parser.into(), delim.into(), None, true)
}

/// One or more `parser`s separated by `delim`, closed by `terminator`.
pub fn sep_by1_term(
    parser: impl Into<BoxedParser>,
    delim: impl Into<BoxedParser>,
    terminator: impl Into<BoxedParser>,
) -> BoxedParser {
    separated(parser.into(), delim.into(), Some(terminator.into()), true)
}

fn separated(
    parser: BoxedParser,
    delim: BoxedParser,
    terminator: Option<BoxedParser>,
    require_one: bool,
) -> BoxedParser {
    BoxedParser::new(move |mut state: ParseState| {
        let mut results = Sequence::new();
        let mut required = require_one;

        loop {
            let iteration_start = state.position();

            // only the first element of a `1` variant may fail loudly
            let (element, next) = parser.parse(state.clone());
            if element.is_err() {
                if required {
                    return (Parsed::Err, next);
                }
                break;
            }
            results.push(element);
            state = next;
            required = false;

            // a missing delimiter ends the list
            let (separator, next) = delim.parse(state.clone());
            if separator.is_err() {
                break;
            }
            state = next;

            if state.position() == iteration_start {
                debug!(
                    position = iteration_start,
                    "separated list made no progress, stopping"
                );
                break;
            }
        }

        if let Some(terminator) = &terminator {
            let (closed, next) = terminator.parse(state);
            if closed.is_err() {
                return (Parsed::Err, next);
            }
            state = next;
        }

        (Parsed::Sequence(results), state)
    })
}

// === Productions ===

/// Wrap a successful result of `parser` into a [`Production`] named `name`.
///
/// A single item, production or named value becomes the only child; a
/// sequence is flattened; `Nil` yields a production without children. A
/// failure passes through unwrapped.
pub fn prod(name: impl Into<String>, parser: impl Into<BoxedParser>) -> BoxedParser {
    let name: String = name.into();
    let parser = parser.into();
    BoxedParser::new(move |state: ParseState| {
        trace!(production = %name, position = state.position(), token = %state.peek(), "parsing production");

        let (result, state) = parser.parse(state);
        let children = match result {
            Parsed::Err => {
                trace!(production = %name, position = state.position(), "production failed");
                return (Parsed::Err, state);
            }
            Parsed::Nil => Sequence::new(),
            Parsed::Sequence(sequence) => match sequence.flatten() {
                Ok(children) => children,
                Err(error) => {
                    let token = state.peek();
                    let kind = ErrorKind::MalformedTree {
                        production: name.clone(),
                        reason: error.to_string(),
                    };
                    return (Parsed::Err, state.add_error(token, kind));
                }
            },
            single => Sequence::from(vec![single]),
        };

        trace!(production = %name, position = state.position(), children = children.len(), "parsed production");
        (Parsed::Production(Production::new(name.clone(), children)), state)
    })
}

/// Label a successful result of `parser` as `name`.
pub fn named(name: impl Into<String>, parser: impl Into<BoxedParser>) -> BoxedParser {
    let name: String = name.into();
    let parser = parser.into();
    BoxedParser::new(move |state: ParseState| {
        let (value, state) = parser.parse(state);
        if value.is_err() {
            return (value, state);
        }
        let named = NamedValue {
            name: name.clone(),
            value: Box::new(value),
        };
        (Parsed::Named(named), state)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{BufferedLexer, Item};

    fn state(kinds: &[&'static str]) -> ParseState {
        ParseState::new(BufferedLexer::new(
            kinds.iter().map(|kind| Item::new(*kind, *kind)),
        ))
    }

    #[test]
    fn tok_consumes_on_match() {
        let (result, next) = tok("A").parse(state(&["A", "B"]));
        assert_eq!(result.as_item().map(|i| i.value.as_str()), Some("A"));
        assert_eq!(next.position(), 1);
        assert!(next.errors().is_empty());
    }

    #[test]
    fn tok_reports_mismatch_without_consuming() {
        let (result, next) = tok("B").parse(state(&["A"]));
        assert!(result.is_err());
        assert_eq!(next.position(), 0);
        assert_eq!(next.errors().len(), 1);
        assert_eq!(
            next.errors().last().map(|e| e.message()),
            Some("expected 'B' got 'A'".to_string())
        );
    }

    #[test]
    fn seq_keeps_partial_consumption() {
        let (result, next) = seq![tok("A"), tok("B"), tok("C")].parse(state(&["A", "B", "X"]));
        assert!(result.is_err());
        assert_eq!(next.position(), 2);
        assert_eq!(next.errors().len(), 1);
    }

    #[test]
    fn or_reports_furthest_failure() {
        let short = seq![tok("A"), tok("X")];
        let long = seq![tok("A"), tok("B"), tok("X")];
        let (result, next) = or![short, long].parse(state(&["A", "B", "C"]));
        assert!(result.is_err());
        assert_eq!(next.position(), 2);
        assert_eq!(
            next.errors().last().map(|e| e.message()),
            Some("expected 'X' got 'C'".to_string())
        );
    }

    #[test]
    fn or_without_progress_reports_exhausted_alternatives() {
        let (result, next) = or![tok("A"), tok("B")].parse(state(&["C"]));
        assert!(result.is_err());
        assert_eq!(next.position(), 0);
        assert_eq!(next.errors().len(), 1);
        match next.errors().last().map(|e| &e.kind) {
            Some(ErrorKind::NoAlternative { expected, found }) => {
                assert_eq!(expected, &vec!["A".to_string(), "B".to_string()]);
                assert_eq!(found, "'C'");
            }
            other => panic!("expected NoAlternative, got {other:?}"),
        }
    }

    #[test]
    fn empty_or_fails() {
        let (result, next) = or(vec![]).parse(state(&["A"]));
        assert!(result.is_err());
        assert_eq!(next.errors().len(), 1);
    }

    #[test]
    fn peek_rewinds_but_keeps_errors() {
        let (result, next) = peek(tok("A")).parse(state(&["A"]));
        assert!(result.as_item().is_some());
        assert_eq!(next.position(), 0);

        let (result, next) = peek(tok("B")).parse(state(&["A"]));
        assert!(result.is_err());
        assert_eq!(next.errors().len(), 1);

        let (result, next) = maybe_peek(tok("B")).parse(state(&["A"]));
        assert!(result.is_nil());
        assert!(next.errors().is_empty());
    }

    #[test]
    fn many_stops_on_empty_success() {
        let (result, next) = many(many(tok("A"))).parse(state(&["B"]));
        assert_eq!(result.as_sequence().map(|s| s.len()), Some(0));
        assert_eq!(next.position(), 0);
    }

    #[test]
    fn separated_list_stops_on_empty_iteration() {
        let (result, next) = sep_by(maybe(tok("A")), maybe(char(','))).parse(state(&["B"]));
        let elements = result.as_sequence().cloned().unwrap();
        assert_eq!(elements.len(), 1);
        assert!(elements[0].is_nil());
        assert_eq!(next.position(), 0);
        assert!(next.errors().is_empty());

        let parser = sep_by1_term(maybe(tok("A")), maybe(char(',')), tok("B"));
        let (result, next) = parser.parse(state(&["B"]));
        let elements = result.as_sequence().cloned().unwrap();
        assert_eq!(elements.len(), 1);
        assert!(elements[0].is_nil());
        assert_eq!(next.position(), 1);
        assert!(next.errors().is_empty());
    }

    #[test]
    fn many1_requires_first_match() {
        let (result, next) = many1(tok("A")).parse(state(&["B"]));
        assert!(result.is_err());
        assert_eq!(next.errors().len(), 1);

        let (result, next) = many1(tok("A")).parse(state(&["A", "A", "B"]));
        assert_eq!(result.as_sequence().map(|s| s.len()), Some(2));
        assert_eq!(next.position(), 2);
    }

    #[test]
    fn prod_wraps_single_children() {
        let (result, _) = prod("Int", tok("A")).parse(state(&["A"]));
        let production = result.as_production().cloned().unwrap();
        assert_eq!(production.name, "Int");
        assert_eq!(production.children.len(), 1);

        let (result, _) = prod("Empty", maybe(tok("B"))).parse(state(&["A"]));
        assert_eq!(result.as_production().map(|p| p.children.len()), Some(0));
    }

    #[test]
    fn named_labels_success_only() {
        let (result, _) = named("key", tok("A")).parse(state(&["A"]));
        assert_eq!(result.as_named().map(|n| n.name.as_str()), Some("key"));

        let (result, _) = tok("B").named("key").parse(state(&["A"]));
        assert!(result.is_err());
    }
}
