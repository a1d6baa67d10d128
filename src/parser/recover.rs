//! Error recovery wrappers.
//!
//! Everything here is built on [`recover`]: run a parser, and if it fails
//! hand the state before and after the attempt to a recovery function whose
//! answer replaces the failure.

use tracing::debug;

use crate::lexer::TokenKind;

use super::combinators::BoxedParser;
use super::state::{ParseResult, ParseState, Parser};
use super::tree::Parsed;

/// Run `parser`; on failure, call `recover_fn(start, end)` and return its
/// result instead.
///
/// With `report_errors` unset, the errors raised by the failed attempt are
/// stripped from `end` before `recover_fn` sees it.
pub fn recover<F>(parser: impl Into<BoxedParser>, recover_fn: F, report_errors: bool) -> BoxedParser
where
    F: Fn(ParseState, ParseState) -> ParseResult + 'static,
{
    let parser = parser.into();
    BoxedParser::new(move |state: ParseState| {
        let (result, end) = parser.parse(state.clone());
        if !result.is_err() {
            return (result, end);
        }

        let end = if report_errors {
            end
        } else {
            end.with_errors_of(&state)
        };
        recover_fn(state, end)
    })
}

/// Wrap a grammar's top-level rule: failures stay failures and their errors
/// stay in the log.
pub fn root(parser: impl Into<BoxedParser>) -> BoxedParser {
    recover(
        parser,
        |start, end| {
            debug!(
                start = start.position(),
                position = end.position(),
                errors = end.errors().len(),
                "root rule failed"
            );
            (Parsed::Err, end)
        },
        true,
    )
}

/// Silent failure: on error, return `Nil` at the starting state and forget
/// the errors.
pub fn try_parse(parser: impl Into<BoxedParser>) -> BoxedParser {
    recover(parser, |start, _end| (Parsed::Nil, start), false)
}

/// Resynchronise after a failure: skip tokens up to and including the next
/// `kind`, or up to the end of input, and carry on with `Nil`. Errors of the
/// failed attempt are kept.
///
/// The end-of-stream token itself is never consumed, so `many(recover_to(..))`
/// stops at the end of input instead of matching EOF forever.
pub fn recover_to(kind: impl Into<TokenKind>, parser: impl Into<BoxedParser>) -> BoxedParser {
    let kind = kind.into();
    recover(
        parser,
        move |_start, end| {
            let failed_at = end.position();
            let mut state = end;
            // the end-of-stream token is never consumed, so repeated
            // recovery at the end of input cannot run away
            while !state.at_end() {
                let (item, next) = state.advance();
                state = next;
                if item.kind == kind {
                    break;
                }
            }
            debug!(
                from = failed_at,
                to = state.position(),
                token = %kind,
                "resynchronised"
            );
            (Parsed::Nil, state)
        },
        true,
    )
}
