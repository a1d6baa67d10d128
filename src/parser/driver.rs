use tracing::debug;

use crate::lexer::Lexer;

use super::combinators::BoxedParser;
use super::state::{ParseError, ParseResult, ParseState, Parser};
use super::tree::Parsed;

/// Run `root` once from `state` and return the tree with the final state.
pub fn run(root: impl Into<BoxedParser>, state: ParseState) -> ParseResult {
    let root = root.into();
    let (tree, state) = root.parse(state);
    debug!(
        failed = tree.is_err(),
        position = state.position(),
        errors = state.errors().len(),
        "parse finished"
    );
    (tree, state)
}

/// Parse the tokens of `lexer` with `root`.
///
/// An `Err` tree means the top rule failed outright. A usable tree next to
/// a non-empty error list means recovery kicked in somewhere and parts of
/// the tree are placeholders.
pub fn parse(root: impl Into<BoxedParser>, lexer: impl Lexer + 'static) -> (Parsed, Vec<ParseError>) {
    let (tree, state) = run(root, ParseState::new(lexer));
    (tree, state.errors().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{BufferedLexer, Item};
    use crate::parser::{char, many, recover_to, root, seq, tok};

    #[test]
    fn parse_returns_tree_and_empty_log_on_success() {
        let lexer = BufferedLexer::new(vec![Item::new("INT", "1"), Item::new(';', ";")]);
        let (tree, errors) = parse(root(seq(vec![tok("INT"), char(';')])), lexer);
        assert!(tree.as_sequence().is_some());
        assert!(errors.is_empty());
    }

    #[test]
    fn partial_recovery_leaves_tree_and_errors() {
        let statements = many(recover_to(';', seq(vec![tok("INT"), char(';')])));
        let lexer = BufferedLexer::new(vec![
            Item::new("INT", "1"),
            Item::new(';', ";"),
            Item::new("IDENT", "x"),
            Item::new(';', ";"),
            Item::new("INT", "3"),
            Item::new(';', ";"),
        ]);
        let (tree, state) = run(root(statements), ParseState::new(lexer));
        let parsed = tree.as_sequence().unwrap();
        assert_eq!(parsed.len(), 3);
        assert!(parsed[1].is_nil());
        assert!(state.at_end());
        assert_eq!(state.errors().len(), 1);
        assert_eq!(
            state.errors().last().map(|e| e.message()),
            Some("expected 'INT' got [IDENT x]".to_string())
        );
    }
}
