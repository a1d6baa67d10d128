use std::fmt;
use std::rc::Rc;

use crate::lexer::{Item, Lexer, TokenKind};

use super::tree::Parsed;

/// What every parser returns: the tree fragment and the state to continue from.
pub type ParseResult = (Parsed, ParseState);

pub trait Parser {
    fn parse(&self, state: ParseState) -> ParseResult;
}

impl<F: Fn(ParseState) -> ParseResult> Parser for F {
    fn parse(&self, state: ParseState) -> ParseResult {
        self(state)
    }
}

/// What went wrong at a given token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("expected '{expected}' got {found}")]
    Expected { expected: TokenKind, found: String },

    #[error("no alternative matched {found}, expected one of: {}", .expected.join(", "))]
    NoAlternative { expected: Vec<String>, found: String },

    #[error("rule '{name}' was used before being bound")]
    UnboundRule { name: String },

    #[error("malformed children in production '{production}': {reason}")]
    MalformedTree { production: String, reason: String },

    #[error("{0}")]
    Custom(String),
}

impl ErrorKind {
    pub fn expected(expected: TokenKind, found: &Item) -> Self {
        ErrorKind::Expected {
            expected,
            found: found.to_string(),
        }
    }
}

/// A diagnostic recorded in the parse state: the offending token and what
/// was wrong with it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    pub token: Item,
    pub kind: ErrorKind,
}

impl ParseError {
    pub fn new(token: Item, kind: ErrorKind) -> Self {
        Self { token, kind }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// `file:line:column: message`, for surfacing to users.
    pub fn diagnostic(&self) -> String {
        format!(
            "{}:{}:{}: {}",
            self.token.source_file, self.token.line, self.token.column, self.kind
        )
    }
}

struct ErrorNode {
    error: ParseError,
    prev: Option<Rc<ErrorNode>>,
}

/// Append-only error log shared structurally between parse states.
///
/// Cloning is O(1) and pushing never touches the entries of other clones, so
/// a speculative branch can log freely without affecting its siblings.
#[derive(Clone, Default)]
pub struct ErrorLog {
    head: Option<Rc<ErrorNode>>,
    len: usize,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, error: ParseError) -> ErrorLog {
        ErrorLog {
            head: Some(Rc::new(ErrorNode {
                error,
                prev: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn last(&self) -> Option<&ParseError> {
        self.head.as_ref().map(|node| &node.error)
    }

    /// Entries in the order they were recorded.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ParseError> {
        let mut entries = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            entries.push(&node.error);
            cursor = node.prev.as_deref();
        }
        entries.into_iter().rev()
    }

    /// Entries recorded after the first `skip` ones.
    pub fn since(&self, skip: usize) -> impl Iterator<Item = &ParseError> {
        self.iter().skip(skip)
    }

    pub fn to_vec(&self) -> Vec<ParseError> {
        self.iter().cloned().collect()
    }
}

impl Drop for ErrorLog {
    fn drop(&mut self) {
        // unlink iteratively, long logs would otherwise recurse once per entry
        let mut cursor = self.head.take();
        while let Some(node) = cursor {
            match Rc::try_unwrap(node) {
                Ok(mut node) => cursor = node.prev.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Cursor into the token stream plus everything reported so far.
///
/// A state is never modified in place: every operation returns a new state,
/// which is what makes backtracking a matter of holding on to an old value.
#[derive(Clone)]
pub struct ParseState {
    lexer: Rc<dyn Lexer>,
    position: usize,
    errors: ErrorLog,
}

impl ParseState {
    pub fn new(lexer: impl Lexer + 'static) -> Self {
        Self::with_lexer(Rc::new(lexer))
    }

    pub fn with_lexer(lexer: Rc<dyn Lexer>) -> Self {
        Self {
            lexer,
            position: 0,
            errors: ErrorLog::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn lexer(&self) -> &Rc<dyn Lexer> {
        &self.lexer
    }

    /// The token under the cursor.
    pub fn peek(&self) -> Item {
        self.lexer.at(self.position)
    }

    /// The token before the cursor, if any.
    pub fn last(&self) -> Option<Item> {
        self.position
            .checked_sub(1)
            .map(|position| self.lexer.at(position))
    }

    pub fn at_end(&self) -> bool {
        self.peek().is_eof()
    }

    /// Consume the token under the cursor.
    pub fn advance(&self) -> (Item, ParseState) {
        let item = self.peek();
        let mut next = self.clone();
        next.position += 1;
        (item, next)
    }

    pub fn add_error(&self, token: Item, kind: ErrorKind) -> ParseState {
        let mut next = self.clone();
        next.errors = self.errors.push(ParseError::new(token, kind));
        next
    }

    /// Append every error of `source` to this state's log.
    pub fn add_errors_from(&self, source: &ParseState) -> ParseState {
        let mut next = self.clone();
        for error in source.errors.iter() {
            next.errors = next.errors.push(error.clone());
        }
        next
    }

    /// This state's errors at `other`'s position.
    pub fn rewind_to(&self, other: &ParseState) -> ParseState {
        let mut next = self.clone();
        next.position = other.position;
        next
    }

    /// This state's position with `other`'s error log.
    pub fn with_errors_of(&self, other: &ParseState) -> ParseState {
        let mut next = self.clone();
        next.errors = other.errors.clone();
        next
    }
}

impl fmt::Debug for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseState")
            .field("position", &self.position)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
