//! Token model and the lexer capability consumed by the parser.
//!
//! The engine never tokenizes anything itself. A grammar hands it something
//! implementing [`Lexer`], which answers "which token sits at position `n`?"
//! for any `n`, as often as asked. [`BufferedLexer`] is the eager
//! implementation most grammars want: tokenize everything up front, then
//! serve lookups out of a `Vec`.

use std::borrow::Cow;
use std::fmt;

/// The kind tag of a token, e.g. `INT_LITERAL` or `[`.
///
/// Single-character kinds are how punctuation is usually modelled; see
/// [`crate::parser::char`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKind(Cow<'static, str>);

impl TokenKind {
    /// The kind of the end-of-stream token.
    pub const EOF: TokenKind = TokenKind::new("");

    pub const fn new(kind: &'static str) -> Self {
        Self(Cow::Borrowed(kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_eof(&self) -> bool {
        self.0.is_empty()
    }

    fn is_single_char(&self) -> bool {
        self.0.chars().count() == 1
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            f.write_str("EOF")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&'static str> for TokenKind {
    fn from(kind: &'static str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for TokenKind {
    fn from(kind: String) -> Self {
        Self(Cow::Owned(kind))
    }
}

impl From<char> for TokenKind {
    fn from(c: char) -> Self {
        Self(Cow::Owned(c.to_string()))
    }
}

/// A single lexical token. Created by a [`Lexer`], never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub kind: TokenKind,
    pub value: String,
    /// Byte offset of the token in its source.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    /// Position of the token in the token stream.
    pub index: usize,
    pub source_file: String,
}

impl Item {
    pub fn new(kind: impl Into<TokenKind>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            offset: 0,
            line: 0,
            column: 0,
            index: 0,
            source_file: String::new(),
        }
    }

    /// The distinguished token returned for positions past the end of input.
    pub fn eof() -> Self {
        Self::new(TokenKind::EOF, "EOF")
    }

    pub fn at(mut self, offset: usize, line: usize, column: usize) -> Self {
        self.offset = offset;
        self.line = line;
        self.column = column;
        self
    }

    pub fn in_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = source_file.into();
        self
    }

    pub fn is_eof(&self) -> bool {
        self.kind.is_eof()
    }

    pub fn start(&self) -> usize {
        self.offset
    }

    pub fn end(&self) -> usize {
        self.offset + self.value.len()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            f.write_str("EOF")
        } else if self.kind.is_single_char() {
            write!(f, "'{}'", self.kind)
        } else {
            write!(f, "[{} {}]", self.kind, self.value)
        }
    }
}

/// Random-access token source.
///
/// `at` must be total and free of side effects: backtracking asks for the
/// same position many times, and may ask for positions past the end, which
/// must yield an end-of-stream token (see [`Item::eof`]).
pub trait Lexer {
    fn at(&self, position: usize) -> Item;
}

/// A lexer over a fully tokenized input.
#[derive(Debug, Clone, Default)]
pub struct BufferedLexer {
    buffer: Vec<Item>,
    eof: Option<Item>,
}

impl BufferedLexer {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let buffer = items
            .into_iter()
            .enumerate()
            .map(|(index, mut item)| {
                item.index = index;
                item
            })
            .collect();
        Self { buffer, eof: None }
    }

    /// Like [`BufferedLexer::new`], with `eof` served for every position
    /// past the last item. Its location should point at the end of the
    /// source, which the buffer alone cannot know when it is empty.
    pub fn with_eof(items: impl IntoIterator<Item = Item>, eof: Item) -> Self {
        Self {
            eof: Some(eof),
            ..Self::new(items)
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.buffer
    }
}

impl Lexer for BufferedLexer {
    fn at(&self, position: usize) -> Item {
        match self.buffer.get(position) {
            Some(item) => item.clone(),
            None => {
                if let Some(eof) = &self.eof {
                    let mut eof = eof.clone();
                    eof.index = position;
                    return eof;
                }
                let mut eof = Item::eof();
                eof.index = position;
                if let Some(last) = self.buffer.last() {
                    eof.source_file = last.source_file.clone();
                    eof.offset = last.end();
                    eof.line = last.line;
                    eof.column = last.column + last.value.chars().count();
                }
                eof
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_lexer_numbers_items() {
        let lexer = BufferedLexer::new(vec![Item::new('[', "["), Item::new("INT", "1")]);
        assert_eq!(lexer.at(0).index, 0);
        assert_eq!(lexer.at(1).index, 1);
        assert_eq!(lexer.at(1).value, "1");
    }

    #[test]
    fn buffered_lexer_returns_eof_past_end() {
        let lexer = BufferedLexer::new(vec![Item::new("INT", "42").at(0, 1, 1)]);
        let eof = lexer.at(1);
        assert!(eof.is_eof());
        assert_eq!(eof.offset, 2);
        assert_eq!(lexer.at(7), lexer.at(7));
        assert!(BufferedLexer::default().at(0).is_eof());
    }

    #[test]
    fn explicit_eof_is_served_past_the_end() {
        let end = Item::eof().at(3, 2, 1).in_file("input.txt");
        let lexer = BufferedLexer::with_eof(vec![Item::new("INT", "1")], end);
        assert_eq!(lexer.at(0).value, "1");

        let eof = lexer.at(4);
        assert!(eof.is_eof());
        assert_eq!(eof.index, 4);
        assert_eq!((eof.line, eof.column), (2, 1));
        assert_eq!(eof.source_file, "input.txt");

        let empty = BufferedLexer::with_eof(Vec::new(), Item::eof().at(0, 1, 1).in_file("empty"));
        assert_eq!((empty.at(0).line, empty.at(0).column), (1, 1));
        assert_eq!(empty.at(0).source_file, "empty");
    }

    #[test]
    fn item_display() {
        assert_eq!(Item::new(']', "]").to_string(), "']'");
        assert_eq!(Item::new("INT", "12").to_string(), "[INT 12]");
        assert_eq!(Item::eof().to_string(), "EOF");
    }

    #[test]
    fn borrowed_and_owned_kinds_compare_equal() {
        assert_eq!(TokenKind::from('['), TokenKind::new("["));
        assert_eq!(TokenKind::from(String::from("INT")), TokenKind::new("INT"));
        assert!(TokenKind::EOF.is_eof());
    }
}
