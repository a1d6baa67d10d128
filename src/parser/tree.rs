//! The uniform parse tree every combinator produces.

use std::fmt;
use std::ops::Deref;

use crate::lexer::{Item, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("an error sentinel cannot appear inside a sequence")]
    EmbeddedErr,
}

/// Result of running a parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Nothing matched, and that is fine.
    Nil,
    /// Nothing matched, and an error was raised.
    Err,
    Item(Item),
    Production(Production),
    Named(NamedValue),
    Sequence(Sequence),
}

impl Parsed {
    pub fn is_err(&self) -> bool {
        matches!(self, Parsed::Err)
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Parsed::Nil)
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Parsed::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_production(&self) -> Option<&Production> {
        match self {
            Parsed::Production(production) => Some(production),
            _ => None,
        }
    }

    pub fn as_named(&self) -> Option<&NamedValue> {
        match self {
            Parsed::Named(named) => Some(named),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Parsed::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }
}

impl fmt::Display for Parsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parsed::Nil => f.write_str("Nil"),
            Parsed::Err => f.write_str("Err"),
            Parsed::Item(item) => write!(f, "{item}"),
            Parsed::Production(production) => write!(f, "{production}"),
            Parsed::Named(named) => write!(f, "{named}"),
            Parsed::Sequence(sequence) => write!(f, "{sequence}"),
        }
    }
}

/// The result of a named grammar rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub name: String,
    pub children: Sequence,
}

impl Production {
    pub fn new(name: impl Into<String>, children: Sequence) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Children that are themselves productions.
    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.children.iter().filter_map(Parsed::as_production)
    }

    pub fn named(&self, name: &str) -> Option<&Parsed> {
        self.children
            .iter()
            .filter_map(Parsed::as_named)
            .find(|named| named.name == name)
            .map(|named| named.value.as_ref())
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.name, self.children)
    }
}

/// A labelled sub-result, e.g. the key of a key/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    pub name: String,
    pub value: Box<Parsed>,
}

impl fmt::Display for NamedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(\"{}\" {})", self.name, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence(Vec<Parsed>);

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, parsed: Parsed) {
        self.0.push(parsed);
    }

    pub fn into_inner(self) -> Vec<Parsed> {
        self.0
    }

    /// Inline nested sequences into a single level.
    ///
    /// `Nil` entries are kept. An `Err` anywhere in the tree is a bug in the
    /// combinator that produced it, and is rejected.
    pub fn flatten(&self) -> Result<Sequence, TreeError> {
        let mut flat = Vec::with_capacity(self.0.len());
        self.flatten_into(&mut flat)?;
        Ok(Sequence(flat))
    }

    fn flatten_into(&self, flat: &mut Vec<Parsed>) -> Result<(), TreeError> {
        for parsed in &self.0 {
            match parsed {
                Parsed::Sequence(inner) => inner.flatten_into(flat)?,
                Parsed::Err => return Err(TreeError::EmbeddedErr),
                other => flat.push(other.clone()),
            }
        }
        Ok(())
    }

    /// Drop top-level items whose kind is one of `kinds`.
    pub fn filter(&self, kinds: &[TokenKind]) -> Sequence {
        self.0
            .iter()
            .filter(|parsed| match parsed {
                Parsed::Item(item) => !kinds.contains(&item.kind),
                _ => true,
            })
            .cloned()
            .collect()
    }
}

impl Deref for Sequence {
    type Target = [Parsed];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Parsed>> for Sequence {
    fn from(items: Vec<Parsed>) -> Self {
        Self(items)
    }
}

impl FromIterator<Parsed> for Sequence {
    fn from_iter<I: IntoIterator<Item = Parsed>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Sequence {
    type Item = Parsed;
    type IntoIter = std::vec::IntoIter<Parsed>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Parsed;
    type IntoIter = std::slice::Iter<'a, Parsed>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, parsed) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{parsed}")?;
        }
        Ok(())
    }
}
