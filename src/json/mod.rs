//! A JSON grammar built on the combinator engine.
//!
//! This is a consumer of the engine like any other grammar would be: a
//! `lachs` lexer feeding a [`crate::lexer::BufferedLexer`], a grammar
//! declared through [`crate::parser::GrammarBuilder`], and a tree walker
//! turning the resulting productions into [`serde_json::Value`]s.

pub mod ast;
pub mod grammar;
pub mod lexer;

pub use ast::{BuildError, build};
pub use grammar::{JsonGrammar, grammar};

use crate::parser::{self, GrammarError, ParseError, Parsed, root};

#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("failed to tokenize {source_file}: {message}")]
    Lex { source_file: String, message: String },

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

/// Outcome of parsing one JSON document.
#[derive(Debug)]
pub struct JsonParse {
    pub tree: Parsed,
    pub errors: Vec<ParseError>,
}

impl JsonParse {
    pub fn is_clean(&self) -> bool {
        !self.tree.is_err() && self.errors.is_empty()
    }

    /// Convert the tree into a JSON value.
    pub fn value(&self) -> Result<serde_json::Value, BuildError> {
        build(&self.tree)
    }
}

/// Tokenize and parse `source` as a single JSON value.
pub fn parse(source: &str, source_file: &str) -> Result<JsonParse, JsonError> {
    let json = grammar()?;
    let lexer = lexer::tokenize(source, source_file)?;
    let (tree, errors) = parser::parse(root(&json.value), lexer);
    Ok(JsonParse { tree, errors })
}
