//! # Parsnip - a backtracking parser-combinator engine
//!
//! Parsnip turns a token stream into a uniform parse tree. Grammars are
//! built by composing small parsers; every parser is a function from a parse
//! state to a tree fragment and a new parse state.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Code (String)
//!     ↓
//! [Lexer] → Items, addressable by position (lexer::Lexer)
//!     ↓
//! [Parser] → Parsed tree + error log (parser::parse)
//!     ↓
//! [Tree walker] → whatever the grammar's consumer wants
//! ```
//!
//! ## Key Design Decisions
//!
//! ### Immutable parse state
//! A [`parser::ParseState`] is never changed in place. Advancing or logging
//! an error produces a new state, so backtracking is just reusing an older
//! value and speculative branches cannot leak into each other. The error log
//! is a persistent list, which keeps cloning a state O(1).
//!
//! ### One tree shape
//! Every combinator returns a [`parser::Parsed`]: `Nil`, `Err`, a token, a
//! named production, a labelled value, or a sequence. Productions flatten
//! their children so consumers see one level per grammar rule.
//!
//! ### Recovery is a wrapper
//! Error handling is opt-in per rule through [`parser::recover`] and the
//! wrappers built on it (`root`, `try_parse`, `recover_to`).
//!
//! ### Grammars are values
//! Rules are declared through a [`parser::GrammarBuilder`]. Forward
//! references use [`parser::Rule`] handles, and the builder records every
//! production name and result schema in a registry for code generators.
//!
//! ## Module Structure
//!
//! - [`lexer`] - Token model and the lexer capability
//! - [`parser`] - Parse state, tree, combinators, recovery, grammars, driver
//! - [`json`] - A JSON grammar built on the engine
//!
//! ## Example
//!
//! ```text
//! let mut builder = GrammarBuilder::new("list");
//! let value = builder.declare("Value");
//! builder.define(&value, tok("INT"))?;
//! let list = builder.prod("List", seq![char('['), sep_by_term(&value, char(','), char(']'))]);
//! let grammar = builder.finish()?;
//!
//! let (tree, errors) = parse(root(list), lexer);
//! ```

pub mod json;
pub mod lexer;
pub mod parser;
