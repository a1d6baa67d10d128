//! The combinator engine.
//!
//! - `state`: the threaded parse state and its error log
//! - `tree`: the uniform parse tree
//! - `combinators`: matching, sequencing, alternation, repetition, productions
//! - `recover`: error recovery wrappers
//! - `grammar`: forward-declared rules and the production registry
//! - `driver`: running a root parser over a lexer

mod combinators;
mod driver;
mod grammar;
mod recover;
mod state;
mod tree;

pub use combinators::*;
pub use driver::{parse, run};
pub use grammar::*;
pub use recover::*;
pub use state::{ErrorKind, ErrorLog, ParseError, ParseResult, ParseState, Parser};
pub use tree::*;
