//! Declaring grammars: forward-declared rules, named productions, and the
//! registry of production metadata handed to code generators.
//!
//! ```text
//! let mut builder = GrammarBuilder::new("json");
//! let value = builder.declare("Value");
//! let list = builder.typed_prod("List", Schema::List,
//!     seq![char('['), sep_by_term(&value, char(','), char(']'))]);
//! builder.define_typed(&value, Schema::reference("JsonValue"), or![list, ...])?;
//! let grammar = builder.finish()?;
//! ```

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::combinators::{BoxedParser, prod};
use super::state::{ErrorKind, ParseResult, ParseState, Parser};
use super::tree::Parsed;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("rule '{0}' is already bound")]
    AlreadyBound(String),

    #[error("rule '{0}' was declared but never bound")]
    Unbound(String),

    #[error("production '{0}' is declared more than once")]
    DuplicateProduction(String),
}

/// Declared result shape of a production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "name", rename_all = "snake_case")]
pub enum Schema {
    Integer,
    String,
    Boolean,
    List,
    Mapping,
    /// An opaque reference to a named type, resolved by the generator.
    Reference(String),
}

impl Schema {
    pub fn reference(name: impl Into<String>) -> Self {
        Schema::Reference(name.into())
    }
}

/// Production names in declaration order, plus the declared schema of each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRegistry {
    order: Vec<String>,
    schemas: BTreeMap<String, Option<Schema>>,
}

impl RuleRegistry {
    pub fn productions(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name).and_then(Option::as_ref)
    }

    /// `(name, schema)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Schema>)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.schema(name)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn register(&mut self, name: &str, schema: Option<Schema>) -> Result<(), GrammarError> {
        if self.schemas.contains_key(name) {
            return Err(GrammarError::DuplicateProduction(name.to_string()));
        }
        self.order.push(name.to_string());
        self.schemas.insert(name.to_string(), schema);
        Ok(())
    }
}

struct RuleCell {
    name: String,
    body: OnceCell<BoxedParser>,
}

/// A named handle to a parser that is defined later.
///
/// Rules make recursive grammars possible: a rule can be used inside other
/// parsers (including its own body) before it is bound. Clones share the
/// same binding.
#[derive(Clone)]
pub struct Rule {
    cell: Rc<RuleCell>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            cell: Rc::new(RuleCell {
                name: name.into(),
                body: OnceCell::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn is_bound(&self) -> bool {
        self.cell.body.get().is_some()
    }

    pub fn bind(&self, parser: impl Into<BoxedParser>) -> Result<(), GrammarError> {
        self.cell
            .body
            .set(parser.into())
            .map_err(|_| GrammarError::AlreadyBound(self.cell.name.clone()))
    }
}

impl Parser for Rule {
    fn parse(&self, state: ParseState) -> ParseResult {
        match self.cell.body.get() {
            Some(parser) => parser.parse(state),
            None => {
                let token = state.peek();
                let error = ErrorKind::UnboundRule {
                    name: self.cell.name.clone(),
                };
                (Parsed::Err, state.add_error(token, error))
            }
        }
    }
}

impl From<Rule> for BoxedParser {
    fn from(rule: Rule) -> Self {
        BoxedParser::new(rule)
    }
}

impl From<&Rule> for BoxedParser {
    fn from(rule: &Rule) -> Self {
        BoxedParser::new(rule.clone())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.cell.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Collects productions and rules while a grammar is being declared.
#[derive(Debug)]
pub struct GrammarBuilder {
    name: String,
    registry: RuleRegistry,
    rules: Vec<Rule>,
    problems: Vec<GrammarError>,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: RuleRegistry::default(),
            rules: Vec::new(),
            problems: Vec::new(),
        }
    }

    /// Forward-declare a rule, to be bound with [`GrammarBuilder::define`]
    /// or [`GrammarBuilder::define_typed`].
    pub fn declare(&mut self, name: impl Into<String>) -> Rule {
        let rule = Rule::new(name);
        self.rules.push(rule.clone());
        rule
    }

    /// A named production without a declared result shape.
    pub fn prod(&mut self, name: &str, parser: impl Into<BoxedParser>) -> BoxedParser {
        self.note(name, None);
        prod(name, parser)
    }

    /// A named production with a declared result shape.
    pub fn typed_prod(
        &mut self,
        name: &str,
        schema: Schema,
        parser: impl Into<BoxedParser>,
    ) -> BoxedParser {
        self.note(name, Some(schema));
        prod(name, parser)
    }

    /// Bind `rule` to a production named after it.
    pub fn define(&mut self, rule: &Rule, parser: impl Into<BoxedParser>) -> Result<(), GrammarError> {
        let production = self.prod(rule.name(), parser);
        rule.bind(production)
    }

    /// Bind `rule` to a typed production named after it.
    pub fn define_typed(
        &mut self,
        rule: &Rule,
        schema: Schema,
        parser: impl Into<BoxedParser>,
    ) -> Result<(), GrammarError> {
        let production = self.typed_prod(rule.name(), schema, parser);
        rule.bind(production)
    }

    /// Finish the declaration. Fails if a production name was used twice or
    /// a declared rule was never bound.
    pub fn finish(self) -> Result<Grammar, GrammarError> {
        if let Some(problem) = self.problems.into_iter().next() {
            return Err(problem);
        }
        if let Some(unbound) = self.rules.iter().find(|rule| !rule.is_bound()) {
            return Err(GrammarError::Unbound(unbound.name().to_string()));
        }

        let rules = self
            .rules
            .into_iter()
            .map(|rule| (rule.name().to_string(), rule))
            .collect();
        Ok(Grammar {
            name: self.name,
            registry: self.registry,
            rules,
        })
    }

    fn note(&mut self, name: &str, schema: Option<Schema>) {
        if let Err(problem) = self.registry.register(name, schema) {
            self.problems.push(problem);
        }
    }
}

/// A fully declared grammar.
#[derive(Debug)]
pub struct Grammar {
    name: String,
    registry: RuleRegistry,
    rules: BTreeMap<String, Rule>,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }
}
