//! The JSON grammar.
//!
//! ```text
//! IntLiteral     := INT_LITERAL
//! StringLiteral  := STRING_LITERAL
//! BooleanLiteral := BOOL_LITERAL
//! List           := "[" (Value ("," Value)* ","?)? "]"
//! Dict           := "{" (Field ("," Field)* ","?)? "}"
//! Field          := StringLiteral ":" Value
//! Value          := IntLiteral | StringLiteral | BooleanLiteral | List | Dict
//! ```

use crate::parser::{
    Grammar, GrammarBuilder, GrammarError, Rule, Schema, char, named, sep_by_term, tok,
};

use super::lexer::{BOOL_LITERAL, INT_LITERAL, STRING_LITERAL};

/// The JSON grammar together with handles to each of its rules.
#[derive(Debug)]
pub struct JsonGrammar {
    pub grammar: Grammar,
    pub int_literal: Rule,
    pub string_literal: Rule,
    pub boolean_literal: Rule,
    pub list: Rule,
    pub dict: Rule,
    pub field: Rule,
    pub value: Rule,
}

pub fn grammar() -> Result<JsonGrammar, GrammarError> {
    let mut builder = GrammarBuilder::new("json");

    let int_literal = builder.declare("IntLiteral");
    let string_literal = builder.declare("StringLiteral");
    let boolean_literal = builder.declare("BooleanLiteral");
    let list = builder.declare("List");
    let dict = builder.declare("Dict");
    let field = builder.declare("Field");
    let value = builder.declare("Value");

    builder.define_typed(&int_literal, Schema::Integer, tok(INT_LITERAL))?;
    builder.define_typed(&string_literal, Schema::String, tok(STRING_LITERAL))?;
    builder.define_typed(&boolean_literal, Schema::Boolean, tok(BOOL_LITERAL))?;

    builder.define_typed(
        &list,
        Schema::List,
        crate::seq![char('['), sep_by_term(&value, char(','), char(']'))],
    )?;

    builder.define_typed(
        &dict,
        Schema::Mapping,
        crate::seq![char('{'), sep_by_term(&field, char(','), char('}'))],
    )?;

    builder.define_typed(
        &field,
        Schema::reference("DictField"),
        crate::seq![
            named("key", &string_literal),
            char(':'),
            named("value", &value)
        ],
    )?;

    builder.define_typed(
        &value,
        Schema::reference("JsonValue"),
        crate::or![
            &int_literal,
            &string_literal,
            &boolean_literal,
            &list,
            &dict
        ],
    )?;

    Ok(JsonGrammar {
        grammar: builder.finish()?,
        int_literal,
        string_literal,
        boolean_literal,
        list,
        dict,
        field,
        value,
    })
}
