use parsnip::json::lexer::{BOOL_LITERAL, INT_LITERAL, STRING_LITERAL, Token, tokenize};
use parsnip::lexer::{Lexer, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    let lexer = tokenize(source, "test.json").unwrap();
    lexer.items().iter().map(|item| item.kind.clone()).collect()
}

fn values(source: &str) -> Vec<String> {
    let lexer = tokenize(source, "test.json").unwrap();
    lexer.items().iter().map(|item| item.value.clone()).collect()
}

#[test]
fn lex_punctuation() {
    let tokens = Token::lex("[ ] { } , :").unwrap();
    assert_eq!(tokens.len(), 6);
    assert!(matches!(tokens[0], Token::LBracket(_)));
    assert!(matches!(tokens[1], Token::RBracket(_)));
    assert!(matches!(tokens[2], Token::LBrace(_)));
    assert!(matches!(tokens[3], Token::RBrace(_)));
    assert!(matches!(tokens[4], Token::Comma(_)));
    assert!(matches!(tokens[5], Token::Colon(_)));
}

#[test]
fn lex_integers() {
    let tokens = Token::lex("42 0 -7").unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::Integer(i) if i.value == "42"));
    assert!(matches!(&tokens[1], Token::Integer(i) if i.value == "0"));
    assert!(matches!(&tokens[2], Token::Integer(i) if i.value == "-7"));
}

#[test]
fn lex_booleans() {
    let tokens = Token::lex("true false").unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(matches!(tokens[0], Token::True(_)));
    assert!(matches!(tokens[1], Token::False(_)));
}

#[test]
fn lex_string_literals() {
    let tokens = Token::lex(r#""hello" "world""#).unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::StringLiteral(s) if s.value == "\"hello\""));
    assert!(matches!(&tokens[1], Token::StringLiteral(_)));
}

#[test]
fn punctuation_maps_to_single_char_kinds() {
    assert_eq!(
        kinds("[,]"),
        vec![TokenKind::from('['), TokenKind::from(','), TokenKind::from(']')]
    );
    assert_eq!(
        kinds("{:}"),
        vec![TokenKind::from('{'), TokenKind::from(':'), TokenKind::from('}')]
    );
}

#[test]
fn literals_map_to_literal_kinds() {
    assert_eq!(
        kinds(r#"1 "a" true false"#),
        vec![INT_LITERAL, STRING_LITERAL, BOOL_LITERAL, BOOL_LITERAL]
    );
}

#[test]
fn items_keep_source_text() {
    assert_eq!(
        values(r#"{"key": [12, false]}"#),
        vec!["{", "\"key\"", ":", "[", "12", ",", "false", "]", "}"]
    );
}

#[test]
fn items_carry_source_file_and_index() {
    let lexer = tokenize("[1, 2]", "numbers.json").unwrap();
    assert_eq!(lexer.len(), 5);
    for (index, item) in lexer.items().iter().enumerate() {
        assert_eq!(item.index, index);
        assert_eq!(item.source_file, "numbers.json");
    }
}

#[test]
fn lexer_yields_eof_past_the_last_token() {
    let lexer = tokenize("[1]", "test.json").unwrap();
    assert!(!lexer.at(2).is_eof());
    assert!(lexer.at(3).is_eof());
    assert!(lexer.at(100).is_eof());
    assert_eq!(lexer.at(3).source_file, "test.json");
}

#[test]
fn empty_source_has_only_a_located_eof() {
    let lexer = tokenize("", "empty.json").unwrap();
    assert!(lexer.is_empty());
    let eof = lexer.at(0);
    assert!(eof.is_eof());
    assert_eq!((eof.line, eof.column), (1, 1));
    assert_eq!(eof.source_file, "empty.json");
}
