use lachs::Span;

use crate::lexer::{BufferedLexer, Item, TokenKind};

pub const INT_LITERAL: TokenKind = TokenKind::new("INT_LITERAL");
pub const STRING_LITERAL: TokenKind = TokenKind::new("STRING_LITERAL");
pub const BOOL_LITERAL: TokenKind = TokenKind::new("BOOL_LITERAL");

#[lachs::token]
pub enum Token {
    #[terminal("[")]
    LBracket,
    #[terminal("]")]
    RBracket,
    #[terminal("{")]
    LBrace,
    #[terminal("}")]
    RBrace,
    #[terminal(",")]
    Comma,
    #[terminal(":")]
    Colon,
    #[terminal("true")]
    True,
    #[terminal("false")]
    False,
    #[literal("-?[0-9]+")]
    Integer,
    #[literal(r#""([^"\\]|\\.)*""#)]
    StringLiteral,
}

impl Token {
    pub fn pos(&self) -> Span {
        match self {
            Token::LBracket(inner) => inner.position.clone(),
            Token::RBracket(inner) => inner.position.clone(),
            Token::LBrace(inner) => inner.position.clone(),
            Token::RBrace(inner) => inner.position.clone(),
            Token::Comma(inner) => inner.position.clone(),
            Token::Colon(inner) => inner.position.clone(),
            Token::True(inner) => inner.position.clone(),
            Token::False(inner) => inner.position.clone(),
            Token::Integer(inner) => inner.position.clone(),
            Token::StringLiteral(inner) => inner.position.clone(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::LBracket(_) => TokenKind::from('['),
            Token::RBracket(_) => TokenKind::from(']'),
            Token::LBrace(_) => TokenKind::from('{'),
            Token::RBrace(_) => TokenKind::from('}'),
            Token::Comma(_) => TokenKind::from(','),
            Token::Colon(_) => TokenKind::from(':'),
            Token::True(_) | Token::False(_) => BOOL_LITERAL,
            Token::Integer(_) => INT_LITERAL,
            Token::StringLiteral(_) => STRING_LITERAL,
        }
    }

    /// The source text of the token.
    pub fn text(&self) -> String {
        match self {
            Token::LBracket(_) => "[".to_string(),
            Token::RBracket(_) => "]".to_string(),
            Token::LBrace(_) => "{".to_string(),
            Token::RBrace(_) => "}".to_string(),
            Token::Comma(_) => ",".to_string(),
            Token::Colon(_) => ":".to_string(),
            Token::True(_) => "true".to_string(),
            Token::False(_) => "false".to_string(),
            Token::Integer(inner) => inner.value.clone(),
            Token::StringLiteral(inner) => inner.value.clone(),
        }
    }
}

/// Tokenize `source` into a lexer the parser can query by position.
///
/// Lines and columns are reported 1-based; columns count characters, not
/// bytes. The end-of-stream item sits just past the last character of the
/// source, so even an empty document yields a located diagnostic.
pub fn tokenize(source: &str, source_file: &str) -> Result<BufferedLexer, super::JsonError> {
    let tokens = Token::lex(source).map_err(|e| super::JsonError::Lex {
        source_file: source_file.to_string(),
        message: e.to_string(),
    })?;

    let line_starts = line_starts(source);
    let items = tokens.iter().map(|token| {
        // lachs reports a 0-based line and a 0-based byte column
        let (line, byte_column) = token.pos().start;
        let line_start = line_starts.get(line).copied().unwrap_or(source.len());
        let offset = (line_start + byte_column).min(source.len());
        Item::new(token.kind(), token.text())
            .at(offset, line + 1, char_column(source, line_start, offset))
            .in_file(source_file)
    });

    let last_line_start = line_starts.last().copied().unwrap_or(0);
    let eof = Item::eof()
        .at(
            source.len(),
            line_starts.len(),
            char_column(source, last_line_start, source.len()),
        )
        .in_file(source_file);

    Ok(BufferedLexer::with_eof(items, eof))
}

fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// 1-based character column of byte `offset` on the line starting at
/// `line_start`.
fn char_column(source: &str, line_start: usize, offset: usize) -> usize {
    source
        .get(line_start..offset)
        .map_or(0, |prefix| prefix.chars().count())
        + 1
}
