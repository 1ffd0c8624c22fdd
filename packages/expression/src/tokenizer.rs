use logos::Logos;
use std::ops::Range;

use crate::error::{ExprError, ExprResult};

/// Tokens of the expression grammar.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token<'src> {
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$-]*", |lex| lex.slice())]
    Ident(&'src str),

    // Quoted keypath segments / string literals. No escape sequences;
    // use the other quote style for a key containing quotes.
    #[regex(r#""[^"]*""#, |lex| lex.slice())]
    DoubleQuoted(&'src str),

    #[regex(r"'[^']*'", |lex| lex.slice())]
    SingleQuoted(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    #[token(".")]
    Dot,

    #[token("|")]
    Pipe,
}

impl<'src> Token<'src> {
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier `{}`", s),
            Token::DoubleQuoted(s) | Token::SingleQuoted(s) => format!("string {}", s),
            Token::Number(s) => format!("number {}", s),
            Token::Dot => "`.`".to_string(),
            Token::Pipe => "`|`".to_string(),
        }
    }
}

/// Tokenizes a full attribute value, failing on any unrecognized input.
pub fn tokenize(source: &str) -> ExprResult<Vec<(Token<'_>, Range<usize>)>> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(ExprError::Lexer { pos: span.start }),
        }
    }
    Ok(tokens)
}
