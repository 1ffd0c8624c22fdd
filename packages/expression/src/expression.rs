use std::ops::Range;

use weft_data::{DataView, Value};

use crate::error::{ExprError, ExprResult};
use crate::tokenizer::{tokenize, Token};

/// One filter application: a name plus its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Arg>,
}

/// A filter argument: a literal, or a keypath resolved at fire time.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Literal(Value),
    Keypath(Vec<String>),
}

impl Arg {
    /// Resolves this argument against the active data view.
    pub fn resolve(&self, data: &dyn DataView) -> Value {
        match self {
            Arg::Literal(value) => value.clone(),
            Arg::Keypath(path) => data.get(path),
        }
    }
}

/// A parsed directive expression: the observed keypath plus the filter
/// chain applied to its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub keypath: Vec<String>,
    pub filters: Vec<FilterCall>,
}

impl Expression {
    pub fn parse(source: &str) -> ExprResult<Expression> {
        Parser::new(source)?.parse_expression()
    }
}

struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> ExprResult<Self> {
        Ok(Parser {
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<Token<'src>> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn current_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or_else(|| self.tokens.last().map(|(_, s)| s.end).unwrap_or(0))
    }

    fn parse_expression(&mut self) -> ExprResult<Expression> {
        let keypath = self.parse_keypath()?;
        let mut filters = Vec::new();

        while let Some(Token::Pipe) = self.peek() {
            self.advance();
            filters.push(self.parse_filter()?);
        }

        if let Some(token) = self.peek() {
            return Err(ExprError::unexpected_token(
                self.current_pos(),
                "end of expression",
                token.describe(),
            ));
        }

        Ok(Expression { keypath, filters })
    }

    fn parse_keypath(&mut self) -> ExprResult<Vec<String>> {
        let mut path = vec![self.parse_segment()?];
        while let Some(Token::Dot) = self.peek() {
            self.advance();
            path.push(self.parse_segment()?);
        }
        Ok(path)
    }

    fn parse_segment(&mut self) -> ExprResult<String> {
        let pos = self.current_pos();
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name.to_string()),
            Some(Token::SingleQuoted(s)) | Some(Token::DoubleQuoted(s)) => Ok(unquote(s)),
            // Numeric segments index into lists: `names.0`
            Some(Token::Number(n)) => Ok(n.to_string()),
            Some(token) => Err(ExprError::unexpected_token(
                pos,
                "keypath segment",
                token.describe(),
            )),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn parse_filter(&mut self) -> ExprResult<FilterCall> {
        let pos = self.current_pos();
        let name = match self.advance() {
            Some(Token::Ident(name)) => name.to_string(),
            Some(token) => {
                return Err(ExprError::unexpected_token(
                    pos,
                    "filter name",
                    token.describe(),
                ))
            }
            None => return Err(ExprError::UnexpectedEnd),
        };

        let mut args = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Pipe) | None => break,
                Some(Token::Number(_)) => {
                    let Some(Token::Number(n)) = self.advance() else {
                        unreachable!()
                    };
                    let value = n.parse::<f64>().map(Value::Number).unwrap_or(Value::Undefined);
                    args.push(Arg::Literal(value));
                }
                Some(Token::SingleQuoted(_)) | Some(Token::DoubleQuoted(_)) => {
                    match self.advance() {
                        Some(Token::SingleQuoted(s)) | Some(Token::DoubleQuoted(s)) => {
                            args.push(Arg::Literal(Value::Str(unquote(s))));
                        }
                        _ => unreachable!(),
                    }
                }
                Some(Token::Ident(name)) => match *name {
                    "true" => {
                        self.advance();
                        args.push(Arg::Literal(Value::Bool(true)));
                    }
                    "false" => {
                        self.advance();
                        args.push(Arg::Literal(Value::Bool(false)));
                    }
                    "null" => {
                        self.advance();
                        args.push(Arg::Literal(Value::Null));
                    }
                    _ => args.push(Arg::Keypath(self.parse_keypath()?)),
                },
                Some(token) => {
                    return Err(ExprError::unexpected_token(
                        self.current_pos(),
                        "filter argument",
                        token.describe(),
                    ))
                }
            }
        }

        Ok(FilterCall { name, args })
    }
}

fn unquote(s: &str) -> String {
    s[1..s.len() - 1].to_string()
}
