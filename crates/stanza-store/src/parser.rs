use std::fs;
use std::path::Path;

use crate::collections::IndexMap;
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::Value;

/// Parses store text into a [`Value`].
///
/// The result is always a [`Value::Array`]: the top level of a store is
/// an implicit array written without surrounding braces. Empty input
/// yields an empty root array.
pub fn parse(input: &str) -> Result<Value, ParseError> {
    Parser::new(input).parse()
}

/// Reads a whole file and parses its content as store text.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Value, ParseError> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

/// Recursive descent parser folding a token stream into a [`Value`] tree.
///
/// `,` and `;` are interchangeable separators between entries and list
/// elements, and plain whitespace separates just as well; trailing
/// separators before `)` and `}` are legal. Duplicate keys within one
/// array level resolve to the last written value.
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            current: Token {
                kind: TokenKind::Eof,
                index: 0,
            },
        }
    }

    /// Consumes the parser and produces the root array.
    pub fn parse(mut self) -> Result<Value, ParseError> {
        self.bump()?;
        let entries = self.entries(None)?;
        Ok(Value::Array(entries))
    }

    /// Replaces the current token with the next one, returning the old.
    fn bump(&mut self) -> Result<Token, ParseError> {
        let next = match self.lexer.next() {
            Some(token) => token?,
            // The lexer is exhausted only after its Eof token; keep
            // answering Eof at the same position from here on.
            None => Token {
                kind: TokenKind::Eof,
                index: self.current.index,
            },
        };

        Ok(std::mem::replace(&mut self.current, next))
    }

    fn skip_separators(&mut self) -> Result<(), ParseError> {
        while matches!(self.current.kind, TokenKind::Comma | TokenKind::Semicolon) {
            self.bump()?;
        }
        Ok(())
    }

    /// Parses `key = value` entries until the closing token: the matching
    /// `}` when `open_brace` holds the offset of a `{`, end of input
    /// otherwise.
    fn entries(&mut self, open_brace: Option<usize>) -> Result<IndexMap<String, Value>, ParseError> {
        let mut entries = IndexMap::default();

        loop {
            self.skip_separators()?;
            let token = self.bump()?;
            match token.kind {
                TokenKind::Eof => match open_brace {
                    None => break,
                    Some(index) => {
                        return Err(ParseError::Unterminated {
                            kind: "array",
                            index,
                        })
                    }
                },
                TokenKind::RBrace if open_brace.is_some() => break,
                TokenKind::String(key) => {
                    let eq = self.bump()?;
                    if eq.kind != TokenKind::Eq {
                        return Err(unexpected(eq, "`=`"));
                    }
                    let value = self.value()?;
                    entries.insert(key, value);
                }
                _ => return Err(unexpected(token, "an entry key")),
            }
        }

        Ok(entries)
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        let token = self.bump()?;
        match token.kind {
            TokenKind::String(string) => Ok(Value::String(string)),
            TokenKind::Int(integer) => Ok(Value::Int(integer)),
            TokenKind::Float(float) => Ok(Value::Float(float)),
            TokenKind::LParen => self.list(token.index),
            TokenKind::LBrace => Ok(Value::Array(self.entries(Some(token.index))?)),
            _ => Err(unexpected(token, "a value")),
        }
    }

    fn list(&mut self, open_paren: usize) -> Result<Value, ParseError> {
        let mut elements = Vec::new();

        loop {
            self.skip_separators()?;
            match self.current.kind {
                TokenKind::RParen => {
                    self.bump()?;
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParseError::Unterminated {
                        kind: "list",
                        index: open_paren,
                    })
                }
                _ => elements.push(self.value()?),
            }
        }

        Ok(Value::List(elements))
    }
}

fn unexpected(token: Token, expected: &'static str) -> ParseError {
    ParseError::UnexpectedToken {
        found: token.kind.describe(),
        expected,
        index: token.index,
    }
}
