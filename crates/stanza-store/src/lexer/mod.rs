mod cursor;

use crate::error::ParseError;

use cursor::Cursor;

/// The longest string content the lexer accepts, in bytes.
pub const MAX_STRING_LENGTH: usize = 65_536;

/// One lexical token of store text.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) index: usize,
}

impl Token {
    /// The token's kind, including its payload for strings and numbers.
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Byte offset of the token's first character in the input.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Kinds of tokens produced by the [`Lexer`].
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// An identifier or quoted string, unescaped.
    String(String),
    /// An integer literal.
    Int(i32),
    /// A floating point literal.
    Float(f64),
    /// `=`
    Eq,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Short human-readable description, as used in parse errors.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::String(_) => "a string",
            TokenKind::Int(_) => "an integer",
            TokenKind::Float(_) => "a float",
            TokenKind::Eq => "`=`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Eof => "end of input",
        }
    }
}

/// Splits store text into [`Token`]s.
///
/// The lexer is lazy: tokens are produced on demand through the
/// [`Iterator`] implementation. The sequence is finite, ending with a
/// single [`TokenKind::Eof`] token or early with the first error, and
/// lexing the same input twice yields the same sequence.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
            done: false,
        }
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        loop {
            let index = self.cursor.offset();
            let Some(c) = self.cursor.bump() else {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    index,
                });
            };

            let kind = match c {
                c if is_whitespace(c) => continue,
                '=' => TokenKind::Eq,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '"' => self.quoted_string(index)?,
                '/' => {
                    if self.cursor.bump() == Some('/') {
                        self.skip_comment();
                        continue;
                    }
                    return Err(ParseError::UnexpectedCharacter { found: '/', index });
                }
                c if is_word_char(c) => self.word(c, index)?,
                c => return Err(ParseError::UnexpectedCharacter { found: c, index }),
            };

            return Ok(Token { kind, index });
        }
    }

    fn quoted_string(&mut self, index: usize) -> Result<TokenKind, ParseError> {
        let mut buf = String::new();

        loop {
            let Some(c) = self.cursor.bump() else {
                return Err(ParseError::Unterminated {
                    kind: "string",
                    index,
                });
            };

            match c {
                '"' => break,
                '\\' => match self.cursor.bump() {
                    Some(escaped @ ('\\' | '"')) => buf.push(escaped),
                    // Any other backslash passes through, together with
                    // the character that follows it.
                    Some(other) => {
                        buf.push('\\');
                        buf.push(other);
                    }
                    None => {
                        return Err(ParseError::Unterminated {
                            kind: "string",
                            index,
                        })
                    }
                },
                c => buf.push(c),
            }

            if buf.len() > MAX_STRING_LENGTH {
                return Err(ParseError::Overflow { index });
            }
        }

        Ok(TokenKind::String(buf))
    }

    fn word(&mut self, first: char, index: usize) -> Result<TokenKind, ParseError> {
        let mut buf = String::new();
        buf.push(first);

        while let Some(c) = self.cursor.bump() {
            if is_word_char(c) {
                buf.push(c);
            } else {
                self.cursor.push_back(c);
                break;
            }
        }

        classify_word(buf, index)
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.cursor.bump() {
            if c == '\n' {
                break;
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.advance();
        if matches!(&token, Err(_) | Ok(Token { kind: TokenKind::Eof, .. })) {
            self.done = true;
        }

        Some(token)
    }
}

/// Decides whether an identifier-style run is an integer, a float, or a
/// plain string. Runs such as `1337somevalue` or `13.` fall through to
/// strings.
fn classify_word(word: String, index: usize) -> Result<TokenKind, ParseError> {
    if word == "-" {
        return Err(ParseError::UnexpectedCharacter { found: '-', index });
    }

    let digits = word.strip_prefix('-').unwrap_or(&word);

    if all_digits(digits) {
        return match word.parse::<i32>() {
            Ok(integer) => Ok(TokenKind::Int(integer)),
            Err(_) => Err(ParseError::Overflow { index }),
        };
    }

    if let Some((int_part, frac_part)) = digits.split_once('.') {
        if all_digits(int_part) && all_digits(frac_part) {
            if let Ok(float) = word.parse::<f64>() {
                return Ok(TokenKind::Float(float));
            }
        }
    }

    Ok(TokenKind::String(word))
}

fn all_digits(digits: &str) -> bool {
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_word_char(c: char) -> bool {
    !is_whitespace(c) && !matches!(c, '=' | ',' | ';' | '(' | ')' | '{' | '}' | '"' | '\\' | '/')
}
