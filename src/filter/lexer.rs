use super::ast::Operator;
use super::error::LexError;
use std::iter::Peekable;
use std::str::CharIndices;

/// A lexeme of the filter language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw lexeme as written, delimiters included
    pub text: String,
    /// Byte offset of the lexeme in the filter text
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Field(String),
    Op(Operator),
    /// A `"quoted"` or bare-word string literal
    Str { value: String, quoted: bool },
    /// A `/body/` pattern literal, optionally followed by the `i` modifier
    Pattern { body: String, case_insensitive: bool },
    And,
    Or,
    LParen,
    RParen,
    Eof,
}

impl TokenKind {
    /// Human readable description used in parse errors
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Field(name) => format!("field '{name}'"),
            TokenKind::Op(op) => format!("operator '{op}'"),
            TokenKind::Str { value, .. } => format!("string \"{value}\""),
            TokenKind::Pattern { body, .. } => format!("pattern /{body}/"),
            TokenKind::And => "'and'".to_string(),
            TokenKind::Or => "'or'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// Split filter text into tokens, terminated by [`TokenKind::Eof`]
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(text).run()
}

fn is_field_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn ends_bare_word(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')'
}

fn is_keyword(word: &str) -> bool {
    word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("or")
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            chars: src.char_indices().peekable(),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(&(start, ch)) = self.chars.peek() {
            match ch {
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '(' => {
                    self.chars.next();
                    self.push(TokenKind::LParen, start, start + 1);
                }
                ')' => {
                    self.chars.next();
                    self.push(TokenKind::RParen, start, start + 1);
                }
                '=' | '!' | '^' | '$' => {
                    self.operator(start, ch)?;
                    self.value()?;
                }
                c if is_field_char(c) => self.word(start),
                _ => return Err(LexError::UnexpectedChar { ch, position: start }),
            }
        }

        let end = self.src.len();
        self.push(TokenKind::Eof, end, end);
        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            text: self.src[start..end].to_string(),
            position: start,
        });
    }

    /// Offset of the next unread character
    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(idx, _)| idx)
            .unwrap_or(self.src.len())
    }

    fn advance_to(&mut self, offset: usize) {
        while self.chars.next_if(|&(idx, _)| idx < offset).is_some() {}
    }

    fn word(&mut self, start: usize) {
        while self.chars.next_if(|&(_, c)| is_field_char(c)).is_some() {}
        let end = self.offset();
        let word = &self.src[start..end];

        let kind = if word.eq_ignore_ascii_case("and") {
            TokenKind::And
        } else if word.eq_ignore_ascii_case("or") {
            TokenKind::Or
        } else {
            TokenKind::Field(word.to_string())
        };
        self.push(kind, start, end);
    }

    fn operator(&mut self, start: usize, ch: char) -> Result<(), LexError> {
        let rest = &self.src[start..];
        let op = Operator::ALL
            .into_iter()
            .find(|op| rest.starts_with(op.symbol()))
            .ok_or(LexError::UnexpectedChar { ch, position: start })?;

        let end = start + op.symbol().len();
        self.advance_to(end);
        self.push(TokenKind::Op(op), start, end);
        Ok(())
    }

    /// Lex the value that follows an operator, if any
    ///
    /// A spaced-out `and`/`or` is lexed as the keyword, leaving the operand
    /// missing.
    fn value(&mut self) -> Result<(), LexError> {
        let mut spaced = false;
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {
            spaced = true;
        }
        let Some(&(start, ch)) = self.chars.peek() else {
            return Ok(());
        };

        match ch {
            '(' | ')' => Ok(()),
            '/' => self.pattern(start),
            '"' => self.quoted(start),
            _ if spaced && is_keyword(self.bare_word_at(start)) => {
                self.word(start);
                Ok(())
            }
            _ => {
                while self.chars.next_if(|&(_, c)| !ends_bare_word(c)).is_some() {}
                let end = self.offset();
                let value = self.src[start..end].to_string();
                self.push(
                    TokenKind::Str {
                        value,
                        quoted: false,
                    },
                    start,
                    end,
                );
                Ok(())
            }
        }
    }

    fn bare_word_at(&self, start: usize) -> &'a str {
        let rest = &self.src[start..];
        let len = rest.find(ends_bare_word).unwrap_or(rest.len());
        &rest[..len]
    }

    fn pattern(&mut self, start: usize) -> Result<(), LexError> {
        let body_start = start + 1;
        let body_end = self.src[body_start..]
            .find('/')
            .map(|idx| body_start + idx)
            .ok_or(LexError::UnterminatedPattern(start))?;
        if body_end == body_start {
            return Err(LexError::EmptyPattern(start));
        }

        let body = self.src[body_start..body_end].to_string();
        self.advance_to(body_end + 1);
        let case_insensitive = self.chars.next_if(|&(_, c)| c == 'i').is_some();
        let end = self.offset();

        self.push(
            TokenKind::Pattern {
                body,
                case_insensitive,
            },
            start,
            end,
        );
        Ok(())
    }

    fn quoted(&mut self, start: usize) -> Result<(), LexError> {
        let body_start = start + 1;
        let body_end = self.src[body_start..]
            .find('"')
            .map(|idx| body_start + idx)
            .ok_or(LexError::UnterminatedString(start))?;

        let value = self.src[body_start..body_end].to_string();
        self.advance_to(body_end + 1);
        self.push(
            TokenKind::Str {
                value,
                quoted: true,
            },
            start,
            body_end + 1,
        );
        Ok(())
    }
}
