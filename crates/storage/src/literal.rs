//! Reader for the JavaScript data literals search shards are written in.
//!
//! Only the subset a generator emits is understood: top-level `var`/`let`/
//! `const` bindings whose values are strings, integers, arrays and objects.
//! Comments, either quote style and trailing commas are accepted.

use crate::error::{Result, StorageError};

/// Deepest array/object nesting accepted. A shard needs four levels.
const MAX_DEPTH: usize = 64;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Array(Vec<Value>),
    /// Properties in source order
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Short name of the variant, for shape errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match *self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// One top-level `name = value` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

/// Parse every top-level binding in `source`.
pub fn parse_program(source: &str) -> Result<Vec<Binding>> {
    let mut parser = Parser::new(source);
    let mut bindings = Vec::new();
    loop {
        parser.skip_trivia()?;
        if parser.peek_char().is_none() {
            return Ok(bindings);
        }
        bindings.push(parser.parse_binding()?);
    }
}

/// Parse a single standalone value (no binding).
pub fn parse_value(source: &str) -> Result<Value> {
    let mut parser = Parser::new(source);
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.peek_char().is_some() {
        return Err(parser.error("trailing characters after value"));
    }
    Ok(value)
}

struct Parser<'a> {
    source: &'a str,
    cursor: usize,
    line: usize,
    column: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self { source, cursor: 0, line: 1, column: 1, depth: 0 }
    }

    fn error(&self, message: impl Into<String>) -> StorageError {
        StorageError::Syntax { line: self.line, column: self.column, message: message.into() }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut chars = self.source[self.cursor..].chars();
        chars.next();
        chars.next()
    }

    fn bump_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.cursor += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        self.skip_trivia()?;
        match self.peek_char() {
            Some(ch) if ch == expected => {
                self.bump_char();
                Ok(())
            },
            Some(ch) => Err(self.error(format!("expected `{expected}`, found `{ch}`"))),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    /// Consume whitespace and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump_char();
                },
                Some('/') if self.peek_next_char() == Some('/') => {
                    while let Some(ch) = self.bump_char() {
                        if ch == '\n' {
                            break;
                        }
                    }
                },
                Some('/') if self.peek_next_char() == Some('*') => {
                    self.bump_char();
                    self.bump_char();
                    self.skip_block_comment()?;
                },
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        while let Some(ch) = self.bump_char() {
            if ch == '*' && self.peek_char() == Some('/') {
                self.bump_char();
                return Ok(());
            }
        }
        Err(self.error("unterminated block comment"))
    }

    fn parse_binding(&mut self) -> Result<Binding> {
        let mut name = self.parse_identifier()?;
        if matches!(name.as_str(), "var" | "let" | "const") {
            self.skip_trivia()?;
            name = self.parse_identifier()?;
        }
        self.expect_char('=')?;
        let value = self.parse_value()?;
        self.skip_trivia()?;
        if self.peek_char() == Some(';') {
            self.bump_char();
        }
        Ok(Binding { name, value })
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(ch) = self.peek_char() {
            let valid = if ident.is_empty() { is_ident_start(ch) } else { is_ident_continue(ch) };
            if !valid {
                break;
            }
            ident.push(ch);
            self.bump_char();
        }
        if ident.is_empty() {
            return Err(match self.peek_char() {
                Some(ch) => self.error(format!("expected identifier, found `{ch}`")),
                None => self.error("expected identifier, found end of input"),
            });
        }
        Ok(ident)
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_trivia()?;
        match self.peek_char() {
            Some(open @ ('[' | '{')) => {
                if self.depth >= MAX_DEPTH {
                    return Err(self.error("nesting too deep"));
                }
                self.depth += 1;
                let value = if open == '[' { self.parse_array() } else { self.parse_object() };
                self.depth -= 1;
                value
            },
            Some(quote @ ('\'' | '"')) => Ok(Value::Str(self.parse_string(quote)?)),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_int(),
            Some(ch) => Err(self.error(format!("unexpected character `{ch}`"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.expect_char('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek_char() == Some(']') {
                self.bump_char();
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek_char() {
                Some(',') => {
                    self.bump_char();
                },
                Some(']') => {},
                Some(ch) => return Err(self.error(format!("expected `,` or `]`, found `{ch}`"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.expect_char('{')?;
        let mut props = Vec::new();
        loop {
            self.skip_trivia()?;
            let key = match self.peek_char() {
                Some('}') => {
                    self.bump_char();
                    return Ok(Value::Object(props));
                },
                Some(quote @ ('\'' | '"')) => self.parse_string(quote)?,
                Some(ch) if ch.is_ascii_digit() => self.parse_digits(),
                Some(_) => self.parse_identifier()?,
                None => return Err(self.error("unterminated object")),
            };
            self.expect_char(':')?;
            let value = self.parse_value()?;
            props.push((key, value));
            self.skip_trivia()?;
            match self.peek_char() {
                Some(',') => {
                    self.bump_char();
                },
                Some('}') => {},
                Some(ch) => return Err(self.error(format!("expected `,` or `}}`, found `{ch}`"))),
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    fn parse_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.peek_char() {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            self.bump_char();
        }
        digits
    }

    fn parse_int(&mut self) -> Result<Value> {
        let negative = self.peek_char() == Some('-');
        if negative {
            self.bump_char();
        }
        let digits = self.parse_digits();
        if digits.is_empty() {
            return Err(self.error("expected digits"));
        }
        if matches!(self.peek_char(), Some(ch) if ch == '.' || ch.is_ascii_alphabetic()) {
            return Err(self.error("only integer literals are supported"));
        }
        let literal = if negative { format!("-{digits}") } else { digits };
        literal
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| self.error(format!("integer literal out of range: {literal}")))
    }

    fn parse_string(&mut self, quote: char) -> Result<String> {
        self.bump_char(); // opening quote
        let mut value = String::new();
        loop {
            match self.bump_char() {
                Some(ch) if ch == quote => return Ok(value),
                Some('\\') => self.parse_escape(&mut value)?,
                Some('\n') | None => return Err(self.error("unterminated string literal")),
                Some(other) => value.push(other),
            }
        }
    }

    fn parse_escape(&mut self, value: &mut String) -> Result<()> {
        match self.bump_char() {
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some('t') => value.push('\t'),
            Some('0') => value.push('\0'),
            Some('x') => {
                let ch = self.parse_hex_char(2)?;
                value.push(ch);
            },
            Some('u') => {
                let ch = self.parse_unicode_escape()?;
                value.push(ch);
            },
            // Line continuation.
            Some('\n') => {},
            Some(other) => value.push(other),
            None => return Err(self.error("unterminated escape sequence")),
        }
        Ok(())
    }

    fn parse_hex_char(&mut self, len: usize) -> Result<char> {
        let code = self.parse_hex_code(len)?;
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid code point {code:#x}")))
    }

    fn parse_hex_code(&mut self, len: usize) -> Result<u32> {
        let mut code = 0_u32;
        for _ in 0..len {
            let digit = self
                .bump_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid hex escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// `\uXXXX`, joining a UTF-16 surrogate pair written as two escapes.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let high = self.parse_hex_code(4)?;
        if !(0xd800..0xdc00).contains(&high) {
            return char::from_u32(high)
                .ok_or_else(|| self.error(format!("invalid code point {high:#x}")));
        }
        if self.peek_char() != Some('\\') || self.peek_next_char() != Some('u') {
            return Err(self.error(format!("unpaired surrogate {high:#x}")));
        }
        self.bump_char();
        self.bump_char();
        let low = self.parse_hex_code(4)?;
        if !(0xdc00..0xe000).contains(&low) {
            return Err(self.error(format!("unpaired surrogate {high:#x}")));
        }
        let code = 0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00);
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid code point {code:#x}")))
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}
