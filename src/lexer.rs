use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals keep their source text; interpretation happens at evaluation time.
    Int(String),
    Float(String),
    String(String),
    Char(String),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    LParen,
    RParen,
    Comma,
    Greater,
    Less,
    Ge,
    Le,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Eof,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    input: &'a [u8],
    pos: usize,
    last_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            src: input,
            input: input.as_bytes(),
            pos: 0,
            last_start: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn number(&mut self, start: usize) -> Result<Token, Error> {
        // `start` points at the first digit or at a leading '.'
        self.pos = start;
        let int_digits = self.digits();
        let mut is_float = false;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            is_float = true;
            let frac_digits = self.digits();
            if int_digits == 0 && frac_digits == 0 {
                return Err(Error::syntax("Invalid number", start));
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                return Err(Error::syntax("Exponent has no digits", start));
            }
            is_float = true;
        }
        if matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'_')) {
            return Err(Error::syntax("Invalid character in number", self.pos));
        }
        let raw = self.src[start..self.pos].to_string();
        Ok(if is_float { Token::Float(raw) } else { Token::Int(raw) })
    }

    fn identifier(&mut self, start: usize) -> Token {
        while matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')) {
            self.pos += 1;
        }
        Token::Identifier(self.src[start..self.pos].to_string())
    }

    /// Scans a quoted literal whose opening quote sits at `start` and returns its raw text.
    fn quoted(&mut self, start: usize, quote: u8) -> Result<&'a str, Error> {
        let raw_string = quote == b'`';
        while let Some(c) = self.bump() {
            if c == quote {
                return Ok(&self.src[start..self.pos]);
            }
            match c {
                b'\\' if !raw_string => {
                    if self.bump().is_none() {
                        return Err(Error::syntax("Unterminated escape in literal", self.pos));
                    }
                }
                b'\n' if !raw_string => {
                    return Err(Error::syntax("Newline in literal", self.pos - 1));
                }
                _ => {}
            }
        }
        Err(Error::syntax("Unterminated literal", start))
    }

    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_ws();
        let start = self.pos;
        self.last_start = start;
        let ch = match self.bump() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let tok = match ch {
            b'0'..=b'9' => return self.number(start),
            b'.' if matches!(self.peek(), Some(b'0'..=b'9')) => return self.number(start),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(start),
            b'"' | b'`' => {
                let raw = self.quoted(start, ch)?;
                // Validate escapes up front so malformed strings fail at parse time.
                unquote(raw).map_err(|msg| Error::syntax(msg, start))?;
                Token::String(raw.to_string())
            }
            b'\'' => Token::Char(self.quoted(start, ch)?.to_string()),
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'%' => Token::Percent,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    Token::NotEq
                } else {
                    Token::Bang
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    Token::Ge
                } else {
                    Token::Greater
                }
            }
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    Token::Le
                } else {
                    Token::Less
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    Token::EqEq
                } else {
                    return Err(Error::syntax("Unexpected '=' (assignment is not an expression)", start));
                }
            }
            b'&' if self.peek() == Some(b'&') => {
                self.bump();
                Token::AndAnd
            }
            b'|' if self.peek() == Some(b'|') => {
                self.bump();
                Token::OrOr
            }
            _ => return Err(Error::syntax("Unexpected character", start)),
        };
        Ok(tok)
    }

    /// Byte offset where the most recently returned token starts.
    pub fn last_start(&self) -> usize {
        self.last_start
    }
}

/// Interprets the raw text of a string literal: double-quoted with escapes,
/// or back-quoted raw text with carriage returns dropped.
pub fn unquote(raw: &str) -> Result<String, String> {
    let bytes = raw.as_bytes();
    if bytes.len() < 2 || bytes[0] != bytes[bytes.len() - 1] {
        return Err("Malformed string literal".to_string());
    }
    let body = &raw[1..raw.len() - 1];
    match bytes[0] {
        b'`' => Ok(body.chars().filter(|&c| c != '\r').collect()),
        b'"' => unescape(body),
        _ => Err("Malformed string literal".to_string()),
    }
}

fn unescape(body: &str) -> Result<String, String> {
    let input = body.as_bytes();
    let mut buf: Vec<u8> = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let c = input[i];
        i += 1;
        if c == b'"' {
            return Err("Unescaped quote in string literal".to_string());
        }
        if c != b'\\' {
            buf.push(c);
            continue;
        }
        let esc = *input.get(i).ok_or("Unterminated escape in string literal")?;
        i += 1;
        match esc {
            b'a' => buf.push(0x07),
            b'b' => buf.push(0x08),
            b'f' => buf.push(0x0c),
            b'n' => buf.push(b'\n'),
            b'r' => buf.push(b'\r'),
            b't' => buf.push(b'\t'),
            b'v' => buf.push(0x0b),
            b'\\' => buf.push(b'\\'),
            b'"' => buf.push(b'"'),
            b'x' => {
                let v = hex_digits(input, i, 2)?;
                i += 2;
                buf.push(v as u8);
            }
            b'0'..=b'7' => {
                let digits = input.get(i - 1..i + 2).ok_or("Invalid octal escape")?;
                let mut v: u32 = 0;
                for &d in digits {
                    if !(b'0'..=b'7').contains(&d) {
                        return Err("Invalid octal escape".to_string());
                    }
                    v = v * 8 + (d - b'0') as u32;
                }
                if v > 255 {
                    return Err("Octal escape value out of range".to_string());
                }
                i += 2;
                buf.push(v as u8);
            }
            b'u' | b'U' => {
                let width = if esc == b'u' { 4 } else { 8 };
                let v = hex_digits(input, i, width)?;
                i += width;
                let ch = char::from_u32(v).ok_or("Invalid Unicode code point in escape")?;
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
            }
            _ => return Err("Unknown escape sequence".to_string()),
        }
    }
    String::from_utf8(buf).map_err(|_| "Invalid UTF-8 in string literal".to_string())
}

fn hex_digits(input: &[u8], at: usize, width: usize) -> Result<u32, String> {
    let digits = input
        .get(at..at + width)
        .ok_or_else(|| "Truncated hex escape".to_string())?;
    let mut v: u32 = 0;
    for &d in digits {
        let n = (d as char).to_digit(16).ok_or_else(|| "Invalid hex escape".to_string())?;
        v = v * 16 + n;
    }
    Ok(v)
}
