use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};
use serde_json::{Number, Value};

use crate::{JsonPathError, JsonPathResult};

use super::constants::{DOUBLE_QUOTE, ESCAPE, MINUS, PERIOD, PLUS, SINGLE_QUOTE, UNDERSCORE};

/// Character stream over a jsonpath with arbitrary lookahead and a position counter.
pub struct TokenStream<'a> {
    chars: PeekMoreIterator<Chars<'a>>,
    position: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(jsonpath: &'a str) -> Self {
        TokenStream {
            chars: jsonpath.chars().peekmore(),
            position: 0,
        }
    }

    /// Number of characters consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn peek(&mut self) -> Option<char> {
        self.chars.peek_nth(0).copied()
    }

    pub fn peek_nth(&mut self, n: usize) -> Option<char> {
        self.chars.peek_nth(n).copied()
    }

    pub fn error<T>(&self, message: impl Into<String>) -> JsonPathResult<T> {
        Err(JsonPathError::InvalidJsonPath(message.into(), self.position))
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }
}

pub trait PeekableExt {
    fn drop_while<P>(&mut self, predicate: P)
    where
        P: FnMut(&char) -> bool;

    fn next_significant(&mut self) -> Option<char>;

    fn peek_significant(&mut self) -> Option<char>;

    /// Lookahead for `pattern` without consuming anything.
    fn peek_matches(&mut self, pattern: &str) -> bool;

    /// Consume `pattern` if the stream starts with it.
    fn next_if_matches(&mut self, pattern: &str) -> bool;

    fn expect(&mut self, expected: char) -> JsonPathResult<()>;

    fn read_identifier(&mut self) -> Option<String>;

    fn read_quoted_string(&mut self) -> JsonPathResult<String>;

    fn read_integer(&mut self) -> JsonPathResult<i64>;

    fn read_number(&mut self) -> JsonPathResult<Value>;
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == UNDERSCORE
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == UNDERSCORE || c == MINUS
}

impl<'a> PeekableExt for TokenStream<'a> {
    fn drop_while<P>(&mut self, mut predicate: P)
    where
        P: FnMut(&char) -> bool,
    {
        while let Some(c) = self.peek() {
            if predicate(&c) {
                self.next();
            } else {
                break;
            }
        }
    }

    fn next_significant(&mut self) -> Option<char> {
        self.drop_while(|c| c.is_whitespace());
        self.next()
    }

    fn peek_significant(&mut self) -> Option<char> {
        self.drop_while(|c| c.is_whitespace());
        self.peek()
    }

    fn peek_matches(&mut self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, expected)| self.peek_nth(i) == Some(expected))
    }

    fn next_if_matches(&mut self, pattern: &str) -> bool {
        if !self.peek_matches(pattern) {
            return false;
        }
        for _ in pattern.chars() {
            self.next();
        }
        true
    }

    fn expect(&mut self, expected: char) -> JsonPathResult<()> {
        match self.peek_significant() {
            Some(c) if c == expected => {
                self.next();
                Ok(())
            }
            Some(c) => self.error(format!("Expected '{}' but found '{}'", expected, c)),
            None => self.error(format!("Expected '{}' but reached the end", expected)),
        }
    }

    /// Member names may start with a digit (`$.0`); callers that need a
    /// keyword check the first char themselves.
    fn read_identifier(&mut self) -> Option<String> {
        match self.peek() {
            Some(c) if is_identifier_start(c) || c.is_ascii_digit() => {}
            _ => return None,
        }
        let mut w = String::new();
        while let Some(c) = self.peek() {
            if !is_identifier_char(c) {
                break;
            }
            w.push(c);
            self.next();
        }
        Some(w)
    }

    fn read_quoted_string(&mut self) -> JsonPathResult<String> {
        let quote = match self.next_significant() {
            Some(c) if c == SINGLE_QUOTE || c == DOUBLE_QUOTE => c,
            _ => return self.error("Expect quoted string."),
        };

        let mut s = String::new();
        loop {
            match self.next() {
                None => return self.error("Unterminated string literal."),
                Some(c) if c == quote => return Ok(s),
                Some(ESCAPE) => {
                    let escaped = match self.next() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('b') => '\u{08}',
                        Some('f') => '\u{0c}',
                        Some('u') => read_unicode_escape(self)?,
                        Some(c @ ('\\' | '/' | '\'' | '"')) => c,
                        Some(c) => return self.error(format!("Invalid escape sequence '\\{}'", c)),
                        None => return self.error("Unterminated string literal."),
                    };
                    s.push(escaped);
                }
                Some(c) => s.push(c),
            }
        }
    }

    fn read_integer(&mut self) -> JsonPathResult<i64> {
        let mut w = String::new();
        if self.peek() == Some(MINUS) {
            w.push(MINUS);
            self.next();
        }
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
            w.push(c);
            self.next();
        }
        if w.is_empty() || w == "-" {
            return self.error("Expect integer.");
        }
        // only overflow is left to fail; such an index selects nothing anyway
        match w.parse::<i64>() {
            Ok(i) => Ok(i),
            Err(_) if w.starts_with(MINUS) => Ok(i64::MIN),
            Err(_) => Ok(i64::MAX),
        }
    }

    fn read_number(&mut self) -> JsonPathResult<Value> {
        let mut w = String::new();
        let mut integral = true;
        if self.peek() == Some(MINUS) {
            w.push(MINUS);
            self.next();
        }
        let digits = read_digits(self, &mut w);
        if digits == 0 {
            return self.error("Expect number.");
        }
        if self.peek() == Some(PERIOD) && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            integral = false;
            w.push(PERIOD);
            self.next();
            read_digits(self, &mut w);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            integral = false;
            w.push('e');
            self.next();
            if let Some(sign) = self.peek().filter(|c| *c == MINUS || *c == PLUS) {
                w.push(sign);
                self.next();
            }
            if read_digits(self, &mut w) == 0 {
                return self.error("Expect exponent digits.");
            }
        }

        if integral {
            if let Ok(u) = w.parse::<u64>() {
                return Ok(Value::from(u));
            }
            if let Ok(i) = w.parse::<i64>() {
                return Ok(Value::from(i));
            }
        }
        match w.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => self.error(format!("Invalid number: {}", w)),
        }
    }
}

fn read_digits(stream: &mut TokenStream, w: &mut String) -> usize {
    let mut count = 0;
    while let Some(c) = stream.peek().filter(|c| c.is_ascii_digit()) {
        w.push(c);
        stream.next();
        count += 1;
    }
    count
}

fn read_hex4(stream: &mut TokenStream) -> JsonPathResult<u32> {
    let mut code = 0;
    for _ in 0..4 {
        match stream.next().and_then(|c| c.to_digit(16)) {
            Some(d) => code = code * 16 + d,
            None => return stream.error("Invalid unicode escape."),
        }
    }
    Ok(code)
}

fn read_unicode_escape(stream: &mut TokenStream) -> JsonPathResult<char> {
    let high = read_hex4(stream)?;
    let code = if (0xD800..0xDC00).contains(&high) {
        if !stream.next_if_matches("\\u") {
            return stream.error("Unpaired surrogate in unicode escape.");
        }
        let low = read_hex4(stream)?;
        if !(0xDC00..0xE000).contains(&low) {
            return stream.error("Invalid low surrogate in unicode escape.");
        }
        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
    } else {
        high
    };
    match char::from_u32(code) {
        Some(c) => Ok(c),
        None => stream.error("Invalid unicode escape."),
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::{PeekableExt, TokenStream};
    use crate::{JsonPathError, JsonPathResult};

    #[test]
    fn reads_quoted_strings_with_escapes() -> JsonPathResult<()> {
        let mut stream = TokenStream::new(r#" 'it\'s' "a\"bé" "#);
        assert_eq!("it's", stream.read_quoted_string()?);
        assert_eq!("a\"bé", stream.read_quoted_string()?);
        Ok(())
    }

    #[test]
    fn reads_unicode_escapes() -> JsonPathResult<()> {
        let mut stream = TokenStream::new(r"'caf\u00e9' '\ud83d\ude00!' '\n\t\/'");
        assert_eq!("café", stream.read_quoted_string()?);
        assert_eq!("\u{1F600}!", stream.read_quoted_string()?);
        assert_eq!("\n\t/", stream.read_quoted_string()?);
        Ok(())
    }

    #[test]
    fn rejects_broken_unicode_escapes() {
        for text in [r"'\ud83d'", r"'\ud83dx'", r"'\ud83d\u0041'", r"'\u12'", r"'\uzzzz'"] {
            let err = TokenStream::new(text).read_quoted_string().unwrap_err();
            assert!(err.is_syntax_error(), "{}", text);
        }
    }

    #[test]
    fn unterminated_string_reports_position() {
        let mut stream = TokenStream::new("'abc");
        assert_eq!(
            Err(JsonPathError::InvalidJsonPath(
                "Unterminated string literal.".to_string(),
                4
            )),
            stream.read_quoted_string()
        );
    }

    #[test]
    fn reads_numbers_without_losing_precision() -> JsonPathResult<()> {
        let mut stream = TokenStream::new("18446744005107584948");
        assert_eq!(json!(18446744005107584948u64), stream.read_number()?);
        let mut stream = TokenStream::new("-42");
        assert_eq!(json!(-42), stream.read_number()?);
        let mut stream = TokenStream::new("8.95)");
        assert_eq!(json!(8.95), stream.read_number()?);
        assert_eq!(Some(')'), stream.peek());
        let mut stream = TokenStream::new("1e3");
        assert_eq!(json!(1000.0), stream.read_number()?);
        Ok(())
    }

    #[test]
    fn lookahead_does_not_consume() {
        let mut stream = TokenStream::new("<=1");
        assert!(stream.peek_matches("<="));
        assert!(!stream.peek_matches("<>"));
        assert_eq!(0, stream.position());
        assert!(stream.next_if_matches("<="));
        assert_eq!(2, stream.position());
        assert_eq!(Some('1'), stream.peek());
    }
}
