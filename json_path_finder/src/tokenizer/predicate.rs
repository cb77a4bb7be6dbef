use serde_json::Value;

use crate::JsonPathResult;

use super::constants::*;
use super::stream::{is_identifier_char, is_identifier_start, PeekableExt, TokenStream};
use super::tokens::*;
use super::Tokenizer;

// Filter expressions, lowest precedence first: `||`, `&&`, `!`/parentheses,
// then comparisons, existence tests and function calls.
impl Tokenizer {
    pub(super) fn read_predicate(&self, stream: &mut TokenStream) -> JsonPathResult<Predicate> {
        self.read_or(stream)
    }

    fn read_or(&self, stream: &mut TokenStream) -> JsonPathResult<Predicate> {
        let mut left = self.read_and(stream)?;
        while next_significant_if_matches(stream, OR) {
            let right = self.read_and(stream)?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn read_and(&self, stream: &mut TokenStream) -> JsonPathResult<Predicate> {
        let mut left = self.read_unary(stream)?;
        while next_significant_if_matches(stream, AND) {
            let right = self.read_unary(stream)?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn read_unary(&self, stream: &mut TokenStream) -> JsonPathResult<Predicate> {
        match stream.peek_significant() {
            Some(NOT) => {
                stream.next();
                let inner = self.read_unary(stream)?;
                Ok(Predicate::Not(Box::new(inner)))
            }
            Some(OPEN_PARENTHESIS) => {
                stream.next();
                let inner = self.read_or(stream)?;
                stream.expect(CLOSE_PARENTHESIS)?;
                Ok(inner)
            }
            _ => self.read_comparison(stream),
        }
    }

    fn read_comparison(&self, stream: &mut TokenStream) -> JsonPathResult<Predicate> {
        if self.is_function_call(stream) {
            return self.read_function_call(stream);
        }

        let left = self.read_operand(stream)?;
        match self.read_operator(stream) {
            Some(operator) => {
                let right = self.read_operand(stream)?;
                Ok(Predicate::Compare {
                    left,
                    operator,
                    right,
                })
            }
            None => match left {
                Operand::Path(tokens) => Ok(Predicate::Exists(tokens)),
                Operand::Literal(v) => {
                    stream.error(format!("Expected a comparison operator after {}", v))
                }
            },
        }
    }

    /// Lookahead for `name(`, leaving the stream untouched.
    fn is_function_call(&self, stream: &mut TokenStream) -> bool {
        match stream.peek_significant() {
            Some(c) if is_identifier_start(c) => {}
            _ => return false,
        }
        let mut n = 0;
        while stream.peek_nth(n).is_some_and(is_identifier_char) {
            n += 1;
        }
        while stream.peek_nth(n).is_some_and(|c| c.is_whitespace()) {
            n += 1;
        }
        stream.peek_nth(n) == Some(OPEN_PARENTHESIS)
    }

    fn read_function_call(&self, stream: &mut TokenStream) -> JsonPathResult<Predicate> {
        let name = stream.read_identifier().unwrap_or_default();
        let function = match FilterFunction::from_name(&name) {
            Some(f) => f,
            None => return stream.error(format!("Unknown function '{}'", name)),
        };
        stream.expect(OPEN_PARENTHESIS)?;

        let mut args = vec![];
        if stream.peek_significant() == Some(CLOSE_PARENTHESIS) {
            stream.next();
        } else {
            loop {
                args.push(self.read_operand(stream)?);
                match stream.next_significant() {
                    Some(COMMA) => continue,
                    Some(CLOSE_PARENTHESIS) => break,
                    Some(c) => {
                        return stream.error(format!("Expected ',' or ')' but found '{}'", c))
                    }
                    None => return stream.error("Unclosed function call"),
                }
            }
        }

        if args.len() != function.arity() {
            return stream.error(format!(
                "Function '{}' takes {} arguments but {} were given",
                function.name(),
                function.arity(),
                args.len()
            ));
        }
        Ok(Predicate::Function { function, args })
    }

    fn read_operand(&self, stream: &mut TokenStream) -> JsonPathResult<Operand> {
        match stream.peek_significant() {
            Some(c) if c == DOC_CONTEXT || c == EVAL_CONTEXT => {
                stream.next();
                let mut tokens = vec![Token::Root(RootPathToken { root_path_char: c })];
                self.read_path_tokens(stream, &mut tokens)?;
                Ok(Operand::Path(tokens))
            }
            Some(SINGLE_QUOTE) | Some(DOUBLE_QUOTE) => {
                Ok(Operand::Literal(Value::String(stream.read_quoted_string()?)))
            }
            Some(c) if c == MINUS || c.is_ascii_digit() => Ok(Operand::Literal(stream.read_number()?)),
            Some(c) if is_identifier_start(c) => {
                let word = stream.read_identifier().unwrap_or_default();
                match word.as_str() {
                    "true" => Ok(Operand::Literal(Value::Bool(true))),
                    "false" => Ok(Operand::Literal(Value::Bool(false))),
                    "null" => Ok(Operand::Literal(Value::Null)),
                    _ => stream.error(format!("Unexpected identifier '{}' in filter", word)),
                }
            }
            Some(c) => stream.error(format!("Unexpected character '{}' in filter", c)),
            None => stream.error("Unexpected end of filter"),
        }
    }

    fn read_operator(&self, stream: &mut TokenStream) -> Option<ComparisonOperator> {
        stream.peek_significant()?;
        ComparisonOperator::ALL
            .iter()
            .find(|(symbol, _)| stream.next_if_matches(symbol))
            .map(|(_, operator)| *operator)
    }
}

fn next_significant_if_matches(stream: &mut TokenStream, pattern: &str) -> bool {
    stream.peek_significant();
    stream.next_if_matches(pattern)
}
