mod constants;
mod predicate;
mod stream;
mod tokens;
use constants::*;
pub use stream::TokenStream;
use stream::{is_identifier_start, PeekableExt};
pub use tokens::*;

use crate::JsonPathResult;

pub struct Tokenizer {}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer {}
    }

    pub fn tokenize(&self, jsonpath: &str) -> JsonPathResult<Vec<Token>> {
        let mut stream = TokenStream::new(jsonpath);

        let root_path_char = match stream.peek_significant() {
            Some(c) if self.is_root_path_char(&c) => {
                stream.next();
                c
            }
            // a leading selector is implicitly anchored at the document
            Some(PERIOD) | Some(OPEN_SQUARE_BRACKET) => DOC_CONTEXT,
            Some(c) => {
                return stream.error(format!(
                    "Illegal character '{}', the jsonpath must start with '$' or '@'",
                    c
                ))
            }
            None => return stream.error("Empty jsonpath provided"),
        };

        let mut tokens = vec![Token::Root(RootPathToken { root_path_char })];
        self.read_path_tokens(&mut stream, &mut tokens)?;

        if let Some(c) = stream.peek_significant() {
            return stream.error(format!("Illegal character '{}', expected '.' or '['", c));
        }

        log::debug!("tokenized jsonpath {:?} into {} tokens", jsonpath, tokens.len());
        Ok(tokens)
    }

    /// Reads selectors for as long as the stream continues with `.` or `[`.
    fn read_path_tokens(
        &self,
        stream: &mut TokenStream,
        tokens: &mut Vec<Token>,
    ) -> JsonPathResult<()> {
        while let Some(c) = stream.peek_significant() {
            match c {
                OPEN_SQUARE_BRACKET => self.read_bracket_token(stream, tokens)?,
                PERIOD => self.read_dot_token(stream, tokens)?,
                _ => break,
            }
        }
        Ok(())
    }

    fn read_dot_token(&self, stream: &mut TokenStream, tokens: &mut Vec<Token>) -> JsonPathResult<()> {
        stream.next();
        let scan = stream.peek() == Some(PERIOD);
        if scan {
            stream.next();
            tokens.push(Token::Scan(ScanPathToken {}));
        }

        match stream.peek_significant() {
            Some(WILDCARD) => {
                stream.next();
                tokens.push(Token::Wildcard(WildcardPathToken {}));
                Ok(())
            }
            // `..[0]`, `.['name']`: the bracket is read as the next token
            Some(OPEN_SQUARE_BRACKET) => Ok(()),
            Some(PERIOD) => stream.error("Unexpected '.' in the jsonpath."),
            Some(c) if is_identifier_start(c) || c.is_ascii_digit() => {
                let name = stream.read_identifier().unwrap_or_default();
                tokens.push(Token::Property(PropertyPathToken { name }));
                Ok(())
            }
            // a bare `..` selects every descendant
            _ if scan => Ok(()),
            None => stream.error("The jsonpath must not end with a '.'"),
            Some(c) => stream.error(format!("Illegal character '{}' after '.'", c)),
        }
    }

    fn read_bracket_token(
        &self,
        stream: &mut TokenStream,
        tokens: &mut Vec<Token>,
    ) -> JsonPathResult<()> {
        stream.next();
        match stream.peek_significant() {
            Some(WILDCARD) => {
                stream.next();
                stream.expect(CLOSE_SQUARE_BRACKET)?;
                tokens.push(Token::Wildcard(WildcardPathToken {}));
            }
            Some(BEGIN_FILTER) => {
                stream.next();
                let expression = self.read_predicate(stream)?;
                stream.expect(CLOSE_SQUARE_BRACKET)?;
                tokens.push(Token::Predicate(PredicatePathToken { expression }));
            }
            Some(CLOSE_SQUARE_BRACKET) => return stream.error("Empty brackets '[]'"),
            None => return stream.error("Unclosed '['"),
            Some(_) => {
                let mut selectors = self.read_union(stream)?;
                let token = if selectors.len() == 1 {
                    selectors.remove(0).into_token()
                } else {
                    Token::ArrayPath(ArrayPathPathToken { selectors })
                };
                tokens.push(token);
            }
        }
        Ok(())
    }

    /// Reads comma separated keys, indices and slices up to the closing bracket.
    fn read_union(&self, stream: &mut TokenStream) -> JsonPathResult<Vec<Selector>> {
        let mut selectors = vec![];
        loop {
            let selector = match stream.peek_significant() {
                Some(SINGLE_QUOTE) | Some(DOUBLE_QUOTE) => {
                    let name = stream.read_quoted_string()?;
                    Selector::Property(PropertyPathToken { name })
                }
                Some(c) if c == MINUS || c == SPLIT || c.is_ascii_digit() => {
                    self.read_index_or_slice(stream)?
                }
                Some(c) => return stream.error(format!("Illegal character '{}' in brackets", c)),
                None => return stream.error("Unclosed '['"),
            };
            selectors.push(selector);

            match stream.next_significant() {
                Some(COMMA) => continue,
                Some(CLOSE_SQUARE_BRACKET) => return Ok(selectors),
                Some(c) => return stream.error(format!("Expected ',' or ']' but found '{}'", c)),
                None => return stream.error("Unclosed '['"),
            }
        }
    }

    fn read_index_or_slice(&self, stream: &mut TokenStream) -> JsonPathResult<Selector> {
        let start = self.read_optional_integer(stream)?;
        if stream.peek_significant() != Some(SPLIT) {
            return match start {
                Some(index) => Ok(Selector::Index(ArrayIndexPathToken { index })),
                None => stream.error("Expect index."),
            };
        }
        stream.next();
        let end = self.read_optional_integer(stream)?;
        let step = if stream.peek_significant() == Some(SPLIT) {
            stream.next();
            self.read_optional_integer(stream)?
        } else {
            None
        };
        Ok(Selector::Slice(ArraySlicePathToken { start, end, step }))
    }

    fn read_optional_integer(&self, stream: &mut TokenStream) -> JsonPathResult<Option<i64>> {
        match stream.peek_significant() {
            Some(c) if c == MINUS || c.is_ascii_digit() => Ok(Some(stream.read_integer()?)),
            _ => Ok(None),
        }
    }

    fn is_root_path_char(&self, c: &char) -> bool {
        *c == DOC_CONTEXT || *c == EVAL_CONTEXT
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{JsonPathError, JsonPathResult};

    fn property(name: &str) -> Token {
        Token::Property(PropertyPathToken {
            name: name.to_string(),
        })
    }

    fn root() -> Token {
        Token::Root(RootPathToken { root_path_char: '$' })
    }

    #[test]
    fn dot_and_bracket_properties_are_the_same() -> JsonPathResult<()> {
        let tz = Tokenizer::new();
        let expected = vec![root(), property("store"), property("bicycle")];
        assert_eq!(expected, tz.tokenize("$.store.bicycle")?);
        assert_eq!(expected, tz.tokenize("$['store'][\"bicycle\"]")?);
        assert_eq!(expected, tz.tokenize("$.['store'].bicycle")?);
        assert_eq!(expected, tz.tokenize(" $ .store [ 'bicycle' ] ")?);
        Ok(())
    }

    #[test]
    fn leading_selector_is_implicitly_anchored() -> JsonPathResult<()> {
        let tz = Tokenizer::new();
        assert_eq!(vec![root(), property("a")], tz.tokenize(".a")?);
        assert_eq!(vec![root(), property("a")], tz.tokenize("['a']")?);
        Ok(())
    }

    #[test]
    fn can_tokenize_scan_and_wildcards() -> JsonPathResult<()> {
        let tz = Tokenizer::new();
        let scan = Token::Scan(ScanPathToken {});
        let wildcard = Token::Wildcard(WildcardPathToken {});
        assert_eq!(vec![root(), scan.clone(), wildcard.clone()], tz.tokenize("$..*")?);
        assert_eq!(vec![root(), scan.clone()], tz.tokenize("$..")?);
        assert_eq!(
            vec![root(), scan.clone(), property("book"), wildcard.clone()],
            tz.tokenize("$..book[*]")?
        );
        assert_eq!(
            vec![root(), scan, Token::ArrayIndex(ArrayIndexPathToken { index: 0 })],
            tz.tokenize("$..[0]")?
        );
        Ok(())
    }

    #[test]
    fn can_tokenize_indices_slices_and_unions() -> JsonPathResult<()> {
        let tz = Tokenizer::new();
        assert_eq!(
            vec![root(), Token::ArrayIndex(ArrayIndexPathToken { index: -2 })],
            tz.tokenize("$[-2]")?
        );
        assert_eq!(
            vec![
                root(),
                Token::ArraySlice(ArraySlicePathToken {
                    start: None,
                    end: Some(2),
                    step: None
                })
            ],
            tz.tokenize("$[:2]")?
        );
        assert_eq!(
            vec![
                root(),
                Token::ArraySlice(ArraySlicePathToken {
                    start: Some(-2),
                    end: None,
                    step: Some(-1)
                })
            ],
            tz.tokenize("$[-2::-1]")?
        );
        assert_eq!(
            vec![
                root(),
                Token::ArrayPath(ArrayPathPathToken {
                    selectors: vec![
                        Selector::Index(ArrayIndexPathToken { index: 0 }),
                        Selector::Property(PropertyPathToken {
                            name: "a".to_string()
                        }),
                        Selector::Slice(ArraySlicePathToken {
                            start: Some(1),
                            end: Some(3),
                            step: None
                        }),
                    ]
                })
            ],
            tz.tokenize("$[0, 'a', 1:3]")?
        );
        Ok(())
    }

    #[test]
    fn whitespace_after_dot_and_numeric_names() -> JsonPathResult<()> {
        let tz = Tokenizer::new();
        assert_eq!(tz.tokenize("$.a")?, tz.tokenize("$. a")?);
        assert_eq!(tz.tokenize("$..*")?, tz.tokenize("$.. *")?);
        assert_eq!(tz.tokenize("$['0']")?, tz.tokenize("$.0")?);
        assert_eq!(tz.tokenize("$['2nd']")?, tz.tokenize("$.2nd")?);
        Ok(())
    }

    #[test]
    fn oversized_indices_saturate() -> JsonPathResult<()> {
        let tz = Tokenizer::new();
        assert_eq!(
            Token::ArrayIndex(ArrayIndexPathToken { index: i64::MAX }),
            tz.tokenize("$[99999999999999999999]")?[1]
        );
        assert_eq!(
            Token::ArraySlice(ArraySlicePathToken {
                start: Some(i64::MIN),
                end: None,
                step: None
            }),
            tz.tokenize("$[-99999999999999999999:]")?[1]
        );
        Ok(())
    }

    #[test]
    fn rejects_malformed_jsonpaths() {
        let tz = Tokenizer::new();
        for jsonpath in [
            "fail", "", "$.", "$...a", "$[]", "$[", "$['a'", "$[1,]", "$.a b", "$[?(@.a]",
            "$[a]", "$.a!",
        ] {
            match tz.tokenize(jsonpath) {
                Err(e) => assert!(e.is_syntax_error(), "{}: {:?}", jsonpath, e),
                Ok(tokens) => panic!("{} should not parse: {:?}", jsonpath, tokens),
            }
        }
    }

    #[test]
    fn syntax_errors_carry_the_position() {
        let tz = Tokenizer::new();
        assert_eq!(
            Err(JsonPathError::InvalidJsonPath(
                "Illegal character 'f', the jsonpath must start with '$' or '@'".to_string(),
                0
            )),
            tz.tokenize("fail")
        );
        assert_eq!(Some(4), tz.tokenize("$.a b").unwrap_err().position());
    }
}
