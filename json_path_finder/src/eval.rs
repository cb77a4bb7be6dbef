mod compare;
mod filter;
mod path;
mod result_acceptor;
pub use path::CanonicalPath;
pub use result_acceptor::*;

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::{
    tokenizer::{
        ArrayIndexPathToken, ArrayPathPathToken, ArraySlicePathToken, PredicatePathToken,
        PropertyPathToken, RootPathToken, Selector, Token,
    },
    JsonPathError, JsonPathResult,
};

/// A node of the working set together with the path it was reached by.
type Node<'a> = (&'a Value, CanonicalPath);

/// Walks one document. Every token maps the working set of nodes to a new one;
/// whatever survives the last token is handed to the result acceptor.
pub struct Eval<'a> {
    root: &'a Value,
    /// Compiled filter patterns, keyed by the final pattern text.
    regex_cache: HashMap<String, Regex>,
}

impl<'a> Eval<'a> {
    pub fn new(root: &'a Value) -> Self {
        Eval {
            root,
            regex_cache: HashMap::new(),
        }
    }

    pub fn eval(
        &mut self,
        tokens: &[Token],
        acceptor: &mut impl ResultAcceptor<'a>,
    ) -> JsonPathResult<()> {
        self.eval_from(tokens, self.root, acceptor)
    }

    /// Same as [`Eval::eval`], with `@` bound to `current` instead of the document.
    fn eval_from(
        &mut self,
        tokens: &[Token],
        current: &'a Value,
        acceptor: &mut impl ResultAcceptor<'a>,
    ) -> JsonPathResult<()> {
        let mut tokens = tokens.iter();

        let mut working_set = match tokens.next() {
            Some(Token::Root(root)) => vec![self.visit_root(root, current)],
            None => {
                return Err(JsonPathError::EvaluationError(
                    "Empty jsonpath provided".to_string(),
                ))
            }
            Some(_) => {
                return Err(JsonPathError::EvaluationError(
                    "Invalid start token for the given jsonpath".to_string(),
                ))
            }
        };

        let mut previous: Option<&Token> = None;
        for token in tokens {
            if working_set.is_empty() {
                break;
            }
            working_set = match (previous, token) {
                (Some(Token::Scan(_)), Token::Predicate(predicate)) => {
                    self.visit_descendant_predicate(predicate, working_set)?
                }
                _ => self.visit_token(token, working_set)?,
            };
            log::trace!("{:?} selected {} nodes", token, working_set.len());
            previous = Some(token);
        }

        for (value, path) in working_set {
            acceptor.accept(value, path)?;
        }
        Ok(())
    }

    fn visit_root(&self, token: &RootPathToken, current: &'a Value) -> Node<'a> {
        if token.is_document_root() {
            (self.root, CanonicalPath::root())
        } else {
            (current, CanonicalPath::root())
        }
    }

    fn visit_token(&mut self, token: &Token, nodes: Vec<Node<'a>>) -> JsonPathResult<Vec<Node<'a>>> {
        match token {
            Token::Scan(_) => Ok(self.visit_scan(nodes)),
            Token::Root(_) => Err(JsonPathError::EvaluationError(
                "Root token in the middle of a jsonpath".to_string(),
            )),
            _ => {
                let mut selected = vec![];
                for node in nodes {
                    self.visit_selector(token, node, &mut selected)?;
                }
                Ok(selected)
            }
        }
    }

    fn visit_selector(
        &mut self,
        token: &Token,
        node: Node<'a>,
        out: &mut Vec<Node<'a>>,
    ) -> JsonPathResult<()> {
        match token {
            Token::Property(property) => self.visit_property(property, node, out),
            Token::ArrayIndex(index) => self.visit_index(index, node, out),
            Token::ArraySlice(slice) => self.visit_slice(slice, node, out),
            Token::ArrayPath(union) => self.visit_union(union, node, out),
            Token::Wildcard(_) => out.extend(children(&node)),
            Token::Predicate(predicate) => return self.visit_predicate(predicate, node, out),
            // both work on the whole working set, see visit_token
            Token::Scan(_) | Token::Root(_) => {}
        }
        Ok(())
    }

    fn visit_property(&self, token: &PropertyPathToken, node: Node<'a>, out: &mut Vec<Node<'a>>) {
        let (value, path) = node;
        if let Some(child) = value.as_object().and_then(|o| o.get(&token.name)) {
            out.push((child, path.key(&token.name)));
        }
    }

    fn visit_index(&self, token: &ArrayIndexPathToken, node: Node<'a>, out: &mut Vec<Node<'a>>) {
        let (value, path) = node;
        let Some(array) = value.as_array() else {
            return;
        };
        let len = array.len() as i64;
        let index = if token.index < 0 {
            len + token.index
        } else {
            token.index
        };
        if (0..len).contains(&index) {
            let index = index as usize;
            out.push((&array[index], path.index(index)));
        }
    }

    fn visit_slice(&self, token: &ArraySlicePathToken, node: Node<'a>, out: &mut Vec<Node<'a>>) {
        let (value, path) = node;
        if let Some(array) = value.as_array() {
            for index in slice_indices(token, array.len()) {
                out.push((&array[index], path.index(index)));
            }
        }
    }

    fn visit_union(&self, token: &ArrayPathPathToken, node: Node<'a>, out: &mut Vec<Node<'a>>) {
        for selector in &token.selectors {
            let node = (node.0, node.1.clone());
            match selector {
                Selector::Property(property) => self.visit_property(property, node, out),
                Selector::Index(index) => self.visit_index(index, node, out),
                Selector::Slice(slice) => self.visit_slice(slice, node, out),
            }
        }
    }

    /// Arrays keep the elements that satisfy the predicate; any other node is
    /// kept as a whole when it satisfies the predicate itself.
    fn visit_predicate(
        &mut self,
        token: &PredicatePathToken,
        node: Node<'a>,
        out: &mut Vec<Node<'a>>,
    ) -> JsonPathResult<()> {
        match node.0 {
            Value::Array(array) => {
                for (i, element) in array.iter().enumerate() {
                    if self.test_predicate(&token.expression, element)? {
                        out.push((element, node.1.index(i)));
                    }
                }
            }
            value => {
                if self.test_predicate(&token.expression, value)? {
                    out.push(node);
                }
            }
        }
        Ok(())
    }

    /// A filter right after `..` tests every scanned node as a child of its
    /// parent only, so no node is selected twice.
    fn visit_descendant_predicate(
        &mut self,
        token: &PredicatePathToken,
        nodes: Vec<Node<'a>>,
    ) -> JsonPathResult<Vec<Node<'a>>> {
        let mut selected = vec![];
        for node in nodes {
            for (child, path) in children(&node) {
                if self.test_predicate(&token.expression, child)? {
                    selected.push((child, path));
                }
            }
        }
        Ok(selected)
    }

    /// Expands every node to itself plus all of its descendants, level by level.
    fn visit_scan(&self, nodes: Vec<Node<'a>>) -> Vec<Node<'a>> {
        let mut scanned = vec![];
        for node in nodes {
            let mut level = vec![node];
            while !level.is_empty() {
                let next_level: Vec<Node<'a>> = level.iter().flat_map(children).collect();
                scanned.append(&mut level);
                level = next_level;
            }
        }
        scanned
    }
}

/// Children of a node: object members by ascending key, array elements by index.
fn children<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    let (value, path) = node;
    match value {
        Value::Object(object) => {
            let mut members: Vec<_> = object.iter().collect();
            members.sort_by(|(l, _), (r, _)| l.cmp(r));
            members
                .into_iter()
                .map(|(key, child)| (child, path.key(key)))
                .collect()
        }
        Value::Array(array) => array
            .iter()
            .enumerate()
            .map(|(i, child)| (child, path.index(i)))
            .collect(),
        _ => vec![],
    }
}

/// Indices selected by `[start:end:step]` on an array of `len` elements.
fn slice_indices(token: &ArraySlicePathToken, len: usize) -> Vec<usize> {
    let len = len as i64;
    let step = token.step.unwrap_or(1);
    let mut indices = vec![];
    if step == 0 || len == 0 {
        return indices;
    }
    let normalize = |i: i64| if i >= 0 { i } else { len + i };

    if step > 0 {
        let lower = token.start.map(normalize).unwrap_or(0).clamp(0, len);
        let upper = token.end.map(normalize).unwrap_or(len).clamp(0, len);
        let mut i = lower;
        while i < upper {
            indices.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    } else {
        let upper = token.start.map(normalize).unwrap_or(len - 1).clamp(-1, len - 1);
        let lower = token.end.map(normalize).unwrap_or(-1).clamp(-1, len - 1);
        let mut i = upper;
        while lower < i {
            indices.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }
    indices
}

#[cfg(test)]
mod test {
    use serde_json::{json, Value};

    use crate::{tokenizer::Tokenizer, JsonPathResult, ResultSet};

    use super::{slice_indices, Eval, MatchCounter};
    use crate::tokenizer::ArraySlicePathToken;

    fn query<'a>(json: &'a Value, jsonpath: &str) -> JsonPathResult<ResultSet<'a>> {
        let tokens = Tokenizer::new().tokenize(jsonpath)?;
        let mut result = ResultSet::new();
        Eval::new(json).eval(&tokens, &mut result)?;
        Ok(result)
    }

    #[test]
    fn can_query_root_node() -> JsonPathResult<()> {
        let json = json!({"data": {"msg": "hello"}});
        let r = query(&json, "$")?;
        assert_eq!(vec![&json], r.values());
        assert_eq!(vec!["$"], r.paths());
        Ok(())
    }

    #[test]
    fn can_query_single_property() -> JsonPathResult<()> {
        let json = json!({"data": {"msg": "hello"}});
        let r = query(&json, "$.data.msg")?;
        assert_eq!(vec![&json!("hello")], r.values());
        assert_eq!(vec!["$['data']['msg']"], r.paths());
        Ok(())
    }

    #[test]
    fn can_query_single_bracket_property() -> JsonPathResult<()> {
        let json = json!({"data": {"msg": "hello"}, "value": {"msg": "jsonpath"}});
        let r = query(&json, "$[\"data\"].msg")?;
        assert_eq!(vec![&json!("hello")], r.values());
        Ok(())
    }

    #[test]
    fn can_query_multiple_bracket_properties() -> JsonPathResult<()> {
        let json = json!({"data": {"msg": "hello"}, "value": {"msg": "jsonpath"}});
        let r = query(&json, "$['value','data'].msg")?;
        assert_eq!(vec![&json!("jsonpath"), &json!("hello")], r.values());
        assert_eq!(vec!["$['value']['msg']", "$['data']['msg']"], r.paths());
        Ok(())
    }

    #[test]
    fn can_scan_properties() -> JsonPathResult<()> {
        let json = json!({"data": {"item2": {"msg": "jsonpath"}, "item1": {"msg": "hello"}}});
        let r = query(&json, "$.data..msg")?;
        assert_eq!(vec![&json!("hello"), &json!("jsonpath")], r.values());
        Ok(())
    }

    #[test]
    fn can_scan_properties_with_arrays() -> JsonPathResult<()> {
        let json = json!({"data": {"items": [{"msg": "jsonpath"},  {"msg": "!"}], "msg": "hello"}});
        let r = query(&json, "$.data..msg")?;
        assert_eq!(vec![&json!("hello"), &json!("jsonpath"), &json!("!")], r.values());
        assert_eq!(
            vec![
                "$['data']['msg']",
                "$['data']['items'][0]['msg']",
                "$['data']['items'][1]['msg']"
            ],
            r.paths()
        );
        Ok(())
    }

    #[test]
    fn scan_is_breadth_first_with_sorted_keys() -> JsonPathResult<()> {
        let json = json!({"b": {"d": 1, "c": [2]}, "a": 3});
        let r = query(&json, "$..")?;
        assert_eq!(
            vec!["$", "$['a']", "$['b']", "$['b']['c']", "$['b']['d']", "$['b']['c'][0]"],
            r.paths()
        );
        let r = query(&json, "$..*")?;
        assert_eq!(
            vec!["$['a']", "$['b']", "$['b']['c']", "$['b']['d']", "$['b']['c'][0]"],
            r.paths()
        );
        Ok(())
    }

    #[test]
    fn mismatched_structure_selects_nothing() -> JsonPathResult<()> {
        let json = json!({"a": [1, 2], "b": "text"});
        assert!(query(&json, "$.a.b")?.is_empty());
        assert!(query(&json, "$.b[0]")?.is_empty());
        assert!(query(&json, "$.b.*")?.is_empty());
        assert!(query(&json, "$.a[5]")?.is_empty());
        assert!(query(&json, "$.missing..x")?.is_empty());
        Ok(())
    }

    #[test]
    fn predicate_on_a_non_array_tests_the_node_itself() -> JsonPathResult<()> {
        let json = json!({"bicycle": {"color": "red", "price": 19.95}});
        let r = query(&json, "$.bicycle[?(@.color == 'red')]")?;
        assert_eq!(vec!["$['bicycle']"], r.paths());
        assert!(query(&json, "$.bicycle[?(@.color == 'blue')]")?.is_empty());
        Ok(())
    }

    #[test]
    fn predicate_after_scan_tests_each_node_once() -> JsonPathResult<()> {
        let json = json!({"a": [{"price": 1}], "b": {"price": 2}});
        let r = query(&json, "$..[?(@.price)]")?;
        assert_eq!(vec!["$['b']", "$['a'][0]"], r.paths());
        Ok(())
    }

    #[test]
    fn match_counter_counts_without_collecting() -> JsonPathResult<()> {
        let json = json!([1, 2, 3]);
        let tokens = Tokenizer::new().tokenize("$[*]")?;
        let mut counter = MatchCounter::new();
        Eval::new(&json).eval(&tokens, &mut counter)?;
        assert_eq!(3, counter.count());
        Ok(())
    }

    fn slice(start: Option<i64>, end: Option<i64>, step: Option<i64>) -> ArraySlicePathToken {
        ArraySlicePathToken { start, end, step }
    }

    #[test]
    fn slice_bounds_are_normalized_and_clamped() {
        assert_eq!(vec![2, 3], slice_indices(&slice(Some(2), None, None), 4));
        assert_eq!(vec![0, 1], slice_indices(&slice(None, Some(2), None), 4));
        assert_eq!(vec![2, 3], slice_indices(&slice(Some(-2), None, None), 4));
        assert_eq!(vec![0, 1, 2, 3], slice_indices(&slice(Some(-10), Some(10), None), 4));
        assert!(slice_indices(&slice(Some(3), Some(1), None), 4).is_empty());
        assert!(slice_indices(&slice(None, None, Some(0)), 4).is_empty());
        assert!(slice_indices(&slice(None, None, None), 0).is_empty());
    }

    #[test]
    fn slice_with_steps() {
        assert_eq!(vec![1, 3], slice_indices(&slice(Some(1), Some(5), Some(2)), 7));
        assert_eq!(vec![5, 3], slice_indices(&slice(Some(5), Some(1), Some(-2)), 7));
        assert_eq!(vec![3, 2, 1, 0], slice_indices(&slice(None, None, Some(-1)), 4));
        assert_eq!(vec![0], slice_indices(&slice(None, None, Some(i64::MAX)), 4));
    }
}
