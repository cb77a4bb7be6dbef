use std::collections::hash_map::Entry;

use regex::Regex;
use serde_json::Value;

use crate::{
    tokenizer::{ComparisonOperator, FilterFunction, Operand, Predicate, Token},
    JsonPathError, JsonPathResult, ResultSet,
};

use super::{compare::compare, Eval, MatchCounter};

impl<'a> Eval<'a> {
    /// Evaluates a filter predicate with `@` bound to `candidate`.
    pub(super) fn test_predicate(
        &mut self,
        predicate: &Predicate,
        candidate: &'a Value,
    ) -> JsonPathResult<bool> {
        match predicate {
            Predicate::Exists(tokens) => self.exists(tokens, candidate),
            Predicate::Compare {
                left,
                operator,
                right,
            } => {
                let left = self.resolve(left, candidate)?;
                let right = self.resolve(right, candidate)?;
                match (operator, left, right) {
                    (ComparisonOperator::Matches, subject, pattern) => {
                        self.is_match(subject, pattern, false)
                    }
                    (operator, Some(left), Some(right)) => Ok(compare(*operator, left, right)),
                    _ => Ok(false),
                }
            }
            Predicate::Function { function, args } => {
                self.call_function(*function, args, candidate)
            }
            Predicate::And(left, right) => {
                Ok(self.test_predicate(left, candidate)? && self.test_predicate(right, candidate)?)
            }
            Predicate::Or(left, right) => {
                Ok(self.test_predicate(left, candidate)? || self.test_predicate(right, candidate)?)
            }
            Predicate::Not(inner) => Ok(!self.test_predicate(inner, candidate)?),
        }
    }

    fn exists(&mut self, tokens: &[Token], candidate: &'a Value) -> JsonPathResult<bool> {
        let mut counter = MatchCounter::new();
        self.eval_from(tokens, candidate, &mut counter)?;
        Ok(counter.count() > 0)
    }

    /// Resolves an operand to a single value. Paths that select nothing, or
    /// more than one node, resolve to `None`.
    fn resolve<'t>(
        &mut self,
        operand: &'t Operand,
        candidate: &'a Value,
    ) -> JsonPathResult<Option<&'t Value>>
    where
        'a: 't,
    {
        match operand {
            Operand::Literal(value) => Ok(Some(value)),
            Operand::Path(tokens) => {
                let mut selected = ResultSet::new();
                self.eval_from(tokens, candidate, &mut selected)?;
                match selected.values().as_slice() {
                    [value] => Ok(Some(*value)),
                    _ => Ok(None),
                }
            }
        }
    }

    fn call_function(
        &mut self,
        function: FilterFunction,
        args: &[Operand],
        candidate: &'a Value,
    ) -> JsonPathResult<bool> {
        let [subject, pattern] = args else {
            return Err(JsonPathError::EvaluationError(format!(
                "{}() takes {} arguments but {} were given",
                function.name(),
                function.arity(),
                args.len()
            )));
        };
        let subject = self.resolve(subject, candidate)?;
        let pattern = self.resolve(pattern, candidate)?;
        self.is_match(subject, pattern, function == FilterFunction::Match)
    }

    /// The pattern is compiled before the subject is looked at, so a bad
    /// pattern fails the query whatever the data holds.
    fn is_match(
        &mut self,
        subject: Option<&Value>,
        pattern: Option<&Value>,
        anchored: bool,
    ) -> JsonPathResult<bool> {
        let Some(Value::String(pattern)) = pattern else {
            return Ok(false);
        };
        let regex = if anchored {
            self.regex(&format!("^(?:{})$", pattern))?
        } else {
            self.regex(pattern)?
        };
        Ok(matches!(subject, Some(Value::String(s)) if regex.is_match(s)))
    }

    fn regex(&mut self, pattern: &str) -> JsonPathResult<&Regex> {
        match self.regex_cache.entry(pattern.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let regex = Regex::new(pattern)?;
                log::debug!("compiled filter pattern {:?}", pattern);
                Ok(entry.insert(regex))
            }
        }
    }
}
