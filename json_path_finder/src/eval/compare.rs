use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::tokenizer::ComparisonOperator;

/// Applies a non-regex comparison operator to two resolved operands.
///
/// Mismatched types are never equal and never ordered; `!=` is the negation of `==`.
pub fn compare(operator: ComparisonOperator, left: &Value, right: &Value) -> bool {
    match operator {
        ComparisonOperator::Equal => values_equal(left, right),
        ComparisonOperator::NotEqual => !values_equal(left, right),
        ComparisonOperator::Less => order(left, right) == Some(Ordering::Less),
        ComparisonOperator::Greater => order(left, right) == Some(Ordering::Greater),
        ComparisonOperator::LessEqual => {
            order(left, right) == Some(Ordering::Less) || values_equal(left, right)
        }
        ComparisonOperator::GreaterEqual => {
            order(left, right) == Some(Ordering::Greater) || values_equal(left, right)
        }
        ComparisonOperator::Matches => false,
    }
}

pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Number(l), Value::Number(r)) => compare_numbers(l, r) == Some(Ordering::Equal),
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(k, v)| r.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => false,
    }
}

fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => compare_numbers(l, r),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Integral numbers compare by exact value; anything else falls back to `f64`.
pub fn compare_numbers(left: &Number, right: &Number) -> Option<Ordering> {
    match (exact_integer(left), exact_integer(right)) {
        (Some(l), Some(r)) => Some(l.cmp(&r)),
        _ => left.as_f64()?.partial_cmp(&right.as_f64()?),
    }
}

// i128 holds every u64 and i64, and every integral f64 below 2^127.
fn exact_integer(n: &Number) -> Option<i128> {
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < 1.0e38)
        .map(|f| f as i128)
}
