//! Pattern descriptions are plain `serde_json` values:
//!
//! * `"abc"` literal text
//! * `[p, q, ...]` sequence
//! * `{"or": [p, q, ...]}` alternation, at least one alternative
//! * `{"any": true}` wildcard
//! * `{"zero_or_more": p}` repetition

use serde_json::{Map, Value};

pub const OR: &str = "or";
pub const ZERO_OR_MORE: &str = "zero_or_more";
pub const ANY: &str = "any";

#[derive(Debug, PartialEq)]
pub enum Shape<'a> {
    Text(&'a str),
    Sequence(&'a [Value]),
    Or(&'a [Value]),
    Any,
    ZeroOrMore(&'a Value),
}

/// Classifies a description, or `None` if it is not a recognized shape.
pub fn shape(value: &Value) -> Option<Shape> {
    match value {
        Value::String(text) => Some(Shape::Text(text)),
        Value::Array(items) => Some(Shape::Sequence(items)),
        Value::Object(map) if map.len() == 1 => {
            let (label, inner) = map.iter().next()?;
            match label.as_str() {
                OR => match inner {
                    Value::Array(alternatives) if !alternatives.is_empty() => {
                        Some(Shape::Or(alternatives))
                    }
                    _ => None,
                },
                ZERO_OR_MORE => Some(Shape::ZeroOrMore(inner)),
                ANY if *inner == Value::Bool(true) => Some(Shape::Any),
                _ => None,
            }
        }
        _ => None,
    }
}

fn labeled(label: &str, inner: Value) -> Value {
    let mut map = Map::new();
    map.insert(label.to_string(), inner);
    Value::Object(map)
}

pub fn text(text: &str) -> Value {
    Value::String(text.to_string())
}

pub fn seq<I>(items: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    Value::Array(items.into_iter().collect())
}

pub fn or<I>(alternatives: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    labeled(OR, seq(alternatives))
}

pub fn any() -> Value {
    labeled(ANY, Value::Bool(true))
}

pub fn zero_or_more(repeatable: Value) -> Value {
    labeled(ZERO_OR_MORE, repeatable)
}

/// `0|1|...|9`
pub fn digit() -> Value {
    or(('0'..='9').map(|d| text(&d.to_string())))
}
