//! A small textual front end that produces pattern descriptions.
//!
//! ```text
//! alternation := sequence ('|' sequence)*
//! sequence    := repeat*
//! repeat      := atom '*'*
//! atom        := '(' alternation ')' | '.' | '\' char | char
//! ```

use colored::Colorize;
use nom::{
    branch::alt,
    character::complete::{anychar, char, none_of},
    combinator::{all_consuming, map, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded},
    Finish, IResult,
};
use serde_json::Value;
use thiserror::Error;

use crate::pattern;

static RESERVED: &str = "|()*.\\";

#[derive(Debug, Error, Clone, PartialEq)]
#[error("syntax error at position {position}: unexpected {remainder:?}")]
pub struct SyntaxError {
    /// Char offset where parsing stopped.
    pub position: usize,
    pub consumed: String,
    pub remainder: String,
}

impl SyntaxError {
    pub fn render(&self) -> String {
        format!(
            "{} {}:\n | {}{}\n | {}{}",
            format!("[{:0>3}]", 2).red().bold(),
            "error while parsing pattern",
            self.consumed,
            self.remainder,
            " ".repeat(self.position),
            "^".green()
        )
    }
}

#[derive(Debug, Clone)]
enum Item {
    Symbol(char),
    Pattern(Value),
}

impl Item {
    fn into_value(self) -> Value {
        match self {
            Item::Symbol(symbol) => Value::String(symbol.to_string()),
            Item::Pattern(description) => description,
        }
    }
}

pub fn parse(text: &str) -> Result<Value, SyntaxError> {
    match all_consuming(alternation)(text).finish() {
        Ok((_, description)) => Ok(description),
        Err(err) => {
            let consumed = &text[..text.len() - err.input.len()];
            Err(SyntaxError {
                position: consumed.chars().count(),
                consumed: consumed.to_string(),
                remainder: err.input.to_string(),
            })
        }
    }
}

fn alternation(input: &str) -> IResult<&str, Value> {
    map(
        separated_list1(char('|'), sequence),
        |mut alternatives: Vec<Value>| {
            if alternatives.len() == 1 {
                alternatives.remove(0)
            } else {
                pattern::or(alternatives)
            }
        },
    )(input)
}

fn sequence(input: &str) -> IResult<&str, Value> {
    map(many0(repeat), merge_symbols)(input)
}

fn repeat(input: &str) -> IResult<&str, Item> {
    map(pair(atom, many0(char('*'))), |(item, stars)| {
        if stars.is_empty() {
            item
        } else {
            Item::Pattern(pattern::zero_or_more(item.into_value()))
        }
    })(input)
}

fn atom(input: &str) -> IResult<&str, Item> {
    alt((
        map(delimited(char('('), alternation, char(')')), Item::Pattern),
        value(Item::Pattern(pattern::any()), char('.')),
        map(preceded(char('\\'), anychar), Item::Symbol),
        map(none_of(RESERVED), Item::Symbol),
    ))(input)
}

// adjacent symbols become one text value
fn merge_symbols(items: Vec<Item>) -> Value {
    let mut parts = Vec::new();
    let mut pending = String::new();
    for item in items {
        match item {
            Item::Symbol(symbol) => pending.push(symbol),
            Item::Pattern(description) => {
                if !pending.is_empty() {
                    parts.push(Value::String(std::mem::take(&mut pending)));
                }
                parts.push(description);
            }
        }
    }
    if !pending.is_empty() || parts.is_empty() {
        parts.push(Value::String(pending));
    }
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        Value::Array(parts)
    }
}
