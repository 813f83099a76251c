//! Query expression model.

use std::fmt;

use chrono::{DateTime, Utc};

/// Prefix that negates a term.
pub const NEGATION: &str = "not";

/// Comparison operators of the search language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operator {
    #[default]
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Contains,
    /// Membership: rendered as `value in key`.
    In,
    /// Map match: the value must be a list.
    Has,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Contains => "contains",
            Operator::In => "in",
            Operator::Has => "has",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conjunction::And => "and",
            Conjunction::Or => "or",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a term.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    /// `{ a b c }`. Text items are written bare, so a list can carry
    /// conjunctions between nested terms.
    List(Vec<Value>),
    /// A key/value pair inside a `has` list.
    Term(Box<Term>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Term> for Value {
    fn from(value: Term) -> Self {
        Value::Term(Box::new(value))
    }
}

impl From<Conjunction> for Value {
    fn from(value: Conjunction) -> Self {
        Value::Text(value.as_str().to_string())
    }
}

/// `[not] key op value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub key: String,
    pub operator: Operator,
    pub value: Value,
    pub negated: bool,
}

impl Term {
    /// An equality term.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            operator: Operator::default(),
            value: value.into(),
            negated: false,
        }
    }

    #[must_use]
    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }
}

/// A search expression.
///
/// A group renders its items separated by spaces; nested groups are
/// parenthesized, the outermost one is not.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Term(Term),
    Group(Vec<Query>),
    Conjunction(Conjunction),
    /// Written out unchanged.
    Raw(String),
}

impl Query {
    pub fn group(items: impl IntoIterator<Item = Query>) -> Self {
        Query::Group(items.into_iter().collect())
    }

    pub fn raw(query: impl Into<String>) -> Self {
        Query::Raw(query.into())
    }

    /// Group `items` with `conjunction` between each pair.
    pub fn join(conjunction: Conjunction, items: impl IntoIterator<Item = Query>) -> Self {
        let mut joined = Vec::new();
        for item in items {
            if !joined.is_empty() {
                joined.push(Query::Conjunction(conjunction));
            }
            joined.push(item);
        }
        Query::Group(joined)
    }

    pub fn all(items: impl IntoIterator<Item = Query>) -> Self {
        Self::join(Conjunction::And, items)
    }

    pub fn any(items: impl IntoIterator<Item = Query>) -> Self {
        Self::join(Conjunction::Or, items)
    }
}

impl From<Term> for Query {
    fn from(term: Term) -> Self {
        Query::Term(term)
    }
}

impl From<Conjunction> for Query {
    fn from(conjunction: Conjunction) -> Self {
        Query::Conjunction(conjunction)
    }
}

impl From<&str> for Query {
    fn from(query: &str) -> Self {
        Query::Raw(query.to_string())
    }
}

impl From<String> for Query {
    fn from(query: String) -> Self {
        Query::Raw(query)
    }
}

impl From<Vec<Query>> for Query {
    fn from(items: Vec<Query>) -> Self {
        Query::Group(items)
    }
}
