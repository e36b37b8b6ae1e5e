//! Document filters
//!
//! A filter is a conjunction of per-field predicates evaluated against a
//! JSON document. Matches the subset of query semantics the repositories
//! need: exact field equality, and `in`-set membership where an array-valued
//! field matches when it intersects the given set.

use serde_json::Value;

/// Conjunction of field predicates; the empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
enum Clause {
    /// Field equals value exactly
    Eq(String, Value),
    /// Scalar field is a member of the set, or array field intersects it
    In(String, Vec<Value>),
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality clause.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Eq(field.into(), value.into()));
        self
    }

    /// Add an `in`-set clause.
    pub fn is_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.clauses.push(Clause::In(
            field.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the filter against one document. Missing fields never match.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::Eq(field, value) => doc.get(field) == Some(value),
            Clause::In(field, values) => match doc.get(field) {
                Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
                Some(scalar) => values.contains(scalar),
                None => false,
            },
        })
    }
}
