//! Composable boolean filter expressions for structured document queries.

use serde_json::{Value, json};

/// A filter expression tree: leaf predicates combined with `and`/`or`/`not`.
///
/// This is the general search primitive; the flat
/// [`DocumentFilter`](super::DocumentFilter) covers the common subset.
///
/// ```
/// use labelhub::documents::DocumentQuery;
///
/// let query = DocumentQuery::field("key", "1").or(DocumentQuery::field("key", "2"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentQuery {
    /// Match documents whose `field` equals `value`.
    Field { field: String, value: Value },
    And(Vec<DocumentQuery>),
    Or(Vec<DocumentQuery>),
    Not(Box<DocumentQuery>),
}

impl DocumentQuery {
    /// Leaf predicate testing one field for equality.
    pub fn field(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Field {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Combine with `other` under `or`, flattening chained calls into one
    /// n-ary combinator.
    pub fn or(self, other: DocumentQuery) -> Self {
        match self {
            Self::Or(mut args) => {
                args.push(other);
                Self::Or(args)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Combine with `other` under `and`, flattening chained calls.
    pub fn and(self, other: DocumentQuery) -> Self {
        match self {
            Self::And(mut args) => {
                args.push(other);
                Self::And(args)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Negate this expression.
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Serialize to the service's query wire format.
    pub(crate) fn to_wire(&self) -> Value {
        match self {
            Self::Field { field, value } => json!({ "field": field, "value": value }),
            Self::And(args) => {
                json!({ "op": "and", "args": args.iter().map(Self::to_wire).collect::<Vec<_>>() })
            }
            Self::Or(args) => {
                json!({ "op": "or", "args": args.iter().map(Self::to_wire).collect::<Vec<_>>() })
            }
            Self::Not(inner) => json!({ "op": "not", "args": [inner.to_wire()] }),
        }
    }
}
