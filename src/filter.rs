//! Filter expressions over named fields
//!
//! A `FilterExpression` is evaluated against a (local, remote) row pair:
//! for parent-child conditions the local row is the parent and the remote
//! row is the candidate child; for root conditions only the remote row is
//! populated. `FilterBuilder` accumulates clauses additively so that
//! clauses already present in an expression are never dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record as a map of field name to value
pub type Row = serde_json::Map<String, Value>;

/// Boolean filter expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum FilterExpression {
    /// `remote.field == value`
    Equals { field: String, value: Value },
    /// `remote.remote_field == local.local_field`
    RemoteEquals { local: String, remote: String },
    Not { expression: Box<FilterExpression> },
    And { children: Vec<FilterExpression> },
    Or { children: Vec<FilterExpression> },
}

impl Default for FilterExpression {
    fn default() -> Self {
        Self::empty()
    }
}

impl FilterExpression {
    /// The empty conjunction, which matches every row
    pub fn empty() -> Self {
        FilterExpression::And {
            children: Vec::new(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpression::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn remote_equals(local: impl Into<String>, remote: impl Into<String>) -> Self {
        FilterExpression::RemoteEquals {
            local: local.into(),
            remote: remote.into(),
        }
    }

    pub fn negate(expression: FilterExpression) -> Self {
        FilterExpression::Not {
            expression: Box::new(expression),
        }
    }

    pub fn and(children: Vec<FilterExpression>) -> Self {
        FilterExpression::And { children }
    }

    pub fn or(children: Vec<FilterExpression>) -> Self {
        FilterExpression::Or { children }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FilterExpression::And { children } if children.is_empty())
    }

    /// Top-level conjuncts of the expression
    pub fn clauses(&self) -> &[FilterExpression] {
        match self {
            FilterExpression::And { children } => children,
            other => std::slice::from_ref(other),
        }
    }

    /// Whether `needle` occurs anywhere in the tree, including the root
    pub fn contains(&self, needle: &FilterExpression) -> bool {
        if self == needle {
            return true;
        }
        match self {
            FilterExpression::Not { expression } => expression.contains(needle),
            FilterExpression::And { children } | FilterExpression::Or { children } => {
                children.iter().any(|c| c.contains(needle))
            }
            _ => false,
        }
    }

    /// Whether the expression compares against the local row anywhere
    pub fn references_local(&self) -> bool {
        match self {
            FilterExpression::RemoteEquals { .. } => true,
            FilterExpression::Equals { .. } => false,
            FilterExpression::Not { expression } => expression.references_local(),
            FilterExpression::And { children } | FilterExpression::Or { children } => {
                children.iter().any(FilterExpression::references_local)
            }
        }
    }

    /// Evaluate against a (local, remote) row pair
    pub fn matches(&self, local: &Row, remote: &Row) -> bool {
        match self {
            FilterExpression::Equals { field, value } => {
                values_equal(field_value(remote, field), value)
            }
            FilterExpression::RemoteEquals {
                local: local_field,
                remote: remote_field,
            } => values_equal(
                field_value(remote, remote_field),
                field_value(local, local_field),
            ),
            FilterExpression::Not { expression } => !expression.matches(local, remote),
            FilterExpression::And { children } => children.iter().all(|c| c.matches(local, remote)),
            FilterExpression::Or { children } => children.iter().any(|c| c.matches(local, remote)),
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Additive builder for filter expressions
///
/// Clauses are conjoined; inside an open OR group they are disjoined until
/// the group is closed. Clauses of the starting expression are kept
/// verbatim and in order.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    clauses: Vec<FilterExpression>,
    group: Option<Vec<FilterExpression>>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing expression, keeping all of its clauses
    pub fn from_existing(existing: Option<&FilterExpression>) -> Self {
        let clauses = existing
            .map(|expr| expr.clauses().to_vec())
            .unwrap_or_default();
        Self {
            clauses,
            group: None,
        }
    }

    /// Add `field == value`
    pub fn and_equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_clause(FilterExpression::equals(field, value))
    }

    /// Add `field != value`
    pub fn and_not_equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_clause(FilterExpression::negate(FilterExpression::equals(field, value)))
    }

    /// Add `remote.remote_field == local.local_field`, optionally negated
    pub fn and_remote_equals(
        self,
        local_field: impl Into<String>,
        remote_field: impl Into<String>,
        negate: bool,
    ) -> Self {
        let clause = FilterExpression::remote_equals(local_field, remote_field);
        if negate {
            self.and_clause(FilterExpression::negate(clause))
        } else {
            self.and_clause(clause)
        }
    }

    /// Add an arbitrary clause
    pub fn and_clause(mut self, clause: FilterExpression) -> Self {
        if clause.is_empty() {
            return self;
        }
        match self.group.as_mut() {
            Some(group) => group.push(clause),
            None => self.clauses.push(clause),
        }
        self
    }

    /// Open an OR group, closing any group that is already open
    pub fn open_or_group(self) -> Self {
        let mut builder = self.close_group();
        builder.group = Some(Vec::new());
        builder
    }

    /// Close the open OR group, conjoining it with the other clauses
    pub fn close_group(mut self) -> Self {
        if let Some(group) = self.group.take() {
            match group.len() {
                0 => {}
                1 => self.clauses.extend(group),
                _ => self.clauses.push(FilterExpression::or(group)),
            }
        }
        self
    }

    pub fn build(self) -> FilterExpression {
        let mut builder = self.close_group();
        match builder.clauses.len() {
            1 => builder.clauses.remove(0),
            _ => FilterExpression::and(builder.clauses),
        }
    }
}

// ============================================================================
// Value comparison
// ============================================================================

fn field_value<'a>(row: &'a Row, field: &str) -> &'a Value {
    row.get(field).unwrap_or(&Value::Null)
}

/// Loose truthiness: null, false, 0, "", "0" and empty collections are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Loose equality: booleans compare by truthiness, other values by text
///
/// `0 == "0"` and `1 == true` hold; null only equals null or `false`.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(b), other) | (other, Value::Bool(b)) => is_truthy(other) == *b,
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (l, r) => json_value_to_string(l) == json_value_to_string(r),
    }
}

/// Convert JSON value to string for comparison
pub(crate) fn json_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => value.to_string(),
    }
}
