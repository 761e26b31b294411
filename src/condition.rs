//! Root and parent-child conditions
//!
//! Merging follows one policy per field: setters are appended as a list
//! (duplicates allowed, first match wins when applied), filters are
//! conjoined through `FilterBuilder`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelationshipError, Result};
use crate::filter::{FilterBuilder, FilterExpression, Row};

// ============================================================================
// Setters
// ============================================================================

/// Where a setter takes its value from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetterSource {
    /// Copy a field of the parent row
    FromField(String),
    /// Use a literal
    Value(Value),
}

/// Populates one field of a newly created row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setter {
    pub to_field: String,
    #[serde(flatten)]
    pub source: SetterSource,
}

impl Setter {
    /// `to_field <- parent.from_field`
    pub fn copy(to_field: impl Into<String>, from_field: impl Into<String>) -> Self {
        Self {
            to_field: to_field.into(),
            source: SetterSource::FromField(from_field.into()),
        }
    }

    /// `to_field <- value`
    pub fn literal(to_field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            to_field: to_field.into(),
            source: SetterSource::Value(value.into()),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.source, SetterSource::Value(_))
    }
}

/// Append `new` after the existing setters
pub fn merge_setters(existing: &mut Vec<Setter>, new: impl IntoIterator<Item = Setter>) {
    existing.extend(new);
}

/// Insert `new` ahead of the existing setters so they take precedence
pub fn prepend_setters(existing: &mut Vec<Setter>, new: impl IntoIterator<Item = Setter>) {
    let mut merged: Vec<Setter> = new.into_iter().collect();
    merged.append(existing);
    *existing = merged;
}

/// Conjoin `clause` with an existing filter, keeping all existing clauses
pub fn merge_filter(existing: &FilterExpression, clause: FilterExpression) -> FilterExpression {
    FilterBuilder::from_existing(Some(existing))
        .and_clause(clause)
        .build()
}

/// Apply setters to `target`; the first setter for a field wins
pub fn apply_setters(setters: &[Setter], source: Option<&Row>, target: &mut Row) -> Result<()> {
    let mut assigned = HashSet::new();
    for setter in setters {
        if !assigned.insert(setter.to_field.as_str()) {
            continue;
        }
        let value = match &setter.source {
            SetterSource::Value(value) => value.clone(),
            SetterSource::FromField(from) => {
                let Some(source) = source else {
                    return Err(RelationshipError::malformed_merge(format!(
                        "Setter for '{}' copies '{}' but there is no source row",
                        setter.to_field, from
                    )));
                };
                source.get(from).cloned().unwrap_or(Value::Null)
            }
        };
        target.insert(setter.to_field.clone(), value);
    }
    Ok(())
}

// ============================================================================
// Root Condition
// ============================================================================

/// Selects which rows of a table have no parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCondition {
    pub source: String,
    #[serde(default)]
    pub setters: Vec<Setter>,
    #[serde(default)]
    pub filter: FilterExpression,
}

impl RootCondition {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            setters: Vec::new(),
            filter: FilterExpression::empty(),
        }
    }

    fn check_setters(&self, setters: &[Setter]) -> Result<()> {
        match setters.iter().find(|s| !s.is_literal()) {
            Some(setter) => Err(RelationshipError::malformed_merge(format!(
                "Root condition of '{}' cannot copy '{}' from a parent row",
                self.source, setter.to_field
            ))),
            None => Ok(()),
        }
    }

    /// Append literal setters
    pub fn merge_setters(&mut self, setters: Vec<Setter>) -> Result<()> {
        self.check_setters(&setters)?;
        merge_setters(&mut self.setters, setters);
        Ok(())
    }

    /// Prepend literal setters
    pub fn prepend_setters(&mut self, setters: Vec<Setter>) -> Result<()> {
        self.check_setters(&setters)?;
        prepend_setters(&mut self.setters, setters);
        Ok(())
    }

    /// Conjoin a clause that only reads the row itself
    pub fn merge_filter(&mut self, clause: FilterExpression) -> Result<()> {
        if clause.references_local() {
            return Err(RelationshipError::malformed_merge(format!(
                "Root filter of '{}' cannot reference a parent row",
                self.source
            )));
        }
        self.filter = merge_filter(&self.filter, clause);
        Ok(())
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.filter.matches(&Row::new(), row)
    }

    /// Populate the linking fields of a new root row
    pub fn apply(&self, row: &mut Row) -> Result<()> {
        apply_setters(&self.setters, None, row)
    }
}

// ============================================================================
// Parent-Child Condition
// ============================================================================

/// Selects the children of a source row in a destination table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentChildCondition {
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub setters: Vec<Setter>,
    #[serde(default)]
    pub filter: FilterExpression,
    /// Finds the parent of a child row; local is the child, remote the parent
    #[serde(default)]
    pub inverse_filter: FilterExpression,
}

impl ParentChildCondition {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            setters: Vec::new(),
            filter: FilterExpression::empty(),
            inverse_filter: FilterExpression::empty(),
        }
    }

    pub fn is_self_referencing(&self) -> bool {
        self.source == self.destination
    }

    pub fn merge_setters(&mut self, setters: Vec<Setter>) {
        merge_setters(&mut self.setters, setters);
    }

    pub fn merge_filter(&mut self, clause: FilterExpression) {
        self.filter = merge_filter(&self.filter, clause);
    }

    pub fn merge_inverse_filter(&mut self, clause: FilterExpression) {
        self.inverse_filter = merge_filter(&self.inverse_filter, clause);
    }

    /// Whether `child` is a child of `parent`
    pub fn matches(&self, parent: &Row, child: &Row) -> bool {
        self.filter.matches(parent, child)
    }

    /// Whether `parent` is the parent of `child`, through the inverse filter
    ///
    /// An empty inverse filter matches any parent.
    pub fn matches_inverse(&self, child: &Row, parent: &Row) -> bool {
        self.inverse_filter.matches(child, parent)
    }

    /// Populate the linking fields of a new child row
    pub fn apply(&self, parent: &Row, child: &mut Row) -> Result<()> {
        apply_setters(&self.setters, Some(parent), child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected object"),
        }
    }

    // =========================================================================
    // Setter Tests
    // =========================================================================

    #[test]
    fn test_setter_serialization_shape() {
        let copy = serde_json::to_value(Setter::copy("pid", "id")).unwrap();
        assert_eq!(copy, json!({"to_field": "pid", "from_field": "id"}));

        let literal = serde_json::to_value(Setter::literal("varbase", "0")).unwrap();
        assert_eq!(literal, json!({"to_field": "varbase", "value": "0"}));

        let parsed: Setter = serde_json::from_value(copy).unwrap();
        assert_eq!(parsed, Setter::copy("pid", "id"));
    }

    #[test]
    fn test_merge_setters_appends_and_keeps_duplicates() {
        let mut setters = vec![Setter::copy("pid", "id")];
        merge_setters(
            &mut setters,
            vec![Setter::copy("pid", "id"), Setter::copy("x", "y")],
        );

        assert_eq!(
            setters,
            vec![
                Setter::copy("pid", "id"),
                Setter::copy("pid", "id"),
                Setter::copy("x", "y"),
            ]
        );
    }

    #[test]
    fn test_prepend_setters() {
        let mut setters = vec![Setter::literal("pid", "0")];
        prepend_setters(&mut setters, vec![Setter::literal("varbase", "1")]);
        assert_eq!(
            setters,
            vec![Setter::literal("varbase", "1"), Setter::literal("pid", "0")]
        );
    }

    #[test]
    fn test_apply_setters_first_match_wins() {
        let setters = vec![
            Setter::literal("varbase", "1"),
            Setter::literal("varbase", "0"),
            Setter::copy("pid", "id"),
        ];
        let parent = row(json!({"id": 12}));
        let mut child = Row::new();

        apply_setters(&setters, Some(&parent), &mut child).unwrap();

        assert_eq!(child.get("varbase"), Some(&json!("1")));
        assert_eq!(child.get("pid"), Some(&json!(12)));
    }

    #[test]
    fn test_apply_copy_without_source_fails() {
        let mut child = Row::new();
        let result = apply_setters(&[Setter::copy("pid", "id")], None, &mut child);
        assert!(matches!(result, Err(RelationshipError::MalformedMerge(_))));
    }

    #[test]
    fn test_apply_copy_missing_field_is_null() {
        let mut child = Row::new();
        apply_setters(&[Setter::copy("pid", "id")], Some(&Row::new()), &mut child).unwrap();
        assert_eq!(child.get("pid"), Some(&Value::Null));
    }

    // =========================================================================
    // RootCondition Tests
    // =========================================================================

    #[test]
    fn test_root_rejects_copy_setter() {
        let mut root = RootCondition::new("mm_pages");
        let result = root.merge_setters(vec![Setter::copy("pid", "id")]);

        assert!(matches!(result, Err(RelationshipError::MalformedMerge(_))));
        assert!(root.setters.is_empty());
    }

    #[test]
    fn test_root_rejects_remote_filter() {
        let mut root = RootCondition::new("mm_pages");
        let result = root.merge_filter(FilterExpression::remote_equals("id", "pid"));

        assert!(matches!(result, Err(RelationshipError::MalformedMerge(_))));
        assert!(root.filter.is_empty());
    }

    #[test]
    fn test_root_matches_and_applies() {
        let mut root = RootCondition::new("mm_pages");
        root.merge_setters(vec![Setter::literal("pid", "0")]).unwrap();
        root.merge_filter(FilterExpression::equals("pid", 0)).unwrap();

        assert!(root.matches(&row(json!({"pid": 0}))));
        assert!(!root.matches(&row(json!({"pid": 3}))));

        let mut new_row = Row::new();
        root.apply(&mut new_row).unwrap();
        assert_eq!(new_row.get("pid"), Some(&json!("0")));
    }

    #[test]
    fn test_new_root_matches_everything() {
        let root = RootCondition::new("mm_pages");
        assert!(root.matches(&row(json!({"pid": 9}))));
    }

    // =========================================================================
    // ParentChildCondition Tests
    // =========================================================================

    #[test]
    fn test_parent_child_merge_filter_conjoins() {
        let mut condition = ParentChildCondition::new("mm_a", "mm_b");
        condition.merge_filter(FilterExpression::equals("published", 1));
        condition.merge_filter(FilterExpression::remote_equals("id", "pid"));

        assert_eq!(
            condition.filter,
            FilterExpression::and(vec![
                FilterExpression::equals("published", 1),
                FilterExpression::remote_equals("id", "pid"),
            ])
        );
    }

    #[test]
    fn test_parent_child_matches_and_applies() {
        let mut condition = ParentChildCondition::new("mm_a", "mm_b");
        condition.merge_setters(vec![Setter::copy("pid", "id")]);
        condition.merge_filter(FilterExpression::remote_equals("id", "pid"));
        condition.merge_inverse_filter(FilterExpression::remote_equals("pid", "id"));

        let parent = row(json!({"id": 4}));
        let mut child = Row::new();
        condition.apply(&parent, &mut child).unwrap();

        assert_eq!(child.get("pid"), Some(&json!(4)));
        assert!(condition.matches(&parent, &child));
        assert!(condition.matches_inverse(&child, &parent));
        assert!(!condition.matches(&row(json!({"id": 5})), &child));
    }

    #[test]
    fn test_self_referencing() {
        assert!(ParentChildCondition::new("mm_a", "mm_a").is_self_referencing());
        assert!(!ParentChildCondition::new("mm_a", "mm_b").is_self_referencing());
    }
}
