//! Condition graph for one build pass
//!
//! Holds at most one root condition per table and at most one parent-child
//! condition per (source, destination) pair. Conditions are only ever
//! created or augmented, never removed.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::condition::{ParentChildCondition, RootCondition};
use crate::error::{RelationshipError, Result};

/// Registry of root and parent-child conditions
///
/// Deserializing rejects input that breaks the uniqueness rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphParts")]
pub struct ConditionGraph {
    roots: BTreeMap<String, RootCondition>,
    /// Insertion ordered, unique per (source, destination)
    children: Vec<ParentChildCondition>,
}

/// Unchecked serialized form of a `ConditionGraph`
#[derive(Deserialize)]
struct GraphParts {
    #[serde(default)]
    roots: BTreeMap<String, RootCondition>,
    #[serde(default)]
    children: Vec<ParentChildCondition>,
}

impl TryFrom<GraphParts> for ConditionGraph {
    type Error = RelationshipError;

    fn try_from(parts: GraphParts) -> Result<Self> {
        if let Some((key, root)) = parts.roots.iter().find(|(key, root)| **key != root.source) {
            return Err(RelationshipError::validation(format!(
                "Root condition keyed '{}' belongs to table '{}'",
                key, root.source
            )));
        }

        let mut seen = HashSet::new();
        for condition in &parts.children {
            if !seen.insert((condition.source.as_str(), condition.destination.as_str())) {
                return Err(RelationshipError::validation(format!(
                    "Duplicate parent-child condition '{}' -> '{}'",
                    condition.source, condition.destination
                )));
            }
        }

        Ok(Self {
            roots: parts.roots,
            children: parts.children,
        })
    }
}

impl ConditionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.children.is_empty()
    }

    /// Root condition of `table`, created empty if absent
    pub fn get_or_create_root(&mut self, table: &str) -> &mut RootCondition {
        self.roots.entry(table.to_string()).or_insert_with(|| {
            tracing::trace!(table, "Creating root condition");
            RootCondition::new(table)
        })
    }

    /// Parent-child condition for `(source, destination)`, created empty if absent
    pub fn get_or_create_parent_child(
        &mut self,
        source: &str,
        destination: &str,
    ) -> &mut ParentChildCondition {
        let index = match self.position(source, destination) {
            Some(index) => index,
            None => {
                tracing::trace!(source, destination, "Creating parent-child condition");
                self.children
                    .push(ParentChildCondition::new(source, destination));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    fn position(&self, source: &str, destination: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.source == source && c.destination == destination)
    }

    pub fn root(&self, table: &str) -> Option<&RootCondition> {
        self.roots.get(table)
    }

    pub fn parent_child(&self, source: &str, destination: &str) -> Option<&ParentChildCondition> {
        self.position(source, destination).map(|i| &self.children[i])
    }

    pub fn root_conditions(&self) -> impl Iterator<Item = &RootCondition> {
        self.roots.values()
    }

    pub fn parent_child_conditions(&self) -> impl Iterator<Item = &ParentChildCondition> {
        self.children.iter()
    }

    /// Conditions whose parent rows live in `source`
    pub fn children_of<'a>(
        &'a self,
        source: &'a str,
    ) -> impl Iterator<Item = &'a ParentChildCondition> + 'a {
        self.children.iter().filter(move |c| c.source == source)
    }

    /// Conditions whose child rows live in `destination`
    pub fn parents_of<'a>(
        &'a self,
        destination: &'a str,
    ) -> impl Iterator<Item = &'a ParentChildCondition> + 'a {
        self.children
            .iter()
            .filter(move |c| c.destination == destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Setter;
    use crate::filter::FilterExpression;

    #[test]
    fn test_new_graph_is_empty() {
        let graph = ConditionGraph::new();
        assert!(graph.is_empty());
        assert!(graph.root("mm_pages").is_none());
        assert!(graph.parent_child("mm_a", "mm_b").is_none());
    }

    #[test]
    fn test_get_or_create_root_is_unique() {
        let mut graph = ConditionGraph::new();
        graph
            .get_or_create_root("mm_pages")
            .merge_setters(vec![Setter::literal("pid", "0")])
            .unwrap();

        let again = graph.get_or_create_root("mm_pages");
        assert_eq!(again.setters.len(), 1);
        assert_eq!(graph.root_conditions().count(), 1);
    }

    #[test]
    fn test_get_or_create_parent_child_is_unique_per_pair() {
        let mut graph = ConditionGraph::new();
        graph
            .get_or_create_parent_child("mm_a", "mm_b")
            .merge_filter(FilterExpression::remote_equals("id", "pid"));
        graph.get_or_create_parent_child("mm_a", "mm_b");
        graph.get_or_create_parent_child("mm_b", "mm_a");

        assert_eq!(graph.parent_child_conditions().count(), 2);
        assert!(
            !graph
                .parent_child("mm_a", "mm_b")
                .unwrap()
                .filter
                .is_empty()
        );
        assert!(graph.parent_child("mm_b", "mm_a").unwrap().filter.is_empty());
    }

    #[test]
    fn test_children_and_parents_queries() {
        let mut graph = ConditionGraph::new();
        graph.get_or_create_parent_child("mm_a", "mm_b");
        graph.get_or_create_parent_child("mm_a", "mm_c");
        graph.get_or_create_parent_child("mm_c", "mm_c");

        let children: Vec<_> = graph
            .children_of("mm_a")
            .map(|c| c.destination.as_str())
            .collect();
        assert_eq!(children, vec!["mm_b", "mm_c"]);

        let parents: Vec<_> = graph
            .parents_of("mm_c")
            .map(|c| c.source.as_str())
            .collect();
        assert_eq!(parents, vec!["mm_a", "mm_c"]);
    }

    #[test]
    fn test_graph_serialization_roundtrip() {
        let mut graph = ConditionGraph::new();
        graph.get_or_create_root("mm_pages");
        graph
            .get_or_create_parent_child("mm_pages", "mm_pages")
            .merge_setters(vec![Setter::copy("pid", "id")]);

        let json = serde_json::to_string(&graph).unwrap();
        let parsed: ConditionGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, graph);
    }

    #[test]
    fn test_deserialize_missing_sections_defaults_empty() {
        let parsed: ConditionGraph = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_duplicate_pair() {
        let json = serde_json::json!({
            "children": [
                {"source": "mm_a", "destination": "mm_b"},
                {"source": "mm_a", "destination": "mm_b"}
            ]
        });

        let result = serde_json::from_value::<ConditionGraph>(json);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Duplicate parent-child condition"));
    }

    #[test]
    fn test_deserialize_rejects_mismatched_root_key() {
        let json = serde_json::json!({
            "roots": {"mm_a": {"source": "mm_b"}}
        });

        assert!(serde_json::from_value::<ConditionGraph>(json).is_err());
    }

    #[test]
    fn test_deserialize_accepts_reversed_pair() {
        let json = serde_json::json!({
            "children": [
                {"source": "mm_a", "destination": "mm_b"},
                {"source": "mm_b", "destination": "mm_a"}
            ]
        });

        let graph: ConditionGraph = serde_json::from_value(json).unwrap();
        assert_eq!(graph.parent_child_conditions().count(), 2);
    }
}
