//! Model actions available on a table's rows

use serde::{Deserialize, Serialize};

use crate::condition::{Setter, apply_setters};
use crate::config::RelationFields;
use crate::error::{RelationshipError, Result};
use crate::filter::{Row, is_truthy};
use crate::graph::ConditionGraph;
use crate::types::TableDescriptor;

/// Row-level action offered for a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelAction {
    #[default]
    None,
    CreateVariant,
}

impl ModelAction {
    /// Variant tables that are not closed can spawn variants
    pub fn for_table(descriptor: &TableDescriptor) -> Self {
        if descriptor.supports_variants && !descriptor.closed {
            Self::CreateVariant
        } else {
            Self::None
        }
    }

    /// Run the action against `base`
    ///
    /// For `CreateVariant` the result is a copy of the base row without its
    /// id, with the self parent-child setters applied. The parent link is
    /// kept from the base row so the variant sits next to its base.
    pub fn execute(
        &self,
        descriptor: &TableDescriptor,
        graph: &ConditionGraph,
        fields: &RelationFields,
        base: &Row,
    ) -> Result<Option<Row>> {
        match self {
            Self::None => Ok(None),
            Self::CreateVariant => create_variant(descriptor, graph, fields, base).map(Some),
        }
    }
}

fn create_variant(
    descriptor: &TableDescriptor,
    graph: &ConditionGraph,
    fields: &RelationFields,
    base: &Row,
) -> Result<Row> {
    if !descriptor.supports_variants {
        return Err(RelationshipError::validation(format!(
            "Table '{}' does not support variants",
            descriptor.name
        )));
    }

    let is_base = base.get(&fields.variant_base).is_some_and(is_truthy);
    if !is_base {
        return Err(RelationshipError::validation(format!(
            "Variants of '{}' can only be created from a base row",
            descriptor.name
        )));
    }

    let condition = graph
        .parent_child(&descriptor.name, &descriptor.name)
        .ok_or_else(|| {
            RelationshipError::validation(format!(
                "Table '{}' has no self condition to derive variants from",
                descriptor.name
            ))
        })?;

    let setters: Vec<Setter> = condition
        .setters
        .iter()
        .filter(|s| s.to_field != fields.parent)
        .cloned()
        .collect();

    let mut variant = base.clone();
    variant.remove(&fields.id);
    apply_setters(&setters, Some(base), &mut variant)?;

    tracing::debug!(table = %descriptor.name, "Created variant row");
    Ok(variant)
}
