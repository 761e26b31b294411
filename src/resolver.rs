//! Relationship resolution
//!
//! Derives the root and parent-child conditions a table needs from its
//! descriptor and input screen, and merges them into a `ConditionGraph`.
//!
//! Steps run in a fixed order because later steps extend conditions
//! created by earlier ones:
//!
//! 1. Hierarchical: root condition `pid = 0` and self condition `pid <- id`
//! 2. Parent: condition from the parent table, `pid <- id`
//! 3. Variants: root `varbase = 1` and self condition over `vargroup`
//!
//! Resolution works on a staged copy of the graph, so a failing table
//! leaves the graph untouched.

use crate::condition::Setter;
use crate::config::ResolverConfig;
use crate::error::{RelationshipError, Result};
use crate::filter::{FilterBuilder, FilterExpression};
use crate::graph::ConditionGraph;
use crate::sanitize::validate_identifier;
use crate::screen::{InputScreen, required_parent_table};
use crate::types::TableDescriptor;

/// Computes and merges the conditions of one table
#[derive(Debug, Clone, Default)]
pub struct RelationshipResolver {
    config: ResolverConfig,
}

impl RelationshipResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the conditions of `descriptor` into `graph`
    ///
    /// Existing conditions are augmented, never replaced: setters are
    /// appended (the variant root setter is prepended) and filter clauses
    /// are conjoined, so manual customizations survive.
    pub fn resolve(
        &self,
        descriptor: &TableDescriptor,
        screen: &dyn InputScreen,
        graph: &mut ConditionGraph,
    ) -> Result<()> {
        if self.config.validate_identifiers {
            descriptor.validate()?;
            if let Some(parent) = screen.parent_table() {
                validate_identifier(parent).map_err(RelationshipError::validation)?;
            }
        }

        self.check_consistency(descriptor, screen)?;

        let mut staged = graph.clone();
        self.add_hierarchical_conditions(descriptor, &mut staged)?;
        self.add_parent_condition(descriptor, screen, &mut staged)?;
        if descriptor.supports_variants {
            self.add_variant_conditions(descriptor, &mut staged)?;
        }
        *graph = staged;

        tracing::debug!(
            table = %descriptor.name,
            mode = ?descriptor.mode,
            variants = descriptor.supports_variants,
            "Resolved table conditions"
        );
        Ok(())
    }

    /// Hierarchical mode with a distinct parent table is only supported
    /// together with variants.
    fn check_consistency(&self, descriptor: &TableDescriptor, screen: &dyn InputScreen) -> Result<()> {
        if !descriptor.is_hierarchical() || screen.is_standalone() || descriptor.supports_variants {
            return Ok(());
        }

        let parent = required_parent_table(screen)?;
        if parent == descriptor.name {
            return Ok(());
        }

        Err(RelationshipError::unsupported(format!(
            "Hierarchical mode for '{}' with parent table '{}' is not supported",
            descriptor.name, parent
        )))
    }

    fn add_hierarchical_conditions(
        &self,
        descriptor: &TableDescriptor,
        graph: &mut ConditionGraph,
    ) -> Result<()> {
        if !descriptor.is_hierarchical() {
            return Ok(());
        }
        let fields = &self.config.fields;
        tracing::debug!(table = %descriptor.name, "Adding hierarchical conditions");

        let root = graph.get_or_create_root(&descriptor.name);
        if root.setters.is_empty() {
            root.merge_setters(vec![Setter::literal(&fields.parent, "0")])?;
        }
        root.merge_filter(FilterExpression::equals(&fields.parent, 0))?;

        let condition = graph.get_or_create_parent_child(&descriptor.name, &descriptor.name);
        condition.merge_setters(vec![Setter::copy(&fields.parent, &fields.id)]);
        condition.merge_filter(FilterExpression::remote_equals(&fields.id, &fields.parent));

        Ok(())
    }

    fn add_parent_condition(
        &self,
        descriptor: &TableDescriptor,
        screen: &dyn InputScreen,
        graph: &mut ConditionGraph,
    ) -> Result<()> {
        if screen.is_standalone() {
            tracing::debug!(table = %descriptor.name, "Standalone table, no parent condition");
            return Ok(());
        }
        let parent = required_parent_table(screen)?;
        let fields = &self.config.fields;
        tracing::debug!(table = %descriptor.name, parent, "Adding parent condition");

        let condition = graph.get_or_create_parent_child(parent, &descriptor.name);
        condition.merge_setters(vec![Setter::copy(&fields.parent, &fields.id)]);
        condition.merge_filter(FilterExpression::remote_equals(&fields.id, &fields.parent));

        Ok(())
    }

    fn add_variant_conditions(
        &self,
        descriptor: &TableDescriptor,
        graph: &mut ConditionGraph,
    ) -> Result<()> {
        let fields = &self.config.fields;
        tracing::debug!(table = %descriptor.name, "Adding variant conditions");

        let root = graph.get_or_create_root(&descriptor.name);
        root.prepend_setters(vec![Setter::literal(&fields.variant_base, "1")])?;
        root.merge_filter(FilterExpression::equals(&fields.variant_base, 1))?;

        let condition = graph.get_or_create_parent_child(&descriptor.name, &descriptor.name);
        condition.merge_setters(vec![
            Setter::literal(&fields.variant_base, "0"),
            Setter::copy(&fields.variant_group, &fields.variant_group),
        ]);
        condition.merge_filter(
            FilterBuilder::new()
                .open_or_group()
                .and_remote_equals(&fields.variant_group, &fields.variant_group, false)
                .and_remote_equals(&fields.id, &fields.variant_group, false)
                .and_not_equals(&fields.variant_base, 0)
                .build(),
        );

        Ok(())
    }
}
