//! # table-relations
//!
//! Relationship resolution for tables backing data-entry screens.
//!
//! Given a table descriptor and its input-screen definition, this crate
//! derives how rows of the table relate to rows of other tables (or to rows
//! of the same table) and merges those relationships into a condition graph
//! that may already hold manual customizations.
//!
//! ## Features
//!
//! - **Root Conditions**: Which rows have no parent, and how new root rows are populated
//! - **Parent-Child Conditions**: Filters selecting the children of a row, plus setters linking new children
//! - **Variants**: Base rows with variant rows grouped by a shared group field
//! - **Non-Destructive Merging**: Setters are appended and filters conjoined, so existing conditions survive
//! - **Palettes**: Edit and visibility predicates per field, evaluated against the current row
//!
//! ## Quick Start
//!
//! ```rust
//! use table_relations::{
//!     ConditionGraph, InputScreenDefinition, RelationshipResolver, TableDescriptor, ViewMode,
//! };
//!
//! let screen = InputScreenDefinition::from_json(r#"{"parentTable": "mm_categories"}"#)?;
//! let descriptor = TableDescriptor::new("mm_products").with_mode(ViewMode::ParentedList);
//!
//! let mut graph = ConditionGraph::new();
//! RelationshipResolver::default().resolve(&descriptor, &screen, &mut graph)?;
//!
//! let condition = graph.parent_child("mm_categories", "mm_products").unwrap();
//! assert_eq!(condition.setters.len(), 1);
//! # Ok::<(), table_relations::RelationshipError>(())
//! ```
//!
//! ## Configuration
//!
//! The names of the linking fields are configured with `ResolverConfig`:
//!
//! ```rust
//! use table_relations::ResolverConfig;
//!
//! let config = ResolverConfig::builder()
//!     .parent_field("pid")            // Parent link (default)
//!     .id_field("id")                 // Row id (default)
//!     .variant_base_field("varbase")  // Base row flag (default)
//!     .variant_group_field("vargroup")
//!     .validate_identifiers(true)     // Opt-in table name check
//!     .build();
//! ```

pub mod action;
pub mod condition;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod palette;
pub mod resolver;
pub mod sanitize;
pub mod screen;
pub mod types;

// Re-export main types for convenience
pub use action::ModelAction;
pub use condition::{ParentChildCondition, RootCondition, Setter, SetterSource};
pub use config::{RelationFields, ResolverConfig, ResolverConfigBuilder};
pub use error::{RelationshipError, Result};
pub use filter::{FilterBuilder, FilterExpression, Row};
pub use graph::ConditionGraph;
pub use palette::{
    Legend, Palette, PaletteBuilder, PaletteOutcome, PaletteProperty, PredicateContext,
    PropertyCondition, PropertyConditionChain, RenderModeCache, RenderModeLookup,
};
pub use resolver::RelationshipResolver;
pub use sanitize::validate_identifier;
pub use screen::{InputScreen, InputScreenDefinition};
pub use types::{FieldInfo, LegendDefinition, TableDescriptor, ViewMode};
