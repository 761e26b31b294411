//! Core type definitions for relationship resolution
//!
//! Includes view modes, table descriptors, field info and legend definitions.

use serde::{Deserialize, Serialize};

use crate::error::{RelationshipError, Result};
use crate::sanitize::validate_identifier;

// ============================================================================
// View Mode
// ============================================================================

/// How rows of a table are listed and related to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Plain list, optionally sorted
    #[default]
    Flat,
    /// Child rows of one parent record
    ParentedList,
    /// Rows arranged as a tree through the parent link
    Hierarchical,
}

impl ViewMode {
    /// Map a numeric sorting mode to a view mode
    ///
    /// - 0: not sorted
    /// - 1: sorted by a fixed field
    /// - 2: sorted by a switchable field
    /// - 3: sorted by the parent table
    /// - 4: child records of a parent record
    /// - 5: tree
    /// - 6: child records within a tree
    pub fn from_sorting_mode(mode: u8) -> Result<Self> {
        match mode {
            0..=3 => Ok(ViewMode::Flat),
            4 => Ok(ViewMode::ParentedList),
            5 | 6 => Ok(ViewMode::Hierarchical),
            other => Err(RelationshipError::validation(format!(
                "Unknown sorting mode: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// Table Descriptor
// ============================================================================

/// One logical record collection, as seen by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Unique table name
    pub name: String,
    /// Parent table, set iff the table is not standalone
    #[serde(rename = "parentName", skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    /// View mode
    #[serde(default)]
    pub mode: ViewMode,
    /// Whether rows may have variants
    #[serde(rename = "supportsVariants", default)]
    pub supports_variants: bool,
    /// Whether new root records may not be created
    #[serde(default)]
    pub closed: bool,
}

impl TableDescriptor {
    /// Create a standalone, flat descriptor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_name: None,
            mode: ViewMode::Flat,
            supports_variants: false,
            closed: false,
        }
    }

    /// Set the parent table
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }

    /// Set the view mode
    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable variant support
    pub fn with_variants(mut self) -> Self {
        self.supports_variants = true;
        self
    }

    /// Mark the table as closed
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn is_standalone(&self) -> bool {
        self.parent_name.is_none()
    }

    pub fn is_hierarchical(&self) -> bool {
        self.mode == ViewMode::Hierarchical
    }

    /// Validate the table and parent table names
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.name).map_err(RelationshipError::validation)?;
        if let Some(parent) = &self.parent_name {
            validate_identifier(parent).map_err(RelationshipError::validation)?;
        }
        Ok(())
    }
}

// ============================================================================
// Field and Legend Definitions
// ============================================================================

/// Per-field flags read from the input screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    #[serde(default)]
    pub readonly: bool,
    #[serde(rename = "doNotShow", default)]
    pub do_not_show: bool,
    #[serde(rename = "hideInput", default)]
    pub hide_input: bool,
    /// Whether the attribute may differ between variants of a record
    #[serde(rename = "isvariant", default)]
    pub is_variant: bool,
    /// Dependent fields shown while this field is truthy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subpalette: Vec<String>,
}

impl FieldInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn do_not_show(mut self) -> Self {
        self.do_not_show = true;
        self
    }

    pub fn hide_input(mut self) -> Self {
        self.hide_input = true;
        self
    }

    pub fn variant(mut self) -> Self {
        self.is_variant = true;
        self
    }

    pub fn with_subpalette(mut self, fields: Vec<String>) -> Self {
        self.subpalette = fields;
        self
    }

    /// Whether the field is hidden regardless of row state
    pub fn is_hidden(&self) -> bool {
        self.do_not_show || self.hide_input
    }
}

fn default_visible() -> bool {
    true
}

/// A named form section and its ordered fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendDefinition {
    pub name: String,
    /// Whether the section starts expanded (default: true)
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub properties: Vec<String>,
}

impl LegendDefinition {
    pub fn new(name: impl Into<String>, properties: Vec<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            properties,
        }
    }

    /// Start the section collapsed
    pub fn collapsed(mut self) -> Self {
        self.visible = false;
        self
    }
}
