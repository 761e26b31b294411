//! Input screen configuration consumed by the resolver and palette builder
//!
//! `InputScreen` is the read-only view the build pass needs of a screen;
//! `InputScreenDefinition` is a serde-loadable implementation of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RelationshipError, Result};
use crate::types::{FieldInfo, LegendDefinition, TableDescriptor, ViewMode};

/// Read-only screen configuration, resolved once per build pass
pub trait InputScreen {
    /// Whether the table has no parent table
    fn is_standalone(&self) -> bool;

    /// Parent table name, `None` when standalone
    fn parent_table(&self) -> Option<&str>;

    /// Form sections in display order
    fn legends(&self) -> &[LegendDefinition];

    /// Flags of a single field
    fn property(&self, name: &str) -> Option<&FieldInfo>;
}

/// Screen configuration as stored by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScreenDefinition {
    /// Parent table; absent or empty for standalone screens
    #[serde(rename = "parentTable", default, skip_serializing_if = "Option::is_none")]
    pub parent_table: Option<String>,
    /// Numeric sorting mode (see `ViewMode::from_sorting_mode`)
    #[serde(default)]
    pub mode: u8,
    /// Whether new records may not be created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(default)]
    pub legends: Vec<LegendDefinition>,
    #[serde(default)]
    pub properties: BTreeMap<String, FieldInfo>,
}

impl InputScreenDefinition {
    /// Create an empty standalone screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a screen from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the parent table
    pub fn with_parent_table(mut self, parent: impl Into<String>) -> Self {
        self.parent_table = Some(parent.into());
        self
    }

    /// Set the numeric sorting mode
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Set the closed flag
    pub fn with_closed(mut self, closed: bool) -> Self {
        self.closed = Some(closed);
        self
    }

    /// Append a legend
    pub fn with_legend(mut self, legend: LegendDefinition) -> Self {
        self.legends.push(legend);
        self
    }

    /// Add or replace a field
    pub fn with_property(mut self, name: impl Into<String>, info: FieldInfo) -> Self {
        self.properties.insert(name.into(), info);
        self
    }

    /// Derive the descriptor of the table this screen edits
    pub fn table_descriptor(
        &self,
        name: impl Into<String>,
        supports_variants: bool,
    ) -> Result<TableDescriptor> {
        let mode = ViewMode::from_sorting_mode(self.mode)?;
        Ok(TableDescriptor {
            name: name.into(),
            parent_name: InputScreen::parent_table(self).map(str::to_string),
            mode,
            supports_variants,
            closed: self.closed.unwrap_or(false),
        })
    }
}

impl InputScreen for InputScreenDefinition {
    fn is_standalone(&self) -> bool {
        InputScreen::parent_table(self).is_none()
    }

    fn parent_table(&self) -> Option<&str> {
        self.parent_table.as_deref().filter(|p| !p.is_empty())
    }

    fn legends(&self) -> &[LegendDefinition] {
        &self.legends
    }

    fn property(&self, name: &str) -> Option<&FieldInfo> {
        self.properties.get(name)
    }
}

/// Parent table of a non-standalone screen
pub(crate) fn required_parent_table(screen: &dyn InputScreen) -> Result<&str> {
    screen.parent_table().ok_or_else(|| {
        RelationshipError::validation("Screen is not standalone but names no parent table")
    })
}
