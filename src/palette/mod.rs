//! Palettes: form sections with per-field edit and visibility predicates
//!
//! The builder assembles the predicate chains; evaluating them per row is
//! left to the rendering layer through `PredicateContext`.

pub mod builder;
pub mod predicate;

use serde::{Deserialize, Serialize};

pub use builder::{PaletteBuilder, PaletteOutcome};
pub use predicate::{
    PredicateContext, PropertyCondition, PropertyConditionChain, RenderModeCache,
    RenderModeLookup,
};

/// Name of the palette built from an input screen
pub const DEFAULT_PALETTE_NAME: &str = "default";

/// A field placed in a palette section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteProperty {
    pub name: String,
    pub editable: PropertyConditionChain,
    pub visible: PropertyConditionChain,
}

impl PaletteProperty {
    pub fn new(
        name: impl Into<String>,
        editable: PropertyConditionChain,
        visible: PropertyConditionChain,
    ) -> Self {
        Self {
            name: name.into(),
            editable,
            visible,
        }
    }

    /// A sub-palette field, visible while `parent_field` is truthy
    pub fn dependent(name: impl Into<String>, parent_field: impl Into<String>) -> Self {
        Self::new(
            name,
            PropertyConditionChain::new(),
            PropertyConditionChain::new()
                .with(PropertyCondition::field_equals(parent_field, true)),
        )
    }

    pub fn is_editable(&self, ctx: &PredicateContext<'_>) -> bool {
        self.editable.matches(ctx)
    }

    pub fn is_visible(&self, ctx: &PredicateContext<'_>) -> bool {
        self.visible.matches(ctx)
    }
}

/// A palette section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub name: String,
    pub initially_visible: bool,
    pub properties: Vec<PaletteProperty>,
}

impl Legend {
    pub fn new(name: impl Into<String>, initially_visible: bool) -> Self {
        Self {
            name: name.into(),
            initially_visible,
            properties: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PaletteProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub legends: Vec<Legend>,
}

impl Palette {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            legends: Vec::new(),
        }
    }

    pub fn legend(&self, name: &str) -> Option<&Legend> {
        self.legends.iter().find(|l| l.name == name)
    }

    /// First property named `name`, in legend order
    pub fn property(&self, name: &str) -> Option<&PaletteProperty> {
        self.legends.iter().find_map(|l| l.property(name))
    }
}
