//! Builds the default palette of an input screen

use crate::config::ResolverConfig;
use crate::error::RelationshipError;
use crate::screen::InputScreen;
use crate::types::{FieldInfo, TableDescriptor};

use super::predicate::{PropertyCondition, PropertyConditionChain};
use super::{DEFAULT_PALETTE_NAME, Legend, Palette, PaletteProperty};

/// Result of a palette build
///
/// Missing field references do not abort the build; they are skipped and
/// reported in `warnings`.
#[derive(Debug)]
pub struct PaletteOutcome {
    pub palette: Palette,
    pub warnings: Vec<RelationshipError>,
}

/// Assembles per-field predicate chains for a palette
#[derive(Debug, Clone, Default)]
pub struct PaletteBuilder {
    config: ResolverConfig,
}

impl PaletteBuilder {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Editable chain: not readonly, and on variant tables a non-variant
    /// attribute is only editable on the base row
    pub fn editable_chain(
        &self,
        info: &FieldInfo,
        has_variants: bool,
        attribute_is_variant: bool,
    ) -> PropertyConditionChain {
        let mut chain =
            PropertyConditionChain::new().with(PropertyCondition::static_bool(!info.readonly));
        if has_variants && !attribute_is_variant {
            chain.push(PropertyCondition::field_equals(
                &self.config.fields.variant_base,
                1,
            ));
        }
        chain
    }

    /// Visible chain: not hidden, and on variant tables subject to the
    /// per-row variant check for this attribute
    pub fn visible_chain(&self, info: &FieldInfo, has_variants: bool) -> PropertyConditionChain {
        let mut chain =
            PropertyConditionChain::new().with(PropertyCondition::static_bool(!info.is_hidden()));
        if has_variants {
            chain.push(PropertyCondition::is_variant_attribute(info.is_variant));
        }
        chain
    }

    pub fn build(&self, descriptor: &TableDescriptor, screen: &dyn InputScreen) -> PaletteOutcome {
        let has_variants = descriptor.supports_variants;
        let mut palette = Palette::new(DEFAULT_PALETTE_NAME);
        let mut warnings = Vec::new();

        for definition in screen.legends() {
            let mut legend = Legend::new(&definition.name, definition.visible);

            for name in &definition.properties {
                let Some(info) = screen.property(name) else {
                    tracing::warn!(
                        table = %descriptor.name,
                        legend = %definition.name,
                        field = %name,
                        "Palette references unknown field, skipping"
                    );
                    warnings.push(RelationshipError::missing_field(&definition.name, name));
                    continue;
                };

                legend.properties.push(PaletteProperty::new(
                    name,
                    self.editable_chain(info, has_variants, info.is_variant),
                    self.visible_chain(info, has_variants),
                ));

                for dependent in &info.subpalette {
                    legend
                        .properties
                        .push(PaletteProperty::dependent(dependent, name));
                }
            }

            palette.legends.push(legend);
        }

        tracing::debug!(
            table = %descriptor.name,
            legends = palette.legends.len(),
            warnings = warnings.len(),
            "Built palette"
        );
        PaletteOutcome { palette, warnings }
    }
}
