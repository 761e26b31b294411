//! Property predicates and their evaluation
//!
//! A `PropertyConditionChain` is an AND over `PropertyCondition`s, evaluated
//! per row through a `PredicateContext`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{DEFAULT_PARENT_FIELD, DEFAULT_VARIANT_BASE_FIELD, RelationFields};
use crate::filter::{Row, is_truthy, json_value_to_string, values_equal};

/// One boolean predicate on a palette property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyCondition {
    /// Fixed outcome
    StaticBool { value: bool },
    /// Row value of `field` loosely equals `value`
    FieldEquals { field: String, value: Value },
    /// The attribute may be shown on the current row's variant state;
    /// `is_variant` is the attribute's own variant capability
    IsVariantAttribute {
        #[serde(default)]
        is_variant: bool,
    },
    /// The parent screen of the row renders in `mode`
    ///
    /// Never produced by `PaletteBuilder`; hosts append it to a chain
    /// themselves and supply a `RenderModeCache` through the context.
    RenderModeIs { mode: String },
}

impl PropertyCondition {
    pub fn static_bool(value: bool) -> Self {
        PropertyCondition::StaticBool { value }
    }

    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        PropertyCondition::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Variant check for an attribute that is (or is not) variant-capable
    pub fn is_variant_attribute(is_variant: bool) -> Self {
        PropertyCondition::IsVariantAttribute { is_variant }
    }

    pub fn render_mode_is(mode: impl Into<String>) -> Self {
        PropertyCondition::RenderModeIs { mode: mode.into() }
    }

    pub fn matches(&self, ctx: &PredicateContext<'_>) -> bool {
        match self {
            PropertyCondition::StaticBool { value } => *value,
            PropertyCondition::FieldEquals { field, value } => {
                values_equal(ctx.value(field).unwrap_or(&Value::Null), value)
            }
            PropertyCondition::IsVariantAttribute { is_variant } => match ctx.model {
                // New rows and base rows show every attribute
                None => true,
                Some(model) => {
                    *is_variant
                        || model
                            .get(ctx.variant_base_field)
                            .is_some_and(is_truthy)
                }
            },
            PropertyCondition::RenderModeIs { mode } => {
                let (Some(cache), Some(screen_id)) = (ctx.render_modes, ctx.value(ctx.parent_field))
                else {
                    return false;
                };
                cache.render_mode(screen_id).as_deref() == Some(mode.as_str())
            }
        }
    }
}

/// Ordered predicates combined with short-circuit AND
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyConditionChain {
    conditions: Vec<PropertyCondition>,
}

impl PropertyConditionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: PropertyCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: PropertyCondition) {
        self.conditions.push(condition);
    }

    pub fn conditions(&self) -> &[PropertyCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// An empty chain matches
    pub fn matches(&self, ctx: &PredicateContext<'_>) -> bool {
        self.conditions.iter().all(|c| c.matches(ctx))
    }
}

// ============================================================================
// Evaluation context
// ============================================================================

/// Row state a chain is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct PredicateContext<'a> {
    /// Stored row, `None` while creating a new one
    model: Option<&'a Row>,
    /// Submitted values, consulted before the stored row
    input: Option<&'a Row>,
    variant_base_field: &'a str,
    parent_field: &'a str,
    render_modes: Option<&'a RenderModeCache>,
}

impl Default for PredicateContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PredicateContext<'a> {
    pub fn new() -> Self {
        Self {
            model: None,
            input: None,
            variant_base_field: DEFAULT_VARIANT_BASE_FIELD,
            parent_field: DEFAULT_PARENT_FIELD,
            render_modes: None,
        }
    }

    pub fn with_model(mut self, model: &'a Row) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_input(mut self, input: &'a Row) -> Self {
        self.input = Some(input);
        self
    }

    /// Use non-default linking field names
    pub fn with_fields(mut self, fields: &'a RelationFields) -> Self {
        self.variant_base_field = &fields.variant_base;
        self.parent_field = &fields.parent;
        self
    }

    pub fn with_render_modes(mut self, cache: &'a RenderModeCache) -> Self {
        self.render_modes = Some(cache);
        self
    }

    /// Value of `field`, from the submitted input first, then the stored row
    pub fn value(&self, field: &str) -> Option<&'a Value> {
        self.input
            .and_then(|input| input.get(field))
            .or_else(|| self.model.and_then(|model| model.get(field)))
    }
}

// ============================================================================
// Render mode cache
// ============================================================================

/// Source of input screen render modes, keyed by screen id
pub trait RenderModeLookup {
    fn render_mode(&self, screen_id: &str) -> Option<String>;
}

impl RenderModeLookup for HashMap<String, String> {
    fn render_mode(&self, screen_id: &str) -> Option<String> {
        self.get(screen_id).cloned()
    }
}

impl RenderModeLookup for BTreeMap<String, String> {
    fn render_mode(&self, screen_id: &str) -> Option<String> {
        self.get(screen_id).cloned()
    }
}

/// Memoizes render mode lookups for the lifetime of the cache
///
/// Misses are cached too, so each screen id hits the lookup at most once.
pub struct RenderModeCache {
    lookup: Box<dyn RenderModeLookup>,
    resolved: RefCell<HashMap<String, Option<String>>>,
}

impl RenderModeCache {
    pub fn new(lookup: impl RenderModeLookup + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            resolved: RefCell::new(HashMap::new()),
        }
    }

    pub fn render_mode(&self, screen_id: &Value) -> Option<String> {
        let key = json_value_to_string(screen_id);
        let cached = self.resolved.borrow().get(&key).cloned();
        if let Some(mode) = cached {
            return mode;
        }

        let mode = self.lookup.render_mode(&key);
        self.resolved.borrow_mut().insert(key, mode.clone());
        mode
    }

    /// Number of memoized screen ids
    pub fn len(&self) -> usize {
        self.resolved.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.resolved.borrow_mut().clear();
    }
}

impl fmt::Debug for RenderModeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderModeCache")
            .field("resolved", &self.resolved.borrow().len())
            .finish_non_exhaustive()
    }
}
