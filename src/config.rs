//! Configuration for the resolver and palette builder
//!
//! Provides a builder pattern for naming the linking fields.

/// Default name of the field linking a child row to its parent
pub const DEFAULT_PARENT_FIELD: &str = "pid";
/// Default name of the primary key field
pub const DEFAULT_ID_FIELD: &str = "id";
/// Default name of the flag marking a row as the base of its variant group
pub const DEFAULT_VARIANT_BASE_FIELD: &str = "varbase";
/// Default name of the field holding the variant group id
pub const DEFAULT_VARIANT_GROUP_FIELD: &str = "vargroup";

/// Names of the fields conditions are built over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationFields {
    /// Parent link (`pid`)
    pub parent: String,
    /// Primary key (`id`)
    pub id: String,
    /// Variant base flag (`varbase`)
    pub variant_base: String,
    /// Variant group id (`vargroup`)
    pub variant_group: String,
}

impl Default for RelationFields {
    fn default() -> Self {
        Self {
            parent: DEFAULT_PARENT_FIELD.to_string(),
            id: DEFAULT_ID_FIELD.to_string(),
            variant_base: DEFAULT_VARIANT_BASE_FIELD.to_string(),
            variant_group: DEFAULT_VARIANT_GROUP_FIELD.to_string(),
        }
    }
}

/// Configuration shared by the relationship resolver and the palette builder
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Linking field names
    pub fields: RelationFields,
    /// Whether table names are validated before resolution (default: false)
    pub validate_identifiers: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfigBuilder::new().build()
    }
}

impl ResolverConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::new()
    }
}

/// Builder for ResolverConfig
#[derive(Debug)]
pub struct ResolverConfigBuilder {
    fields: RelationFields,
    validate_identifiers: bool,
}

impl Default for ResolverConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverConfigBuilder {
    /// Create a new builder with the default field names
    pub fn new() -> Self {
        Self {
            fields: RelationFields::default(),
            validate_identifiers: false,
        }
    }

    /// Set the parent link field name (default: "pid")
    pub fn parent_field(mut self, name: impl Into<String>) -> Self {
        self.fields.parent = name.into();
        self
    }

    /// Set the primary key field name (default: "id")
    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.fields.id = name.into();
        self
    }

    /// Set the variant base flag field name (default: "varbase")
    pub fn variant_base_field(mut self, name: impl Into<String>) -> Self {
        self.fields.variant_base = name.into();
        self
    }

    /// Set the variant group field name (default: "vargroup")
    pub fn variant_group_field(mut self, name: impl Into<String>) -> Self {
        self.fields.variant_group = name.into();
        self
    }

    /// Enable or disable table name validation (default: false)
    pub fn validate_identifiers(mut self, enabled: bool) -> Self {
        self.validate_identifiers = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ResolverConfig {
        ResolverConfig {
            fields: self.fields,
            validate_identifiers: self.validate_identifiers,
        }
    }
}
