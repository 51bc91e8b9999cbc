//! Mapper configuration.

/// Reserved document key holding an entity's identity.
pub const DEFAULT_IDENTITY_FIELD: &str = "_id";

/// What to do with document fields that match no declared property.
///
/// Unknown fields are never an error; the policy only picks the log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFieldPolicy {
    /// Log each skipped field at `warn` level.
    #[default]
    Warn,
    /// Log each skipped field at `debug` level.
    Ignore,
}

/// Configuration for an [`ObjectMapper`](crate::ObjectMapper).
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Document key treated as the entity identity.
    pub identity_field: String,

    /// Handling of fields with no matching property.
    pub unknown_fields: UnknownFieldPolicy,

    /// Whether absent optional properties are written as `null`.
    ///
    /// When false they are left out of the document.
    pub write_nulls: bool,

    /// Maximum nesting depth of a single conversion.
    pub max_depth: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            unknown_fields: UnknownFieldPolicy::Warn,
            write_nulls: true,
            max_depth: 64,
        }
    }
}

impl MapperConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the identity field name.
    #[must_use]
    pub fn identity_field(mut self, name: impl Into<String>) -> Self {
        self.identity_field = name.into();
        self
    }

    /// Sets the unknown-field policy.
    #[must_use]
    pub const fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Sets whether absent optional properties are written as `null`.
    #[must_use]
    pub const fn write_nulls(mut self, value: bool) -> Self {
        self.write_nulls = value;
        self
    }

    /// Sets the maximum conversion depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MapperConfig::default();
        assert_eq!(config.identity_field, "_id");
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Warn);
        assert!(config.write_nulls);
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn builder_pattern() {
        let config = MapperConfig::new()
            .identity_field("id")
            .unknown_fields(UnknownFieldPolicy::Ignore)
            .write_nulls(false)
            .max_depth(8);

        assert_eq!(config.identity_field, "id");
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Ignore);
        assert!(!config.write_nulls);
        assert_eq!(config.max_depth, 8);
    }
}
