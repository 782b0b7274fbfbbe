//! Pagination configuration
//!
//! Holds the knobs that the distilled Relay arguments do not carry: the
//! default page size, the default sort order, the cursor decode policy and
//! the table metadata used to register tables with an engine.
//!
//! Configuration can be built in code or loaded from YAML/JSON:
//!
//! ```yaml
//! default_limit: 50
//! default_order: DESC
//! strict_cursors: true
//! tables:
//!   - table: tasks
//!     columns: [id, name, created_at]
//!     primary_key: [id]
//!     create_date_column: created_at
//!     indexes:
//!       - [created_at, id]
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::query::TableMetadata;
use crate::types::QueryOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page size applied when neither `first` nor `last` is given
pub const DEFAULT_LIMIT: u32 = 20;

/// Configuration shared by every pagination request built from a factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size when the request sets neither `first` nor `last`
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Sort order when neither the request nor the base query sets one
    #[serde(default)]
    pub default_order: QueryOrder,

    /// Whether one-shot `paginate` calls run the count queries
    #[serde(default = "default_true")]
    pub calculate_total_count: bool,

    /// Reject malformed cursor envelopes instead of degrading to an id-only cursor
    #[serde(default)]
    pub strict_cursors: bool,

    /// Log a warning when the cursor fields are not covered by an index
    #[serde(default = "default_true")]
    pub warn_unindexed: bool,

    /// Table metadata to register with an engine
    #[serde(default)]
    pub tables: Vec<TableMetadata>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_true() -> bool {
    true
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            default_order: QueryOrder::default(),
            calculate_total_count: true,
            strict_cursors: false,
            warn_unindexed: true,
            tables: Vec::new(),
        }
    }
}

impl PaginationConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => Err(Error::config(format!(
                "Unsupported config file extension: '{}'",
                path.display()
            ))),
        }
    }

    /// Set the default page size
    #[must_use]
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the default sort order
    #[must_use]
    pub fn with_default_order(mut self, order: QueryOrder) -> Self {
        self.default_order = order;
        self
    }

    /// Select the strict cursor decode policy
    #[must_use]
    pub fn with_strict_cursors(mut self, strict: bool) -> Self {
        self.strict_cursors = strict;
        self
    }

    /// Toggle count queries for one-shot pagination
    #[must_use]
    pub fn with_total_count(mut self, enabled: bool) -> Self {
        self.calculate_total_count = enabled;
        self
    }

    /// Add table metadata
    #[must_use]
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables.push(table);
        self
    }

    /// Look up table metadata by name
    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// Check the config for values that can never work
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(Error::config("default_limit must be greater than zero"));
        }
        for table in &self.tables {
            table.validate()?;
        }
        Ok(())
    }
}
