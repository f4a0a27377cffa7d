//! The public façade: one strategy, one validator, scalar and batch entry points.

use std::sync::Arc;

use tracing::debug;

use crate::batch::{
    ComponentBatch, ComponentTable, NameBatch, NamerInput, apply_defaults, apply_forced,
    scatter_components, scatter_names, strip_column_prefix,
};
use crate::components::Components;
use crate::error::{ComponentResult, NamerError, Result};
use crate::schema::{ComponentSchema, Value};
use crate::strategy::NamingStrategy;
use crate::validation::Validator;

/// Construction-time settings for a [`Namer`].
#[derive(Debug, Clone, Default)]
pub struct NamerConfig {
    /// Merged over caller input on every format call. Forced values win.
    pub forced_components: Components,
}

impl NamerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force one component.
    pub fn with_forced(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.forced_components.insert(key, value);
        self
    }
}

/// Per-call options for [`Namer::format_many_with`].
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Values used for every row; table cells win, null cells are filled.
    pub defaults: Components,
    /// Common prefix stripped from incoming column names.
    pub column_prefix: Option<String>,
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key, value);
        self
    }

    pub fn with_column_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.column_prefix = Some(prefix.into());
        self
    }
}

/// Formats components into names and parses names back, one at a time or
/// a whole column at a time.
///
/// Behavior across identifier formats varies only through the strategy a
/// namer is built from. Batch operations always return one slot per input
/// row, in input order; a bad row carries its error instead of a value.
///
/// ```
/// use namer::{components, dtid_namer};
///
/// let namer = dtid_namer().unwrap();
/// let name = namer
///     .format(&components! { "document_id" => "1234", "tabletype" => "some-org_2", "tnum" => 3 })
///     .unwrap();
/// assert_eq!(name, "1234/some-org_2/3");
/// assert_eq!(namer.parse(&name).unwrap().get_str("tnum"), Some("3"));
/// ```
#[derive(Debug, Clone)]
pub struct Namer {
    strategy: Arc<dyn NamingStrategy>,
    validator: Validator,
    config: NamerConfig,
}

impl Namer {
    /// Create a namer with default configuration.
    pub fn new(strategy: impl NamingStrategy + 'static) -> Self {
        Self::from_shared(Arc::new(strategy))
    }

    /// Create a namer around a strategy shared with other namers.
    pub fn from_shared(strategy: Arc<dyn NamingStrategy>) -> Self {
        let validator = Validator::new(strategy.schema().clone());
        Self {
            strategy,
            validator,
            config: NamerConfig::default(),
        }
    }

    /// Create a namer with custom configuration. Forced components must be
    /// declared fields.
    pub fn with_config(
        strategy: impl NamingStrategy + 'static,
        config: NamerConfig,
    ) -> Result<Self> {
        let mut namer = Self::new(strategy);
        if let Some(key) = config
            .forced_components
            .keys()
            .find(|k| !namer.schema().contains(k))
        {
            return Err(NamerError::InvalidSchema(format!(
                "forced component '{}' is not a declared field",
                key
            )));
        }
        namer.config = config;
        Ok(namer)
    }

    pub fn schema(&self) -> &ComponentSchema {
        self.strategy.schema()
    }

    pub fn strategy(&self) -> &Arc<dyn NamingStrategy> {
        &self.strategy
    }

    pub fn config(&self) -> &NamerConfig {
        &self.config
    }

    // ========================================================================
    // Scalar
    // ========================================================================

    /// Validate one mapping and render it.
    pub fn format(&self, components: &Components) -> ComponentResult<String> {
        let merged = if self.config.forced_components.is_empty() {
            components.clone()
        } else {
            components.merged(&self.config.forced_components)
        };
        let completed = self.strategy.complete(merged);
        let valid = self.validator.validate(&completed)?;
        self.strategy.encode_one(&valid)
    }

    /// Decode one name and validate the result.
    pub fn parse(&self, name: &str) -> ComponentResult<Components> {
        let raw = self.strategy.decode_one(name)?;
        self.validator.validate(&raw)
    }

    /// Parse `name`, lay `changes` over its components and format the result.
    pub fn rename(&self, name: &str, changes: &Components) -> ComponentResult<String> {
        let current = self.parse(name)?;
        self.format(&current.merged(changes))
    }

    /// Route an input to the operation matching its shape.
    pub fn convert<I: NamerInput>(&self, input: I) -> I::Output {
        input.convert_with(self)
    }

    // ========================================================================
    // Batch
    // ========================================================================

    /// Format every row of a table.
    pub fn format_many(&self, table: &ComponentTable) -> NameBatch {
        self.format_many_with(table, &FormatOptions::default())
    }

    /// Format every row of a table, after stripping the column prefix and
    /// filling defaults. Only rows that pass validation reach the strategy.
    pub fn format_many_with(&self, table: &ComponentTable, options: &FormatOptions) -> NameBatch {
        let total = table.row_count();

        let mut prepared = table.clone();
        if let Some(prefix) = &options.column_prefix {
            strip_column_prefix(&mut prepared, prefix, self.schema());
        }
        apply_defaults(&mut prepared, &options.defaults);
        apply_forced(&mut prepared, &self.config.forced_components);
        let prepared = self.strategy.complete_many(prepared);

        let validated = self.validator.validate_batch(&prepared);
        let positions = validated.valid_rows();
        let (valid, errors) = validated.into_parts();
        let subset = if positions.len() == total {
            valid
        } else {
            valid.take_rows(&positions)
        };

        let encoded = self.strategy.encode_many(&subset);
        let batch = scatter_names(total, &positions, encoded, errors);
        debug!(rows = total, invalid = batch.invalid_count(), "formatted batch");
        batch
    }

    /// Parse every name. Rows that fail to decode are not validated.
    pub fn parse_many<S: AsRef<str>>(&self, names: &[S]) -> ComponentBatch {
        let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        let total = names.len();

        let decoded = self.strategy.decode_many(&names);
        let positions = decoded.valid_rows();
        let (table, errors) = decoded.into_parts();
        let subset = if positions.len() == total {
            table
        } else {
            table.take_rows(&positions)
        };

        let validated = self.validator.validate_batch(&subset);
        let batch = scatter_components(total, &positions, validated, errors);
        debug!(rows = total, invalid = batch.invalid_count(), "parsed batch");
        batch
    }
}
