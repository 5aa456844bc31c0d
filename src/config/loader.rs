use super::{get_global_config_dir, AggregatorConfig};
use crate::error::helpers::config_not_found;
use crate::error::{AggregationError, ErrorCode, ErrorExt, Result};
use std::fs;
use std::path::Path;
use toml::{Table, Value};
use tracing::debug;

/// Layers configuration sources over the defaults
///
/// Later layers win: global file, explicit file, then environment. File
/// layers merge key by key, nested tables included, so a later file only
/// overrides the keys it sets.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    layers: Table,
    apply_env: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `config.toml` from the global config directory when present
    pub fn load_global(self) -> Result<Self> {
        match get_global_config_dir() {
            Some(dir) => self.load_optional(&dir.join("config.toml")),
            None => Ok(self),
        }
    }

    fn load_optional(self, path: &Path) -> Result<Self> {
        if path.exists() {
            self.load_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merge the file at `path` over the layers loaded so far
    pub fn load_file(mut self, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(config_not_found(path));
        }

        let content = fs::read_to_string(path)
            .to_config_error(format!("Failed to read {}", path.display()))?;
        let layer = parse_layer(&content)
            .and_then(|layer| table_to_config(layer.clone()).map(|_| layer))
            .map_err(|e| e.with_context(path.display()))?;
        merge_tables(&mut self.layers, layer);

        debug!("Loaded configuration from {}", path.display());
        Ok(self)
    }

    /// Apply `DEMANDFLOW_*` overrides on top of the file layers
    pub fn with_env(mut self) -> Self {
        self.apply_env = true;
        self
    }

    /// Validate and return the layered configuration
    pub fn build(self) -> Result<AggregatorConfig> {
        let mut config = table_to_config(self.layers)?;
        if self.apply_env {
            config.merge_env_vars()?;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn parse_config(content: &str) -> Result<AggregatorConfig> {
    parse_layer(content).and_then(table_to_config)
}

fn parse_layer(content: &str) -> Result<Table> {
    toml::from_str::<Table>(content).map_err(|e| {
        AggregationError::config_with_code(ErrorCode::CONFIG_INVALID_TOML, e.to_string())
            .with_source(e)
    })
}

fn table_to_config(table: Table) -> Result<AggregatorConfig> {
    Value::Table(table).try_into().map_err(|e: toml::de::Error| {
        AggregationError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, e.to_string())
            .with_source(e)
    })
}

fn merge_tables(base: &mut Table, layer: Table) {
    for (key, value) in layer {
        let replacement = match (base.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                merge_tables(existing, incoming);
                None
            }
            (_, value) => Some(value),
        };
        if let Some(value) = replacement {
            base.insert(key, value);
        }
    }
}
