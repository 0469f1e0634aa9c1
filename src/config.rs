//! # Pipeline Configuration
//!
//! Defaults overlaid by an optional configuration file and by environment
//! variables. The harness loads this once per process and uses it to build
//! the store, the event channel and the pipeline wiring.

use crate::error::ConfigurationError;
use crate::pipeline::identity::OrderIdStrategy;
use crate::pipeline::orchestrator::IngestStages;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// PostgreSQL truncates identifiers beyond this length
const MAX_TABLE_NAME_LENGTH: usize = 63;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub environment: String,
    pub database_url: String,
    pub table_name: String,
    pub max_connections: u32,
    pub order_id_strategy: OrderIdStrategy,
    pub ingest_stages: IngestStages,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            database_url: "postgresql://localhost/order_pipeline_development".to_string(),
            table_name: "orders".to_string(),
            max_connections: 5,
            order_id_strategy: OrderIdStrategy::Random,
            ingest_stages: IngestStages::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with the flat environment variables the runtime sets
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then an optional file, then `ORDER_PIPELINE__*` variables,
    /// then the flat variables of [`PipelineConfig::from_env`]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        Self::load_with_vars(path, std::env::vars().collect())
    }

    /// [`PipelineConfig::load`] against an explicit variable set instead of the process environment
    pub fn load_with_vars(
        path: Option<&Path>,
        vars: config::Map<String, String>,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading pipeline configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let mut config: Self = builder
            .add_source(
                config::Environment::with_prefix("ORDER_PIPELINE")
                    .prefix_separator("__")
                    .separator("__")
                    .source(Some(vars.clone())),
            )
            .build()?
            .try_deserialize()?;

        config.apply_env(|key| vars.get(key).cloned())?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigurationError> {
        if let Some(environment) = lookup("ORDER_PIPELINE_ENV").or_else(|| lookup("APP_ENV")) {
            self.environment = environment;
        }

        if let Some(db_url) = lookup("DATABASE_URL") {
            self.database_url = db_url;
        }

        if let Some(table_name) = lookup("TABLE_NAME") {
            self.table_name = table_name;
        }

        if let Some(max_connections) = lookup("ORDER_PIPELINE_MAX_CONNECTIONS") {
            self.max_connections = max_connections.parse().map_err(|e| {
                ConfigurationError::invalid_value(
                    "max_connections",
                    max_connections.clone(),
                    format!("{e}"),
                )
            })?;
        }

        if let Some(strategy) = lookup("ORDER_PIPELINE_ORDER_ID_STRATEGY") {
            self.order_id_strategy = strategy.parse().map_err(|e: String| {
                ConfigurationError::invalid_value("order_id_strategy", strategy.clone(), e)
            })?;
        }

        if let Some(validate) = lookup("ORDER_PIPELINE_VALIDATE") {
            self.ingest_stages.validate = parse_flag("ingest_stages.validate", &validate)?;
        }

        if let Some(enrich) = lookup("ORDER_PIPELINE_ENRICH") {
            self.ingest_stages.enrich = parse_flag("ingest_stages.enrich", &enrich)?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "database_url",
                "",
                "must not be empty",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_connections",
                "0",
                "must be at least 1",
            ));
        }

        if !is_sql_identifier(&self.table_name) {
            return Err(ConfigurationError::invalid_value(
                "table_name",
                self.table_name.clone(),
                "must match [A-Za-z_][A-Za-z0-9_]* and be at most 63 characters",
            ));
        }

        Ok(())
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, ConfigurationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigurationError::invalid_value(
            field,
            value,
            "expected a boolean",
        )),
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    name.len() <= MAX_TABLE_NAME_LENGTH && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn apply(vars: &[(&str, &str)]) -> Result<PipelineConfig, ConfigurationError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = PipelineConfig::default();
        config.apply_env(|key| vars.get(key).cloned())?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.table_name, "orders");
        assert_eq!(config.order_id_strategy, OrderIdStrategy::Random);
        assert!(config.ingest_stages.validate);
        assert!(config.ingest_stages.enrich);
    }

    #[test]
    fn test_env_overrides() {
        let config = apply(&[
            ("TABLE_NAME", "orders_v2"),
            ("DATABASE_URL", "postgresql://db/orders"),
            ("ORDER_PIPELINE_MAX_CONNECTIONS", "12"),
            ("ORDER_PIPELINE_ORDER_ID_STRATEGY", "correlation_keyed"),
            ("ORDER_PIPELINE_ENRICH", "false"),
        ])
        .unwrap();

        assert_eq!(config.table_name, "orders_v2");
        assert_eq!(config.database_url, "postgresql://db/orders");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.order_id_strategy, OrderIdStrategy::CorrelationKeyed);
        assert!(!config.ingest_stages.enrich);
        assert!(config.ingest_stages.validate);
    }

    #[test]
    fn test_invalid_env_values() {
        assert!(apply(&[("ORDER_PIPELINE_MAX_CONNECTIONS", "many")]).is_err());
        assert!(apply(&[("ORDER_PIPELINE_MAX_CONNECTIONS", "0")]).is_err());
        assert!(apply(&[("ORDER_PIPELINE_VALIDATE", "maybe")]).is_err());
        assert!(apply(&[("ORDER_PIPELINE_ORDER_ID_STRATEGY", "sequential")]).is_err());
    }

    #[test]
    fn test_table_name_must_be_identifier() {
        assert!(is_sql_identifier("orders"));
        assert!(is_sql_identifier("_orders_2025"));
        assert!(!is_sql_identifier("2orders"));
        assert!(!is_sql_identifier("orders; DROP TABLE x"));
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier(&"a".repeat(64)));

        assert!(apply(&[("TABLE_NAME", "orders-prod")]).is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_environment_falls_back_to_app_env() {
        let config = apply(&[("APP_ENV", "production")]).unwrap();
        assert_eq!(config.environment, "production");

        let config = apply(&[("APP_ENV", "production"), ("ORDER_PIPELINE_ENV", "test")]).unwrap();
        assert_eq!(config.environment, "test");
    }

    #[test]
    fn test_load_from_file() {
        let file = toml_file(
            r#"
environment = "production"
table_name = "archived_orders"
max_connections = 3
order_id_strategy = "correlation_keyed"

[ingest_stages]
validate = true
enrich = false
"#,
        );

        let config = PipelineConfig::load_with_vars(Some(file.path()), vars(&[])).unwrap();

        assert_eq!(config.environment, "production");
        assert_eq!(config.table_name, "archived_orders");
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.order_id_strategy, OrderIdStrategy::CorrelationKeyed);
        assert!(!config.ingest_stages.enrich);
        assert!(config.ingest_stages.validate);
        assert_eq!(config.database_url, PipelineConfig::default().database_url);
    }

    #[test]
    fn test_load_layers_env_over_file() {
        let file = toml_file(
            r#"
table_name = "archived_orders"
max_connections = 3
"#,
        );

        let config = PipelineConfig::load_with_vars(
            Some(file.path()),
            vars(&[
                ("ORDER_PIPELINE__MAX_CONNECTIONS", "7"),
                ("ORDER_PIPELINE__INGEST_STAGES__VALIDATE", "false"),
                ("ORDER_PIPELINE__TABLE_NAME", "nested_orders"),
                ("TABLE_NAME", "flat_orders"),
            ]),
        )
        .unwrap();

        assert_eq!(config.max_connections, 7);
        assert!(!config.ingest_stages.validate);
        assert!(config.ingest_stages.enrich);
        assert_eq!(config.table_name, "flat_orders");
    }

    #[test]
    fn test_load_validates_result() {
        let file = toml_file(r#"table_name = "orders-prod""#);
        let err = PipelineConfig::load_with_vars(Some(file.path()), vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { ref field, .. } if field == "table_name"));

        let missing = Path::new("/nonexistent/order-pipeline.toml");
        let err = PipelineConfig::load_with_vars(Some(missing), vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigurationError::Load { .. }));
    }
}
