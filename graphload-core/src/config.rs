use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::batch::BatchOptions;
use crate::encode::{EncoderConfig, fields};
use crate::error::ConfigError;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "graphload.toml";

/// Top-level graphload configuration, matching `graphload.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphLoadConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub partition: PartitionSection,
    #[serde(default)]
    pub encoding: EncodingSection,
    #[serde(default)]
    pub batch: BatchSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub endpoint: String,
    pub database: String,
    pub container: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            endpoint: "https://localhost:8081".to_string(),
            database: "graph".to_string(),
            container: "elements".to_string(),
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionSection {
    /// Document field holding the partition key value.
    pub key: String,
    pub required: bool,
}

impl Default for PartitionSection {
    fn default() -> Self {
        Self {
            key: "pk".to_string(),
            required: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingSection {
    pub flatten_properties: bool,
    pub reserved_edge_properties: Vec<String>,
}

impl Default for EncodingSection {
    fn default() -> Self {
        Self {
            flatten_properties: false,
            reserved_edge_properties: fields::SYSTEM_EDGE_PROPERTIES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    /// Maximum concurrent writes; 0 starts every write at once.
    pub max_in_flight: usize,
    /// Per-write timeout in seconds; 0 disables it.
    pub write_timeout_secs: u64,
}

impl GraphLoadConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.partition.key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "partition.key must not be empty".to_string(),
            ));
        }
        if let Some(name) = self
            .encoding
            .reserved_edge_properties
            .iter()
            .find(|name| name.is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "encoding.reserved_edge_properties contains an empty name: {name:?}"
            )));
        }
        if self.partition.required
            && fields::SYSTEM_EDGE_PROPERTIES.contains(&self.partition.key.as_str())
        {
            return Err(ConfigError::Invalid(format!(
                "partition.key {:?} clashes with a system document field",
                self.partition.key
            )));
        }
        Ok(())
    }

    /// Encoder settings, resolved once for a whole batch.
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            partition_key: self.partition.key.clone(),
            partition_required: self.partition.required,
            flatten_properties: self.encoding.flatten_properties,
            reserved_edge_properties: self
                .encoding
                .reserved_edge_properties
                .iter()
                .cloned()
                .collect::<BTreeSet<_>>(),
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            max_in_flight: NonZeroUsize::new(self.batch.max_in_flight),
            write_timeout: (self.batch.write_timeout_secs > 0)
                .then(|| Duration::from_secs(self.batch.write_timeout_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::GraphDocumentEncoder;
    use crate::model::Edge;

    #[test]
    fn default_config_round_trips() {
        let config = GraphLoadConfig::default();
        let text = config.to_toml_string().unwrap();
        let back = GraphLoadConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config = GraphLoadConfig::from_toml_str(
            r#"
            [partition]
            key = "tenant"
            required = false
            "#,
        )
        .unwrap();
        assert_eq!(config.partition.key, "tenant");
        assert_eq!(config.store.database, "graph");
        assert_eq!(config.batch.max_in_flight, 0);

        let encoder = config.encoder_config();
        assert_eq!(encoder.partition_key, "tenant");
        assert!(!encoder.partition_required);
        assert!(encoder.reserved_edge_properties.contains("_isEdge"));
    }

    #[test]
    fn empty_partition_key_is_invalid() {
        let err = GraphLoadConfig::from_toml_str("[partition]\nkey = \"\"\nrequired = true\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn reserved_list_may_be_empty_but_not_hold_empty_names() {
        let config = GraphLoadConfig::from_toml_str("[encoding]\nreserved_edge_properties = []\n")
            .unwrap();
        assert!(config.encoding.reserved_edge_properties.is_empty());
        // The encoder still reserves the partition key field.
        let encoder = GraphDocumentEncoder::new(config.encoder_config());
        let edge = Edge::new("e", "joins", "a", "b", "A", "B")
            .and_then(|e| e.with_partition_keys("/pk", "/pk"))
            .and_then(|e| e.with_property("pk", "/x"))
            .unwrap();
        assert!(encoder.encode_edge(&edge).is_err());

        let err = GraphLoadConfig::from_toml_str(
            "[encoding]\nreserved_edge_properties = [\"_sink\", \"\"]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn system_field_as_partition_key_is_invalid() {
        let err = GraphLoadConfig::from_toml_str("[partition]\nkey = \"_sink\"\nrequired = true\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = GraphLoadConfig::from_toml_str("[batch\nmax_in_flight = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn batch_options_map_zero_to_unbounded() {
        let config = GraphLoadConfig::default();
        let options = config.batch_options();
        assert!(options.max_in_flight.is_none());
        assert!(options.write_timeout.is_none());

        let config = GraphLoadConfig::from_toml_str(
            "[batch]\nmax_in_flight = 8\nwrite_timeout_secs = 30\n",
        )
        .unwrap();
        let options = config.batch_options();
        assert_eq!(options.max_in_flight.map(NonZeroUsize::get), Some(8));
        assert_eq!(options.write_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = GraphLoadConfig::load(&dir.path().join(CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
