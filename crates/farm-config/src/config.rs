//! Configuration types and loading.
//!
//! [`FarmConfig`] mirrors `.farm/config.yaml`. [`load_config`] layers, in
//! increasing priority: built-in defaults, the YAML file, then `FARM_*`
//! environment variables where `__` separates sections
//! (`FARM_AUTH__SESSION_TTL_HOURS=8` sets `auth.session-ttl-hours`).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use farm_core::sequence::Numbering;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Longest zero-padding accepted for sequence numbers.
const MAX_SEQUENCE_WIDTH: usize = 12;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// A layer could not be merged or extracted.
    #[error("invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("no .farm directory found (run 'farm init' first)")]
    FarmDirNotFound,

    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DatabaseConfig {
    /// SQLite file, relative to `.farm/` unless absolute.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "farm.db".to_owned(),
        }
    }
}

/// One year.
pub const MAX_SESSION_TTL_HOURS: u32 = 24 * 366;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AuthConfig {
    /// When false every request runs as the anonymous actor.
    pub required: bool,
    pub session_ttl_hours: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required: true,
            session_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct InventoryConfig {
    /// Reorder level given to new feed stock that arrives without one.
    pub default_reorder_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The full configuration, corresponding to `.farm/config.yaml`.
///
/// Every section has defaults, so a partial file (or none) is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct FarmConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub numbering: Numbering,
    pub inventory: InventoryConfig,
    pub logging: LoggingConfig,
}

impl FarmConfig {
    /// Where the database lives for a farm rooted at `farm_dir`.
    pub fn database_path(&self, farm_dir: &Path) -> PathBuf {
        let path = Path::new(&self.database.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            farm_dir.join(path)
        }
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            return Err(invalid("server.bind", "must not be empty"));
        }
        if self.database.path.trim().is_empty() {
            return Err(invalid("database.path", "must not be empty"));
        }
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.auth.session_ttl_hours) {
            return Err(invalid(
                "auth.session-ttl-hours",
                format!("must be between 1 and {MAX_SESSION_TTL_HOURS}"),
            ));
        }
        for (key, format) in [
            ("numbering.batch", &self.numbering.batch),
            ("numbering.order", &self.numbering.order),
            ("numbering.reference", &self.numbering.reference),
        ] {
            if format.prefix.trim().is_empty() {
                return Err(invalid(key, "prefix must not be empty"));
            }
            if !(1..=MAX_SEQUENCE_WIDTH).contains(&format.width) {
                return Err(invalid(
                    key,
                    format!("width must be between 1 and {MAX_SEQUENCE_WIDTH}"),
                ));
            }
        }
        let level = self.inventory.default_reorder_level;
        if !level.is_finite() || level < 0.0 {
            return Err(invalid(
                "inventory.default-reorder-level",
                "must be a non-negative number",
            ));
        }
        Ok(())
    }

    /// Looks up a dotted key (`auth.session-ttl-hours`) and renders it
    /// as YAML.
    pub fn get_value(&self, key: &str) -> Result<String> {
        let mut node = serde_yaml::to_value(self)?;
        for part in key.split('.') {
            node = match node {
                serde_yaml::Value::Mapping(mut map) => map
                    .remove(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_owned()))?,
                _ => return Err(ConfigError::UnknownKey(key.to_owned())),
            };
        }
        Ok(match node {
            serde_yaml::Value::String(s) => s,
            other => serde_yaml::to_string(&other)?.trim_end().to_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `FARM_AUTH__SESSION_TTL_HOURS` -> `auth.session-ttl-hours`.
fn env_provider() -> Env {
    Env::prefixed("FARM_")
        .map(|key| {
            key.as_str()
                .to_ascii_lowercase()
                .replace("__", ".")
                .replace('_', "-")
                .into()
        })
        .filter(|key| !key.as_str().eq_ignore_ascii_case("dir"))
}

fn file_layer(farm_dir: &Path) -> Result<Option<String>> {
    let path = farm_dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok((!content.trim().is_empty()).then_some(content))
}

/// Loads configuration for the farm rooted at `farm_dir`.
///
/// A missing or empty `config.yaml` just means defaults.
pub fn load_config(farm_dir: &Path) -> Result<FarmConfig> {
    let mut figment = Figment::from(Serialized::defaults(FarmConfig::default()));
    if let Some(yaml) = file_layer(farm_dir)? {
        // Parse errors are reported against the file, not the merge.
        serde_yaml::from_str::<serde_yaml::Value>(&yaml)?;
        figment = figment.merge(Yaml::string(&yaml));
    }
    let config: FarmConfig = figment
        .merge(env_provider())
        .extract()
        .map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}

/// Writes `config` to `farm_dir/config.yaml`, creating the directory.
pub fn save_config(farm_dir: &Path, config: &FarmConfig) -> Result<()> {
    std::fs::create_dir_all(farm_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(farm_dir.join(CONFIG_FILE_NAME), yaml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let cfg = FarmConfig::default();
        assert_eq!(cfg.server.bind, "127.0.0.1:5000");
        assert_eq!(cfg.database.path, "farm.db");
        assert!(cfg.auth.required);
        assert_eq!(cfg.auth.session_ttl_hours, 24);
        assert_eq!(cfg.numbering.batch.prefix, "BATCH");
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
        cfg.validate().unwrap();
    }

    #[test]
    fn missing_dir_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope")).unwrap();
        assert_eq!(cfg.database.path, "farm.db");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "auth:\n  session-ttl-hours: 8\nnumbering:\n  order:\n    prefix: SO\n    width: 6\n",
        )
        .unwrap();

        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.auth.session_ttl_hours, 8);
        assert!(cfg.auth.required);
        assert_eq!(cfg.numbering.order.prefix, "SO");
        assert_eq!(cfg.numbering.order.width, 6);
        assert_eq!(cfg.numbering.batch.prefix, "BATCH");
    }

    #[test]
    fn empty_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "\n  \n").unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), FarmConfig::default());
    }

    #[test]
    fn broken_yaml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "server: [unclosed\n").unwrap();
        assert!(matches!(load_config(dir.path()), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "auth:\n  session-ttl-hours: 0\n").unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(err.to_string().contains("auth.session-ttl-hours"));

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "auth:\n  session-ttl-hours: 4294967295\n",
        )
        .unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(err.to_string().contains("between 1 and"), "{err}");

        let mut cfg = FarmConfig::default();
        cfg.auth.session_ttl_hours = MAX_SESSION_TTL_HOURS;
        cfg.validate().unwrap();
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let farm_dir = dir.path().join(".farm");
        let mut cfg = FarmConfig::default();
        cfg.server.bind = "0.0.0.0:8080".into();
        cfg.inventory.default_reorder_level = 25.0;
        cfg.logging.format = LogFormat::Json;

        save_config(&farm_dir, &cfg).unwrap();
        assert_eq!(load_config(&farm_dir).unwrap(), cfg);
    }

    #[test]
    fn database_path_resolution() {
        let mut cfg = FarmConfig::default();
        assert_eq!(cfg.database_path(Path::new("/srv/.farm")), PathBuf::from("/srv/.farm/farm.db"));
        cfg.database.path = "/var/lib/farm.db".into();
        assert_eq!(cfg.database_path(Path::new("/srv/.farm")), PathBuf::from("/var/lib/farm.db"));
    }

    #[test]
    fn dotted_lookup() {
        let cfg = FarmConfig::default();
        assert_eq!(cfg.get_value("server.bind").unwrap(), "127.0.0.1:5000");
        assert_eq!(cfg.get_value("auth.session-ttl-hours").unwrap(), "24");
        assert_eq!(cfg.get_value("auth.required").unwrap(), "true");
        assert_eq!(cfg.get_value("numbering.order.prefix").unwrap(), "ORD");
        assert!(cfg.get_value("auth.nope").is_err());
        assert!(cfg.get_value("server.bind.deeper").is_err());
    }
}
