//! Service configuration
//!
//! Loaded from a TOML file. Every field has a default so a partial file (or
//! none at all, for tests) still yields a usable configuration; `validate`
//! rejects the combinations the service cannot run with.

use crate::identifiers::RequesterId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `reset_secret`.
pub const RESET_SECRET_ENV: &str = "ROSTERLINK_RESET_SECRET";

/// Default bootstrap admin for a fresh admin set.
pub const DEFAULT_BOOTSTRAP_ADMIN: i64 = 933_493_534;

/// Offender reports drop requesters below this many attempts.
pub const DEFAULT_OFFENDER_THRESHOLD: u64 = 5;

/// Configuration loading or validation failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config path
        path: PathBuf,
        /// I/O error
        source: std::io::Error,
    },
    /// File is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field holds an unusable value
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Column headers of the record sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    /// Record id column
    pub id: String,
    /// Display name column
    pub name: String,
    /// Subject score columns, in display order
    pub subjects: Vec<String>,
    /// Total score column
    pub total: String,
    /// Percentage column
    pub percentage: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: "ID".to_string(),
            name: "اسم الطالب".to_string(),
            subjects: vec![
                "Dermatology".to_string(),
                "ENT".to_string(),
                "Family medicine".to_string(),
                "Radiology".to_string(),
            ],
            total: "Total".to_string(),
            percentage: "percentage".to_string(),
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Directory holding the persisted state documents
    pub state_dir: PathBuf,
    /// CSV export of the record sheet
    pub records_path: PathBuf,
    /// Admin seeded into an empty admin set
    pub bootstrap_admin: RequesterId,
    /// Shared secret guarding `reset_all`
    pub reset_secret: String,
    /// Minimum attempts before a requester appears in offender reports
    pub offender_threshold: u64,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Directory the console transport writes file attachments to
    pub outbox_dir: PathBuf,
    /// Record sheet column headers
    pub columns: ColumnMapping,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("./state"),
            records_path: PathBuf::from("./result.csv"),
            bootstrap_admin: RequesterId::new(DEFAULT_BOOTSTRAP_ADMIN),
            reset_secret: String::new(),
            offender_threshold: DEFAULT_OFFENDER_THRESHOLD,
            log_level: "info".to_string(),
            outbox_dir: PathBuf::from("./outbox"),
            columns: ColumnMapping::default(),
        }
    }
}

impl RosterConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist. The reset secret environment override is applied and
    /// the result validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if let Ok(secret) = std::env::var(RESET_SECRET_ENV) {
            config.reset_secret = secret;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reset_secret.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "reset_secret",
                reason: format!("must be set in the config file or via {RESET_SECRET_ENV}"),
            });
        }
        if self.columns.subjects.is_empty() {
            return Err(ConfigError::Invalid {
                field: "columns.subjects",
                reason: "at least one subject column is required".to_string(),
            });
        }
        if self.columns.id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "columns.id",
                reason: "id column header cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
