//! Inspector configuration.
//!
//! The `bnode-inspect` binary is configured from environment variables.
//!
//! # Environment Variables
//!
//! - `BNODE_PAGE_FILE`: File of concatenated 4KB pages to inspect (required)
//! - `BNODE_MAX_RECORDS`: Records printed per node (default: `16`)

use std::path::PathBuf;

const PAGE_FILE_VAR: &str = "BNODE_PAGE_FILE";
const MAX_RECORDS_VAR: &str = "BNODE_MAX_RECORDS";

/// Inspector configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectConfig {
    /// Page file to read.
    pub page_file: PathBuf,
    /// How many records of each node to print.
    pub max_records: usize,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl InspectConfig {
    /// Default number of records printed per node.
    pub const DEFAULT_MAX_RECORDS: usize = 16;

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let page_file = Self::load_page_file(&lookup)?;
        let max_records = Self::load_max_records(&lookup)?;

        Ok(Self {
            page_file,
            max_records,
        })
    }

    fn load_page_file(lookup: &impl Fn(&str) -> Option<String>) -> Result<PathBuf, ConfigError> {
        let path = lookup(PAGE_FILE_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(PAGE_FILE_VAR.to_string()))?;

        if path.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: PAGE_FILE_VAR.to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(PathBuf::from(path))
    }

    /// Returns the default if not set.
    fn load_max_records(lookup: &impl Fn(&str) -> Option<String>) -> Result<usize, ConfigError> {
        match lookup(MAX_RECORDS_VAR) {
            Some(value) => value.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                name: MAX_RECORDS_VAR.to_string(),
                message: format!("'{value}' is not a non-negative integer"),
            }),
            None => Ok(Self::DEFAULT_MAX_RECORDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_defaults() {
        let config = InspectConfig::from_lookup(lookup_from(&[("BNODE_PAGE_FILE", "pages.db")]))
            .expect("should load");
        assert_eq!(config.page_file, PathBuf::from("pages.db"));
        assert_eq!(config.max_records, InspectConfig::DEFAULT_MAX_RECORDS);
    }

    #[test]
    fn test_max_records() {
        let config = InspectConfig::from_lookup(lookup_from(&[
            ("BNODE_PAGE_FILE", "pages.db"),
            ("BNODE_MAX_RECORDS", "3"),
        ]))
        .expect("should load");
        assert_eq!(config.max_records, 3);

        let err = InspectConfig::from_lookup(lookup_from(&[
            ("BNODE_PAGE_FILE", "pages.db"),
            ("BNODE_MAX_RECORDS", "-1"),
        ]))
        .expect_err("should reject");
        assert_eq!(
            err.to_string(),
            "invalid value for BNODE_MAX_RECORDS: '-1' is not a non-negative integer"
        );
    }

    #[test]
    fn test_missing_page_file() {
        let err = InspectConfig::from_lookup(lookup_from(&[])).expect_err("should reject");
        assert_eq!(
            err,
            ConfigError::MissingEnvVar("BNODE_PAGE_FILE".to_string())
        );
        assert_eq!(
            err.to_string(),
            "missing required environment variable: BNODE_PAGE_FILE"
        );

        let err = InspectConfig::from_lookup(lookup_from(&[("BNODE_PAGE_FILE", "")]))
            .expect_err("should reject");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
