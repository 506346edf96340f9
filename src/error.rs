//! Error types for the I/O edges of the health engine
//!
//! The engine itself never fails on data-quality problems (missing analyses,
//! zero denominators, unclassifiable values all degrade to visible outputs).
//! These errors cover loading experiments, analyses and configuration files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading inputs or configuration
#[derive(Error, Debug)]
pub enum HealthError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid participant count key '{0}' (expected \"total\" or \"variation_<id>\")")]
    InvalidParticipantKey(String),
}

/// Result type for loading operations
pub type Result<T> = std::result::Result<T, HealthError>;
