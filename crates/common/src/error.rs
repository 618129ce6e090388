//! Shared error type for configuration loading
//!
//! Everything the `internctl` config path can fail on funnels through
//! here: `Config` for a value that fails validation or an env override
//! that does not parse, `Io` for an unreadable file, `Toml` for a file
//! that is not valid TOML.

use thiserror::Error;

/// Failure while loading or validating configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
