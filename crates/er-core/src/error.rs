//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where settings or ids flow through them.

use thiserror::Error;

/// Errors produced by `er-core`, mostly while loading settings.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("settings error: {0}")]
    Config(String),

    #[error("settings parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `er-core`.
pub type CoreResult<T> = Result<T, CoreError>;
