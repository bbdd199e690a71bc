//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror. Purge
//! failures never escape the dispatcher; these errors are what transports and
//! configuration loading report internally.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cloudflare API error: {0}")]
    Cloudflare(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
