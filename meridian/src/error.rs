//! Error types used by the crate.

use thiserror::Error;

/// Meridian error type.
#[derive(Debug, Error)]
pub enum MeridianError {
    /// I/O error (network or file)
    #[error("failed to load data")]
    Io,
    /// Error decoding a feature payload.
    #[error("failed to decode feature data: {0}")]
    Decoding(#[from] geojson::Error),
    /// The map service answered with something that is not data. Usually caused by a
    /// reverse proxy or endpoint misconfiguration.
    #[error("map service misconfigured: {0}")]
    Configuration(String),
    /// Item not found.
    #[error("item not found")]
    NotFound,
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}

impl From<reqwest::Error> for MeridianError {
    fn from(_value: reqwest::Error) -> Self {
        Self::Io
    }
}
