//! Error taxonomy shared across the vetting pipeline and the HTTP server.

use thiserror::Error;

/// Failures that can occur while talking to the blockchain query WebSocket.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("upstream query endpoint unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("malformed response from query endpoint: {0}")]
    Protocol(String),
    #[error("pool {0} not present in query response")]
    NotFound(String),
    #[error("query timed out")]
    Timeout,
}

/// Failures verifying a pool's off-chain metadata.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("metadata url unreachable: {0}")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("metadata hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// Failures validating an inbound `/htopology/v1/fetch/` request.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("missing or unparseable magic")]
    MissingMagic,
    #[error("magic mismatch")]
    WrongMagic,
    #[error("max out of range [1,20]")]
    MaxOutOfRange,
    #[error("unparseable max")]
    BadMax,
    #[error("ip version must be >= 4")]
    BadIpVersion,
    #[error("could not parse peer address")]
    BadPeer,
}

/// Errors fatal to process startup.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("failed to bind listen address {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
