//! Error types for the sheetstore data-access layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ConfigError`] - Environment/configuration errors (fatal, never retried)
//! - [`RemoteError`] - Failures from the remote tabular store (transient, retried)
//! - [`StoreError`] - Top-level DAO errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Structural mismatches (missing key/status columns) and lookup misses are
//! deliberately *not* errors: the store reports them as soft failures
//! (`Ok(false)` / empty results) because they are recoverable data-shape
//! conditions, not programming errors.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading settings from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Spreadsheet id is not set.
    #[error("SHEETSTORE_SPREADSHEET_ID is not set")]
    MissingSpreadsheetId,

    /// Service-account credentials file does not exist.
    #[error("credentials file not found: {0} (set SHEETSTORE_CREDENTIALS to your service-account JSON)")]
    MissingCredentials(String),

    /// A numeric setting could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

// =============================================================================
// Remote Store Errors
// =============================================================================

/// Failures from the remote tabular store.
///
/// Every variant is treated as transient and retried by the
/// [`crate::retry`] executor before being surfaced verbatim.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure (connection, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The store answered with a non-success status.
    #[error("remote store error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The store answered with a body we could not decode.
    #[error("invalid remote response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Store Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::store::SheetStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Remote store error, after retry exhaustion.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Result type for DAO operations.
pub type StoreResult<T> = Result<T, StoreError>;
