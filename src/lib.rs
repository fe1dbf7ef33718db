//! # Sheetstore - header-resilient spreadsheet record store
//!
//! Sheetstore lets a messaging-bot backend treat one remote spreadsheet as a
//! lightweight structured store for catalog, configuration, and order data.
//! Worksheets are edited by hand in more than one language, so nothing about
//! column names or order is assumed: headers are canonicalized and resolved
//! through alias tables at call time.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  SheetStore  │────▶│ Retry + TTL  │────▶│ SheetsBackend│
//! │ (read/write) │     │ cache layers │     │ (values API) │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │
//!        ▼
//! ┌──────────────┐     ┌──────────────┐
//! │ AliasTable + │────▶│   Records    │
//! │ canonicalize │     │ (field→value)│
//! └──────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sheetstore::{HttpSheetsBackend, Settings, SheetStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let backend = HttpSheetsBackend::new(&settings.spreadsheet_id, token_from_bootstrap());
//!     let store = SheetStore::from_settings(backend, &settings);
//!
//!     let products = store.read_products().await?;
//!     println!("{} products", products.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`events`] - Structured observability bus
//! - [`header`] - Header canonicalization and alias resolution
//! - [`records`] - Grid-to-record mapping and config value coercion
//! - [`cache`] - Shared TTL cache with injectable clock
//! - [`retry`] - Bounded exponential-backoff retry
//! - [`remote`] - Remote tabular store seam and HTTP client
//! - [`store`] - The DAO facade
//! - [`config`] - Environment-driven settings

// Core modules
pub mod error;
pub mod events;

// Header mapping
pub mod header;
pub mod records;

// Infrastructure
pub mod cache;
pub mod retry;

// Remote access
pub mod remote;

// Facade
pub mod config;
pub mod store;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, ConfigResult, RemoteError, RemoteResult, StoreError, StoreResult};

// =============================================================================
// Re-exports - Header mapping
// =============================================================================

pub use header::{canonicalize, AliasTable, FieldName};

// =============================================================================
// Re-exports - Records
// =============================================================================

pub use records::{config_from_grid, records_from_grid, ConfigMap, ConfigValue, Record};

// =============================================================================
// Re-exports - Infrastructure
// =============================================================================

pub use cache::{CachedPayload, Clock, SystemClock, TtlCache};
pub use retry::RetryPolicy;

// =============================================================================
// Re-exports - Remote access
// =============================================================================

pub use remote::{column_letters, AppendOutcome, HttpSheetsBackend, SheetsBackend};

// =============================================================================
// Re-exports - Facade
// =============================================================================

pub use config::{ResourceNames, Settings};
pub use events::{Event, EventBus, Level};
pub use store::SheetStore;
