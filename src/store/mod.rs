//! The spreadsheet-backed record store.
//!
//! [`SheetStore`] is the DAO facade the bot backend talks to: cached,
//! alias-resilient reads of the products and config resources, and targeted
//! mutations of the orders resource (append one order, update the status of
//! an existing one). All remote traffic goes through the retry executor; read
//! paths additionally pass through the shared TTL cache.
//!
//! Consistency model: no write-write locking exists. Two concurrent status
//! updates targeting the same row race at cell-write granularity with
//! last-write-wins and no detection, mirroring the remote store's own
//! semantics. Concurrent refreshes of a cached resource may duplicate a read;
//! that is tolerated since refreshes are idempotent.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;

use crate::cache::{CachedPayload, TtlCache};
use crate::config::{ResourceNames, Settings};
use crate::error::StoreResult;
use crate::events;
use crate::header::AliasTable;
use crate::records::{config_from_grid, records_from_grid, ConfigMap, Record};
use crate::remote::SheetsBackend;
use crate::retry::{self, RetryPolicy};

const MODULE: &str = "sheetstore::store";

/// Data-access facade over one remote spreadsheet.
pub struct SheetStore<B: SheetsBackend> {
    backend: B,
    cache: TtlCache,
    product_table: AliasTable,
    order_table: AliasTable,
    resources: ResourceNames,
    products_ttl: Duration,
    configs_ttl: Duration,
    retry: RetryPolicy,
}

impl<B: SheetsBackend> SheetStore<B> {
    /// Create a store with default resource names, TTLs, and retry budget.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: TtlCache::new(),
            product_table: AliasTable::products(),
            order_table: AliasTable::orders(),
            resources: ResourceNames::default(),
            products_ttl: Duration::from_secs(45),
            configs_ttl: Duration::from_secs(45),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a store configured from [`Settings`].
    pub fn from_settings(backend: B, settings: &Settings) -> Self {
        Self {
            backend,
            cache: TtlCache::new(),
            product_table: AliasTable::products(),
            order_table: AliasTable::orders(),
            resources: settings.resources.clone(),
            products_ttl: settings.products_ttl,
            configs_ttl: settings.configs_ttl,
            retry: settings.retry,
        }
    }

    /// Replace the cache (tests inject one with a manual clock).
    pub fn with_cache(mut self, cache: TtlCache) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    // =========================================================================
    // Read paths
    // =========================================================================

    /// Read the products catalog as alias-resolved records, cached.
    pub async fn read_products(&self) -> StoreResult<Vec<Record>> {
        let name = self.resources.products.clone();
        if let Some(CachedPayload::Records(records)) = self.cache.get(&name, self.products_ttl) {
            return Ok(records);
        }

        let grid = retry::execute(&self.retry, "fetch_grid", || {
            self.backend.fetch_grid(&name)
        })
        .await?;

        let records = records_from_grid(&grid, &self.product_table);
        events::info("read_products", MODULE, json!({ "count": records.len() }));
        self.cache
            .set(&name, CachedPayload::Records(records.clone()));
        Ok(records)
    }

    /// Read the bot configuration resource, cached.
    pub async fn read_config_bot(&self) -> StoreResult<ConfigMap> {
        let name = self.resources.config_bot.clone();
        self.read_config(&name).await
    }

    /// Read the site configuration resource, cached.
    pub async fn read_config_site(&self) -> StoreResult<ConfigMap> {
        let name = self.resources.config_site.clone();
        self.read_config(&name).await
    }

    async fn read_config(&self, name: &str) -> StoreResult<ConfigMap> {
        if let Some(CachedPayload::Config(config)) = self.cache.get(name, self.configs_ttl) {
            return Ok(config);
        }

        let grid = retry::execute(&self.retry, "fetch_grid", || {
            self.backend.fetch_grid(name)
        })
        .await?;

        let config = config_from_grid(&grid);
        events::info(
            format!("read_{}", name),
            MODULE,
            json!({ "keys": config.len() }),
        );
        self.cache.set(name, CachedPayload::Config(config.clone()));
        Ok(config)
    }

    // =========================================================================
    // Mutation paths
    // =========================================================================

    /// Append one order from a field mapping.
    ///
    /// The live header row decides column order: each header is resolved to a
    /// field name and looked up in `fields`, falling back to the exact header
    /// text and then its canonical form, so callers may key by either. Fields
    /// without a value are written as empty strings.
    ///
    /// Returns the 1-based row number the store reports, or 0 when the
    /// reported range cannot be parsed (the write itself has succeeded).
    pub async fn append_order(&self, fields: &HashMap<String, String>) -> StoreResult<u64> {
        let name = self.resources.orders.clone();
        let headers = retry::execute(&self.retry, "fetch_header_row", || {
            self.backend.fetch_header_row(&name)
        })
        .await?;

        let ordered: Vec<String> = headers
            .iter()
            .map(|header| {
                let resolved = self.order_table.resolve(header);
                let value = if resolved.is_resolved() {
                    fields.get(resolved.as_str())
                } else {
                    None
                };
                value
                    .or_else(|| fields.get(header))
                    .or_else(|| fields.get(&crate::header::canonicalize(header)))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();

        self.submit_order_row(&name, ordered).await
    }

    /// Append one order row already in sheet column order.
    pub async fn append_order_row(&self, values: Vec<String>) -> StoreResult<u64> {
        let name = self.resources.orders.clone();
        self.submit_order_row(&name, values).await
    }

    async fn submit_order_row(&self, name: &str, values: Vec<String>) -> StoreResult<u64> {
        let outcome = retry::execute(&self.retry, "append_row", || {
            self.backend.append_row(name, &values)
        })
        .await?;

        events::info(
            "append_order",
            MODULE,
            json!({ "updated_range": &outcome.updated_range }),
        );
        Ok(outcome.row_number())
    }

    /// Update the status (and optionally the extra/notes cell) of the order
    /// whose key column equals `order_no`.
    ///
    /// Soft failures return `Ok(false)`: the key or status column cannot be
    /// resolved on the live header row, or no row matches. Both are logged
    /// under distinct event names so operators can tell a misconfigured sheet
    /// from a missing record.
    ///
    /// Partial failure: each cell write is retried independently. If the
    /// extra write fails after the status write succeeded, the error
    /// propagates with the status change already live on the remote store.
    pub async fn update_order_status(
        &self,
        order_no: &str,
        status: &str,
        extra: Option<&str>,
    ) -> StoreResult<bool> {
        let name = self.resources.orders.clone();
        let grid = retry::execute(&self.retry, "fetch_grid", || {
            self.backend.fetch_grid(&name)
        })
        .await?;

        let Some(headers) = grid.first() else {
            return Ok(false);
        };

        let col_order = self.order_table.find_column(headers, "order_no");
        let col_status = self.order_table.find_column(headers, "status");
        let col_extra = if extra.is_some() {
            self.order_table.find_column(headers, "extra")
        } else {
            None
        };

        let (Some(col_order), Some(col_status)) = (col_order, col_status) else {
            events::warning(
                "update_status_missing_header",
                MODULE,
                json!({ "order_col": col_order, "status_col": col_status }),
            );
            return Ok(false);
        };

        // First match wins; order numbers are assumed unique.
        let needle = order_no.trim();
        let target_row = grid
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| {
                row.get(col_order - 1)
                    .map(|cell| cell.trim() == needle)
                    .unwrap_or(false)
            })
            .map(|(i, _)| (i + 1) as u64);

        let Some(target_row) = target_row else {
            events::warning(
                "update_status_not_found",
                MODULE,
                json!({ "order_no": order_no }),
            );
            return Ok(false);
        };

        retry::execute(&self.retry, "update_cell", || {
            self.backend.update_cell(&name, target_row, col_status, status)
        })
        .await?;

        if let (Some(extra), Some(col_extra)) = (extra, col_extra) {
            retry::execute(&self.retry, "update_cell", || {
                self.backend.update_cell(&name, target_row, col_extra, extra)
            })
            .await?;
        }

        events::info(
            "update_status",
            MODULE,
            json!({ "row": target_row, "order_no": order_no, "status": status }),
        );
        Ok(true)
    }
}
