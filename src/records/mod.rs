//! Grid-to-record mapping.
//!
//! Turns the raw 2D grids the remote store hands back (header row + data
//! rows) into field-keyed records, and parses two-column key/value
//! configuration grids with best-effort type coercion. Pure functions of
//! their input; no I/O here.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::header::AliasTable;

/// One row keyed by resolved field names (or canonical header text for
/// unrecognized columns). Empty cells and missing trailing cells are `Null`.
pub type Record = Map<String, Value>;

/// A parsed key-value configuration resource.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// A configuration value after best-effort coercion.
///
/// Downstream consumers branch explicitly instead of relying on dynamic
/// typing: a value is a boolean, a parsed JSON structure, or raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Json(Value),
    Text(String),
}

/// Map a grid (header row first) to records using alias resolution.
///
/// Headers are resolved positionally; duplicates and blanks keep their
/// position, but a blank header's column contributes nothing to the records.
/// Rows shorter than the header row get `Null` for the missing cells, and
/// empty-string cells become `Null`. Row order is preserved.
pub fn records_from_grid(grid: &[Vec<String>], table: &AliasTable) -> Vec<Record> {
    let Some((header_row, data_rows)) = grid.split_first() else {
        return Vec::new();
    };

    let fields: Vec<String> = header_row
        .iter()
        .map(|h| table.resolve(h).as_str().to_string())
        .collect();

    data_rows
        .iter()
        .map(|row| record_from_row(&fields, row))
        .collect()
}

fn record_from_row(fields: &[String], row: &[String]) -> Record {
    let mut record = Record::new();
    for (i, field) in fields.iter().enumerate() {
        if field.is_empty() {
            continue;
        }
        let value = match row.get(i) {
            Some(cell) if !cell.is_empty() => Value::String(cell.clone()),
            _ => Value::Null,
        };
        record.insert(field.clone(), value);
    }
    record
}

/// Parse a two-column (key, value) grid, skipping the header row and any row
/// with a blank key or fewer than two cells.
pub fn config_from_grid(grid: &[Vec<String>]) -> ConfigMap {
    let mut config = ConfigMap::new();
    for row in grid.iter().skip(1) {
        if row.len() < 2 {
            continue;
        }
        let key = row[0].trim();
        if key.is_empty() {
            continue;
        }
        config.insert(key.to_string(), coerce_value(row[1].trim()));
    }
    config
}

/// Best-effort coercion of one raw configuration cell.
///
/// A value starting with `{` or `[` is tried as JSON and kept raw on parse
/// failure; `true`/`false` (any case) become booleans; everything else stays
/// text.
pub fn coerce_value(raw: &str) -> ConfigValue {
    if raw.starts_with('{') || raw.starts_with('[') {
        if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
            return ConfigValue::Json(parsed);
        }
    }
    match raw.to_lowercase().as_str() {
        "true" => ConfigValue::Bool(true),
        "false" => ConfigValue::Bool(false),
        _ => ConfigValue::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_simple_grid() {
        let grid = grid(&[&["code", "name"], &["A1", "Widget"]]);
        let records = records_from_grid(&grid, &AliasTable::products());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["code"], json!("A1"));
        assert_eq!(records[0]["name"], json!("Widget"));
    }

    #[test]
    fn test_short_row_fills_null() {
        let grid = grid(&[&["code", "name"], &["A2"]]);
        let records = records_from_grid(&grid, &AliasTable::products());

        assert_eq!(records[0]["code"], json!("A2"));
        assert_eq!(records[0]["name"], Value::Null);
    }

    #[test]
    fn test_empty_cell_becomes_null() {
        let grid = grid(&[&["code", "name"], &["A3", ""]]);
        let records = records_from_grid(&grid, &AliasTable::products());

        assert_eq!(records[0]["code"], json!("A3"));
        assert_eq!(records[0]["name"], Value::Null);
    }

    #[test]
    fn test_aliased_and_unknown_headers() {
        let grid = grid(&[
            &["کد", "Price_Retail", "Warehouse Zone"],
            &["A4", "1200", "Z2"],
        ]);
        let records = records_from_grid(&grid, &AliasTable::products());

        assert_eq!(records[0]["code"], json!("A4"));
        assert_eq!(records[0]["price_retail"], json!("1200"));
        // Unknown column stays addressable under its canonical text
        assert_eq!(records[0]["warehouse zone"], json!("Z2"));
    }

    #[test]
    fn test_blank_header_column_skipped() {
        let grid = grid(&[&["code", "", "name"], &["A5", "ignored", "Widget"]]);
        let records = records_from_grid(&grid, &AliasTable::products());

        assert_eq!(records[0].len(), 2);
        assert_eq!(records[0]["name"], json!("Widget"));
    }

    #[test]
    fn test_empty_grid() {
        assert!(records_from_grid(&[], &AliasTable::products()).is_empty());
        let header_only = grid(&[&["code"]]);
        assert!(records_from_grid(&header_only, &AliasTable::products()).is_empty());
    }

    #[test]
    fn test_row_order_preserved() {
        let grid = grid(&[&["code"], &["B1"], &["B2"], &["B3"]]);
        let records = records_from_grid(&grid, &AliasTable::products());
        let codes: Vec<_> = records.iter().map(|r| r["code"].clone()).collect();
        assert_eq!(codes, vec![json!("B1"), json!("B2"), json!("B3")]);
    }

    #[test]
    fn test_config_coercion() {
        let grid = grid(&[
            &["key", "value"],
            &["greeting_enabled", "TRUE"],
            &["shipping_flat", "45000"],
            &["steps", "[1,2]"],
            &["broken", "{not json"],
            &["", "skipped"],
            &["short row"],
        ]);
        let config = config_from_grid(&grid);

        assert_eq!(config["greeting_enabled"], ConfigValue::Bool(true));
        assert_eq!(config["shipping_flat"], ConfigValue::Text("45000".into()));
        assert_eq!(config["steps"], ConfigValue::Json(json!([1, 2])));
        assert_eq!(config["broken"], ConfigValue::Text("{not json".into()));
        assert_eq!(config.len(), 4);
    }

    #[test]
    fn test_coerce_value_variants() {
        assert_eq!(coerce_value("false"), ConfigValue::Bool(false));
        assert_eq!(
            coerce_value(r#"{"a":1}"#),
            ConfigValue::Json(json!({"a":1}))
        );
        assert_eq!(coerce_value("plain"), ConfigValue::Text("plain".into()));
    }
}
