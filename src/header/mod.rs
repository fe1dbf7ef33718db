//! Header canonicalization and alias resolution.
//!
//! Remote worksheets are edited by hand, in more than one language, so column
//! headers are free text: `"Price_Retail"`, `"price retail (toman)"` and
//! `"قیمت خرده"` all mean the same column. This module maps such headers onto
//! stable internal field names in two steps:
//!
//! 1. [`canonicalize`] folds a raw header into a comparable canonical form.
//! 2. [`AliasTable::resolve`] maps the canonical form to a field name, falling
//!    back to the canonical text itself so unknown columns stay addressable.

use std::collections::HashMap;

/// Canonicalize a header: trim, drop zero-width/no-break characters,
/// `_` -> space, lower-case, cut a trailing parenthetical, collapse spaces.
///
/// Total and idempotent: never fails, and `canonicalize(canonicalize(s))`
/// equals `canonicalize(s)` for every input.
pub fn canonicalize(raw: &str) -> String {
    // ZWNJ/ZWJ, direction marks, BOM, NBSP: treat as absent, not as spaces.
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| {
            !matches!(
                c,
                '\u{200c}' | '\u{200d}' | '\u{200e}' | '\u{200f}' | '\u{feff}' | '\u{00a0}'
            )
        })
        .collect();

    let mut s = stripped.replace('_', " ").to_lowercase();
    if let Some(pos) = s.find('(') {
        s.truncate(pos);
    }
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Field names
// =============================================================================

/// Result of resolving a raw header against an [`AliasTable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// Header matched a registered alias; carries the canonical field name.
    Field(String),
    /// No alias matched; carries the canonicalized header text so the
    /// column remains addressable by its own name.
    Unresolved(String),
}

impl FieldName {
    /// The key this field contributes to a record.
    ///
    /// Empty for headers that canonicalize to nothing (blank columns).
    pub fn as_str(&self) -> &str {
        match self {
            FieldName::Field(name) => name,
            FieldName::Unresolved(text) => text,
        }
    }

    /// Whether this header resolved to a known field.
    pub fn is_resolved(&self) -> bool {
        matches!(self, FieldName::Field(_))
    }
}

// =============================================================================
// Alias tables
// =============================================================================

/// Immutable mapping from canonical field names to the header aliases that
/// should resolve to them.
///
/// Built once at startup. If two aliases registered under different field
/// names canonicalize identically, the first registration wins; later ones
/// are ignored rather than rejected, since the correct intent cannot be
/// inferred from the table alone. Callers supplying their own tables should
/// keep alias sets disjoint under [`canonicalize`].
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    // canon(alias) -> field name, first registration wins
    index: HashMap<String, String>,
}

impl AliasTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one field with its alias set. Aliases whose canonical form is
    /// already taken (by any field, including this one) are skipped.
    pub fn register<I, S>(&mut self, field: &str, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for alias in aliases {
            let canon = canonicalize(alias.as_ref());
            if canon.is_empty() {
                continue;
            }
            self.index.entry(canon).or_insert_with(|| field.to_string());
        }
    }

    /// Resolve a raw header to a field name.
    ///
    /// Unknown headers degrade gracefully to their own canonical text.
    pub fn resolve(&self, raw_header: &str) -> FieldName {
        let canon = canonicalize(raw_header);
        match self.index.get(&canon) {
            Some(field) => FieldName::Field(field.clone()),
            None => FieldName::Unresolved(canon),
        }
    }

    /// 1-based column index of the first header resolving to `field`,
    /// or `None` if no header does.
    pub fn find_column(&self, headers: &[String], field: &str) -> Option<usize> {
        headers
            .iter()
            .position(|h| self.resolve(h) == FieldName::Field(field.to_string()))
            .map(|i| i + 1)
    }

    /// Alias table for the products catalog resource (English/Persian).
    pub fn products() -> Self {
        let mut table = Self::new();
        table.register("code", ["code", "کد"]);
        table.register("name", ["name", "نام"]);
        table.register("brand", ["brand", "برند"]);
        table.register("category", ["category", "دسته"]);
        table.register("short_desc", ["short desc", "توضیح کوتاه", "توضیح كوتاه"]);
        table.register(
            "long_desc",
            ["long desc", "توضیح بلند", "توضیح كامل", "توضیح کامل"],
        );
        table.register(
            "price_retail",
            [
                "price retail",
                "قیمت خرده",
                "قیمت خرده فروشی",
                "قیمت خرده‌فروشی",
            ],
        );
        table.register(
            "price_wholesale_base",
            ["price wholesale base", "قیمت عمده پایه"],
        );
        table.register(
            "min_wholesale_qty",
            ["min wholesale qty", "حداقل مقدار عمده", "حداقل عمده"],
        );
        table.register("pack_qty", ["pack qty", "تعداد در بسته"]);
        table.register("stock", ["stock", "موجودی"]);
        table.register("image_url", ["image url", "تصویر", "عکس", "تصویر url"]);
        table.register("tags", ["tags", "برچسبها", "برچسب‌ها", "برچسب ها"]);
        table.register("status", ["status", "وضعیت"]);
        table
    }

    /// Alias table for the orders resource (English/Persian).
    pub fn orders() -> Self {
        let mut table = Self::new();
        table.register("order_no", ["order no", "order", "شماره سفارش", "کد سفارش"]);
        table.register("status", ["status", "وضعیت"]);
        table.register(
            "extra",
            [
                "extra",
                "یادداشت",
                "یادداشت ها",
                "یادداشت‌ها",
                "notes",
                "توضیحات",
            ],
        );
        // Optional columns, used when appending mapped rows
        table.register("created_at", ["created at", "تاریخ ثبت"]);
        table.register("customer_name", ["customer name", "نام گیرنده"]);
        table.register("phone", ["phone", "موبایل", "تلفن"]);
        table.register("items_json", ["items json", "اقلام(json)", "اقلام (json)"]);
        table.register("total", ["total", "جمع کل"]);
        table.register("payment_method", ["payment method", "روش پرداخت"]);
        table.register("receipt_url", ["receipt url", "رسید url"]);
        table.register("telegram_id", ["telegram id", "تلگرام id"]);
        table.register("address", ["address", "آدرس"]);
        table.register("postal_code", ["postal code", "کدپستی", "کد پستی"]);
        table
    }
}
