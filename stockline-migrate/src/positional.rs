//! Pre-versioning positional item rows.
//!
//! ```text
//! amount~TYPE~durability~data~name|level;name|level~bookId~metaId~|<base64>
//!   [0]   [1]     [2]     [3]         [4]             [5]    [6]    [7..]
//! ```
//!
//! Fields are split the way the historical reader split them: on `~`, with
//! trailing empty fields dropped. Rows with fewer than four `~` fields fall
//! back to `|` as the delimiter.
//!
//! The remainder `[7..]` is a payload only when field `[7]` itself starts
//! with `|` or `~`.
//!
//! Some historical writers broke a row in two, leaving the binary payload in
//! the following list entry. A row of at most seven fields followed by an
//! entry of fewer than four fields is joined to it with `|`, and the join is
//! kept only when the joined row carries a payload.

use crate::error::RowError;
use crate::field::{is_tagged, ALT_SEPARATOR, ITEM_SEPARATOR};
use serde_json::{Map, Value};
use stockline_types::Item;

/// Minimum number of fields in a positional row.
pub const MIN_FIELDS: usize = 4;

/// Rows longer than this carry a payload and never absorb the next entry.
const MAX_FIELDS_WITHOUT_PAYLOAD: usize = 7;

const PAYLOAD_FIELD: usize = 7;

/// One parsed positional row.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalRow {
    pub amount: u32,
    pub item_type: String,
    pub durability: i16,
    pub data: i8,
    /// Lowercased modifier name to level.
    pub enchants: Map<String, Value>,
    pub book_id: Option<i64>,
    pub meta_id: Option<i64>,
    /// Base64 legacy payload from the remainder, if any.
    pub payload: Option<String>,
}

/// Splits on `sep`, dropping trailing empty fields.
pub(crate) fn split_fields(row: &str, sep: char) -> Vec<&str> {
    let mut fields: Vec<&str> = row.split(sep).collect();
    while fields.last() == Some(&"") {
        fields.pop();
    }
    fields
}

/// Fields of a row, falling back to `|` when `~` yields too few.
pub(crate) fn row_fields(row: &str) -> Vec<&str> {
    let fields = split_fields(row, ITEM_SEPARATOR);
    if fields.len() < MIN_FIELDS && row.contains(ALT_SEPARATOR) {
        split_fields(row, ALT_SEPARATOR)
    } else {
        fields
    }
}

/// True if `next` is the broken-off continuation of a row with
/// `field_count` fields.
pub(crate) fn is_continuation(field_count: usize, next: &str) -> bool {
    field_count <= MAX_FIELDS_WITHOUT_PAYLOAD
        && !is_tagged(next)
        && split_fields(next, ITEM_SEPARATOR).len() < MIN_FIELDS
}

fn invalid(index: usize, name: &'static str, value: &str) -> RowError {
    RowError::InvalidField {
        index,
        name,
        value: value.to_string(),
    }
}

/// Parses `name|level;name|level`. Malformed pairs are skipped.
fn parse_enchants(field: &str) -> Map<String, Value> {
    field
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.split(ALT_SEPARATOR);
            let name = parts.next().filter(|n| !n.is_empty())?;
            let level: i32 = parts.next()?.parse().ok()?;
            Some((name.to_lowercase(), Value::from(level)))
        })
        .collect()
}

fn parse_id(field: Option<&&str>) -> Option<i64> {
    field.and_then(|f| f.parse().ok())
}

impl PositionalRow {
    pub fn parse(row: &str) -> Result<Self, RowError> {
        let fields = row_fields(row);
        if fields.len() < MIN_FIELDS {
            return Err(RowError::TooFewFields(fields.len()));
        }

        let amount = fields[0]
            .parse::<u32>()
            .ok()
            .filter(|a| *a > 0)
            .ok_or_else(|| invalid(0, "amount", fields[0]))?;
        let item_type = fields[1];
        if item_type.is_empty() {
            return Err(invalid(1, "type", item_type));
        }
        let durability = fields[2]
            .parse::<i16>()
            .map_err(|_| invalid(2, "durability", fields[2]))?;
        let data = fields[3]
            .parse::<i8>()
            .map_err(|_| invalid(3, "data", fields[3]))?;

        let enchants = fields.get(4).map(|f| parse_enchants(f)).unwrap_or_default();

        // Only a marked payload field starts a payload; the remainder is
        // rejoined from there without separators.
        let payload = fields
            .get(PAYLOAD_FIELD)
            .filter(|field| field.starts_with([ALT_SEPARATOR, ITEM_SEPARATOR]))
            .map(|_| fields[PAYLOAD_FIELD..].concat()[1..].to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            amount,
            item_type: item_type.to_string(),
            durability,
            data,
            enchants,
            book_id: parse_id(fields.get(5)),
            meta_id: parse_id(fields.get(6)),
            payload,
        })
    }

    /// Rebuilds an item from the positional fields alone.
    #[must_use]
    pub fn to_item(&self) -> Item {
        let mut item = Item::new(self.item_type.clone(), self.amount);
        if self.durability != 0 {
            item.meta
                .insert("Damage".into(), Value::from(self.durability));
        }
        if !self.enchants.is_empty() {
            item.meta
                .insert("enchants".into(), Value::Object(self.enchants.clone()));
        }
        if self.data != 0 {
            item.meta.insert("legacy-data".into(), Value::from(self.data));
        }
        item
    }
}
