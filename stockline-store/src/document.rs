use crate::{StoreError, StoreResult};
use serde_json::{Map, Value};

/// Key of the format version recorded in the document root.
pub const DATA_VERSION_KEY: &str = "DataVersion";

/// Key of the map of shops.
pub const SELLERS_KEY: &str = "sellers";

/// Key of a shop's item record list.
pub const ITEMS_KEY: &str = "items";

/// Key of a shop's `key:value` misc list.
pub const MISC_KEY: &str = "misc";

/// A loaded store document.
///
/// ```text
/// {"DataVersion": 4, "sellers": {"<shop>": {"items": [...], "misc": ["k:v", ...], ...}}}
/// ```
///
/// Only the string lists under `items` and `misc` are read and written
/// through this view; every other field is carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreDocument {
    root: Map<String, Value>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreDocument {
    /// An empty document with no shops and no recorded version.
    #[must_use]
    pub fn new() -> Self {
        let mut root = Map::new();
        root.insert(SELLERS_KEY.into(), Value::Object(Map::new()));
        Self { root }
    }

    /// Wraps a parsed tree. The root must be a map.
    pub fn from_value(value: Value) -> StoreResult<Self> {
        match value {
            Value::Object(root) => {
                if root.get(SELLERS_KEY).is_some_and(|s| !s.is_object()) {
                    return Err(StoreError::InvalidData(format!(
                        "`{SELLERS_KEY}` is not a map"
                    )));
                }
                Ok(Self { root })
            }
            _ => Err(StoreError::InvalidData("document root is not a map".into())),
        }
    }

    pub fn from_json(text: &str) -> StoreResult<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Recorded format version; zero when absent or not a number.
    #[must_use]
    pub fn data_version(&self) -> u32 {
        self.root
            .get(DATA_VERSION_KEY)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0)
    }

    pub fn set_data_version(&mut self, version: u32) {
        self.root.insert(DATA_VERSION_KEY.into(), Value::from(version));
    }

    fn sellers(&self) -> Option<&Map<String, Value>> {
        self.root.get(SELLERS_KEY).and_then(Value::as_object)
    }

    fn shop_mut(&mut self, shop: &str) -> StoreResult<&mut Map<String, Value>> {
        self.root
            .get_mut(SELLERS_KEY)
            .and_then(Value::as_object_mut)
            .and_then(|sellers| sellers.get_mut(shop))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| StoreError::InvalidData(format!("no shop `{shop}`")))
    }

    /// Shop identifiers, sorted.
    #[must_use]
    pub fn shop_ids(&self) -> Vec<String> {
        self.sellers()
            .map(|sellers| sellers.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn shop_count(&self) -> usize {
        self.sellers().map_or(0, Map::len)
    }

    /// Reads a shop field as a list of strings.
    ///
    /// Returns `Ok(None)` when the shop has no such field, and an error when
    /// the field exists but is not a list of strings.
    pub fn string_list(&self, shop: &str, field: &str) -> StoreResult<Option<Vec<String>>> {
        let Some(value) = self
            .sellers()
            .and_then(|sellers| sellers.get(shop))
            .and_then(|s| s.get(field))
        else {
            return Ok(None);
        };

        let entries = value.as_array().ok_or_else(|| {
            StoreError::InvalidData(format!("`{shop}.{field}` is not a list"))
        })?;

        entries
            .iter()
            .map(|entry| {
                entry.as_str().map(str::to_string).ok_or_else(|| {
                    StoreError::InvalidData(format!("`{shop}.{field}` holds a non-string entry"))
                })
            })
            .collect::<StoreResult<Vec<_>>>()
            .map(Some)
    }

    /// Replaces a shop field with a list of strings.
    pub fn set_string_list(&mut self, shop: &str, field: &str, values: Vec<String>) -> StoreResult<()> {
        let list = values.into_iter().map(Value::String).collect();
        self.shop_mut(shop)?.insert(field.into(), Value::Array(list));
        Ok(())
    }

    pub fn items(&self, shop: &str) -> StoreResult<Option<Vec<String>>> {
        self.string_list(shop, ITEMS_KEY)
    }

    pub fn set_items(&mut self, shop: &str, items: Vec<String>) -> StoreResult<()> {
        self.set_string_list(shop, ITEMS_KEY, items)
    }

    pub fn misc(&self, shop: &str) -> StoreResult<Option<Vec<String>>> {
        self.string_list(shop, MISC_KEY)
    }

    pub fn set_misc(&mut self, shop: &str, misc: Vec<String>) -> StoreResult<()> {
        self.set_string_list(shop, MISC_KEY, misc)
    }

    /// Inserts or replaces a shop with the given item and misc lists.
    pub fn insert_shop(&mut self, shop: &str, items: Vec<String>, misc: Vec<String>) {
        let mut entry = Map::new();
        entry.insert(
            ITEMS_KEY.into(),
            Value::Array(items.into_iter().map(Value::String).collect()),
        );
        entry.insert(
            MISC_KEY.into(),
            Value::Array(misc.into_iter().map(Value::String).collect()),
        );

        let sellers = self
            .root
            .entry(SELLERS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !sellers.is_object() {
            *sellers = Value::Object(Map::new());
        }
        if let Value::Object(sellers) = sellers {
            sellers.insert(shop.into(), Value::Object(entry));
        }
    }
}
