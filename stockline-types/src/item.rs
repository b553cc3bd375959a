use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A persisted item: a host type identifier, a stack amount, and an open
/// attribute bag.
///
/// `meta` holds everything the host attaches to an item (modifiers, lore
/// lines, durability, ownership tags, nested containers) as plain JSON.
/// `data_version` is the host epoch the item was last normalised to; two items
/// with identical content but different epochs are not equal, which is why
/// decoded items go through one host encode/decode cycle before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_type: String,
    pub amount: u32,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    #[serde(default)]
    pub data_version: u32,
}

impl Item {
    /// Creates an item with no attributes at epoch zero.
    #[must_use]
    pub fn new(item_type: impl Into<String>, amount: u32) -> Self {
        Self {
            item_type: item_type.into(),
            amount,
            meta: Map::new(),
            data_version: 0,
        }
    }

    /// Adds (or replaces) a top-level attribute.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Sets the host epoch.
    #[must_use]
    pub fn with_data_version(mut self, data_version: u32) -> Self {
        self.data_version = data_version;
        self
    }

    /// Returns true if the item is of the given host type.
    #[must_use]
    pub fn is_type(&self, item_type: &str) -> bool {
        self.item_type == item_type
    }

    /// Looks up an attribute using a JSON pointer rooted at `meta`
    /// (e.g., "/skull-owner/name").
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let key = head.replace("~1", "/").replace("~0", "~");
        let value = self.meta.get(&key)?;
        if tail.is_empty() {
            Some(value)
        } else {
            value.pointer(tail)
        }
    }

    /// Extract a string attribute using a JSON pointer.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract an integer attribute using a JSON pointer.
    pub fn get_i64(&self, pointer: &str) -> Option<i64> {
        self.pointer(pointer).and_then(|v| v.as_i64())
    }

    /// Compares logical content, ignoring the host epoch.
    #[must_use]
    pub fn same_content(&self, other: &Item) -> bool {
        self.item_type == other.item_type && self.amount == other.amount && self.meta == other.meta
    }
}
