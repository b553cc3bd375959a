//! Reference implementation of the host platform primitives.
//!
//! [`ReferenceHost`] stands in for the real platform in tests and in
//! embedders that have no host of their own. It reproduces the behaviour the
//! core has to cope with:
//!
//! - native decode upgrades items to the host's current data epoch
//! - native decode refuses items from a newer epoch
//! - hosts from 1.21.10 on crash on player heads whose owner name is empty
//! - the legacy binary format keeps whatever epoch the item was written with
//!
//! # Native tree
//!
//! ```text
//! { "type": "STONE", "amount": 5, "v": 4671, "meta": { "meta-type": "UNSPECIFIC", ... } }
//! ```
//!
//! `meta` is omitted for items without attributes.
//!
//! # Legacy binary format
//!
//! `b"SLOG"`, one format byte, then a postcard-encoded list of frames. Each
//! frame stores the attribute bag as JSON text so the binary layer never
//! recurses over attacker-controlled structure.

mod legacy;

use serde_json::{json, Map, Value};
use stockline_types::{HostError, HostPlatform, HostResult, HostVersion, Item, Tree};
use tracing::debug;
use uuid::Uuid;

/// Attribute key the host uses for its meta discriminator.
pub const META_TYPE_KEY: &str = "meta-type";

/// First host version that rejects empty owner names.
pub const EMPTY_NAME_DEFECT_SINCE: HostVersion = HostVersion::new(1, 21, 10);

/// Reference host platform.
#[derive(Debug, Clone)]
pub struct ReferenceHost {
    version: HostVersion,
    data_version: u32,
    defect_fixed_in: Option<HostVersion>,
}

impl ReferenceHost {
    /// Data epoch used unless overridden.
    pub const DEFAULT_DATA_VERSION: u32 = 4671;

    /// Host of the given version at the default data epoch.
    #[must_use]
    pub fn new(version: HostVersion) -> Self {
        Self {
            version,
            data_version: Self::DEFAULT_DATA_VERSION,
            defect_fixed_in: None,
        }
    }

    #[must_use]
    pub fn with_data_version(mut self, data_version: u32) -> Self {
        self.data_version = data_version;
        self
    }

    /// Marks the empty-owner-name crash as fixed from `version` on.
    #[must_use]
    pub fn with_defect_fixed_in(mut self, version: HostVersion) -> Self {
        self.defect_fixed_in = Some(version);
        self
    }

    /// Whether this host crashes on empty owner names.
    #[must_use]
    pub fn empty_name_defect_active(&self) -> bool {
        self.version >= EMPTY_NAME_DEFECT_SINCE
            && self.defect_fixed_in.is_none_or(|fixed| self.version < fixed)
    }
}

/// Meta discriminator for an item type.
fn meta_type_for(item_type: &str) -> &'static str {
    match item_type {
        "PLAYER_HEAD" => "SKULL",
        "WRITTEN_BOOK" => "BOOK_SIGNED",
        _ => "UNSPECIFIC",
    }
}

impl HostPlatform for ReferenceHost {
    fn version(&self) -> HostVersion {
        self.version
    }

    fn data_version(&self) -> u32 {
        self.data_version
    }

    fn native_encode(&self, item: &Item) -> HostResult<Tree> {
        if item.item_type.is_empty() {
            return Err(HostError::Encode("item has no type".into()));
        }
        if item.amount == 0 {
            return Err(HostError::Encode("item amount must be positive".into()));
        }
        if item.meta.contains_key(META_TYPE_KEY) {
            return Err(HostError::Encode(format!(
                "attribute `{META_TYPE_KEY}` is reserved by the host"
            )));
        }

        let mut tree = json!({
            "type": item.item_type,
            "amount": item.amount,
            "v": item.data_version,
        });

        if !item.meta.is_empty() {
            let mut meta = Map::with_capacity(item.meta.len() + 1);
            meta.insert(
                META_TYPE_KEY.to_string(),
                Value::from(meta_type_for(&item.item_type)),
            );
            meta.extend(item.meta.iter().map(|(k, v)| (k.clone(), v.clone())));
            tree["meta"] = Value::Object(meta);
        }

        Ok(tree)
    }

    fn native_decode(&self, tree: &Tree) -> HostResult<Item> {
        let root = tree
            .as_object()
            .ok_or_else(|| HostError::Decode("tree root is not a map".into()))?;

        let item_type = root
            .get("type")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| HostError::Decode("missing item type".into()))?;

        let amount = root
            .get("amount")
            .and_then(Value::as_u64)
            .and_then(|a| u32::try_from(a).ok())
            .filter(|a| *a > 0)
            .ok_or_else(|| HostError::Decode("missing or invalid amount".into()))?;

        let stored_version = root.get("v").and_then(Value::as_u64).unwrap_or(0);
        if stored_version > u64::from(self.data_version) {
            return Err(HostError::Decode(format!(
                "item data version {stored_version} is newer than host data version {}",
                self.data_version
            )));
        }

        let mut meta = match root.get("meta") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(meta)) => meta.clone(),
            Some(_) => return Err(HostError::Decode("meta is not a map".into())),
        };
        meta.remove(META_TYPE_KEY);

        if let Some(owner) = meta.get("skull-owner").and_then(Value::as_object) {
            if let Some(id) = owner.get("uniqueId") {
                id.as_str()
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .ok_or_else(|| HostError::Decode("owner uniqueId is not a UUID".into()))?;
            }
            let empty_name = owner.get("name").and_then(Value::as_str) == Some("");
            if empty_name && self.empty_name_defect_active() {
                debug!(host_version = %self.version, "owner profile with empty name rejected");
                return Err(HostError::Defect(
                    "NullPointerException: owner profile name filtered to empty".into(),
                ));
            }
        }

        Ok(Item {
            item_type: item_type.to_string(),
            amount,
            meta,
            data_version: self.data_version,
        })
    }

    fn legacy_encode(&self, items: &[Item]) -> HostResult<Vec<u8>> {
        legacy::encode(items)
    }

    fn legacy_decode(&self, bytes: &[u8]) -> HostResult<Vec<Item>> {
        legacy::decode(bytes)
    }
}
