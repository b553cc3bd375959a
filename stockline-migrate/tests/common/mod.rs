//! Shared test helpers for migration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use stockline_codec::{CodecConfig, ItemCodec, RecordTag};
use stockline_compat::{CompatibilityChecker, PlayerHeadEmptyNameDetector};
use stockline_host::{ReferenceHost, EMPTY_NAME_DEFECT_SINCE};
use stockline_migrate::{MigrationConfig, MigrationEngine};
use stockline_store::{JsonFileStore, RecordStore, StoreDocument};
use stockline_types::{HostVersion, Item};
use tracing_subscriber::EnvFilter;

/// Host version on which the empty owner name defect is fixed.
pub const FIXED: HostVersion = HostVersion::new(1, 21, 12);

/// Routes logs to the test harness. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Codec for a host affected by the empty owner name defect.
pub fn affected_codec() -> Arc<ItemCodec> {
    Arc::new(ItemCodec::for_host(
        Arc::new(ReferenceHost::new(EMPTY_NAME_DEFECT_SINCE)),
        CodecConfig::default(),
    ))
}

/// Codec for a host where the defect is fixed and no detector is relevant.
pub fn fixed_codec() -> Arc<ItemCodec> {
    let host = Arc::new(ReferenceHost::new(FIXED).with_defect_fixed_in(FIXED));
    let checker = CompatibilityChecker::with_detectors(
        FIXED,
        vec![Box::new(PlayerHeadEmptyNameDetector::fixed_in_version(FIXED))],
    );
    Arc::new(ItemCodec::new(host, checker, CodecConfig::default()))
}

pub fn engine(codec: Arc<ItemCodec>) -> MigrationEngine {
    MigrationEngine::new(codec, MigrationConfig::default())
}

pub fn empty_name_head() -> Item {
    Item::new("PLAYER_HEAD", 1).with_meta(
        "skull-owner",
        json!({ "name": "", "uniqueId": "00000000-0000-0000-0000-000000000000" }),
    )
}

/// Untagged base64 legacy payload for `item`, as historical stores held it.
pub fn bare_legacy(codec: &ItemCodec, item: &Item) -> String {
    let record = codec.encode_legacy(item).unwrap();
    RecordTag::Legacy.payload(record.as_str()).to_string()
}

/// Writes `document` as `sellers.json` under `dir`.
pub fn write_store(dir: &Path, document: Value) -> JsonFileStore {
    let store = JsonFileStore::new(dir.join("sellers.json"));
    store.save(&StoreDocument::from_value(document).unwrap()).unwrap();
    store
}

/// Names of files in `dir` starting with `sellersBackup`.
pub fn backups(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("sellersBackup"))
        .collect();
    names.sort();
    names
}
