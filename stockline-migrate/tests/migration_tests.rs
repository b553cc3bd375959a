mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use stockline_codec::ItemCodec;
use stockline_compat::Incompatibility;
use stockline_migrate::{MigrationError, CURRENT_DATA_VERSION};
use stockline_store::{JsonFileStore, RecordStore, StoreDocument, StoreError, StoreResult};
use stockline_types::Item;
use tempfile::TempDir;

fn items_of(store: &JsonFileStore, shop: &str) -> Vec<String> {
    store.load().unwrap().items(shop).unwrap().unwrap()
}

fn misc_of(store: &JsonFileStore, shop: &str) -> Vec<String> {
    store.load().unwrap().misc(shop).unwrap().unwrap()
}

// ── Mixed store ──────────────────────────────────────────────────

#[test]
fn mixed_store_converts_clean_entries_and_quarantines_flagged_ones() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let codec = affected_codec();

    let modern = codec.encode(&Item::new("STONE", 5)).unwrap().into_string();
    let flagged = codec.encode(&empty_name_head()).unwrap().into_string();
    assert!(flagged.starts_with("LEGACY:"));

    let store = write_store(
        dir.path(),
        json!({
            "DataVersion": 3,
            "sellers": {
                "a-modern": { "items": [modern.clone()], "misc": [] },
                "b-positional": { "items": ["5|STONE|0|0"], "misc": [] },
                "c-flagged": { "items": [flagged], "misc": [] }
            }
        }),
    );

    let report = engine(codec.clone()).run(&store).unwrap();

    assert_eq!(items_of(&store, "a-modern"), vec![modern]);

    let converted = items_of(&store, "b-positional");
    assert_eq!(converted.len(), 1);
    assert!(ItemCodec::is_modern_format(&converted[0]));
    let stone = codec.decode(&converted[0]).unwrap();
    assert!(stone.same_content(&Item::new("STONE", 5)));

    let quarantined = items_of(&store, "c-flagged");
    assert!(quarantined[0].starts_with("LEGACY:"));

    assert_eq!(report.shops, 3);
    assert_eq!(report.already_modern, 1);
    assert_eq!(report.converted, 1);
    assert_eq!(report.quarantined, 1);
    assert_eq!(report.unparseable, 0);
    assert_eq!(report.findings.get(&Incompatibility::PlayerHeadEmptyName), Some(&1));
    assert!(report.persisted);
    assert_eq!(store.load().unwrap().data_version(), CURRENT_DATA_VERSION);
}

#[test]
fn bare_base64_entries_are_upgraded() {
    let dir = TempDir::new().unwrap();
    let codec = affected_codec();
    let store = write_store(
        dir.path(),
        json!({
            "DataVersion": 3,
            "sellers": {
                "s": {
                    "items": [
                        bare_legacy(&codec, &Item::new("DIRT", 2)),
                        format!("LEGACY:{}", bare_legacy(&codec, &Item::new("SAND", 3)))
                    ]
                }
            }
        }),
    );

    let report = engine(codec.clone()).run(&store).unwrap();

    let items = items_of(&store, "s");
    assert!(items.iter().all(|i| i.starts_with("MODERN:")));
    assert_eq!(codec.decode(&items[0]).unwrap().item_type, "DIRT");
    assert_eq!(codec.decode(&items[1]).unwrap().amount, 3);
    assert_eq!(report.converted, 2);
}

#[test]
fn undecodable_entries_are_kept_verbatim() {
    let dir = TempDir::new().unwrap();
    let store = write_store(
        dir.path(),
        json!({
            "DataVersion": 3,
            "sellers": { "s": { "items": ["LEGACY:!!!!", "QUJD", "???"] } }
        }),
    );

    let report = engine(affected_codec()).run(&store).unwrap();

    assert_eq!(
        items_of(&store, "s"),
        vec!["LEGACY:!!!!".to_string(), "QUJD".to_string(), "???".to_string()]
    );
    assert_eq!(report.unparseable, 3);
    assert!(report.persisted);
}

// ── Backup and persistence ───────────────────────────────────────

#[test]
fn outdated_store_is_backed_up_before_conversion() {
    let dir = TempDir::new().unwrap();
    let store = write_store(
        dir.path(),
        json!({ "DataVersion": 3, "sellers": { "s": { "items": ["5|STONE|0|0"] } } }),
    );
    let original = fs::read_to_string(store.path()).unwrap();

    let report = engine(affected_codec()).run(&store).unwrap();

    let backup = report.backup_path.unwrap();
    assert_eq!(fs::read_to_string(&backup).unwrap(), original);
    assert_eq!(backups(dir.path()).len(), 1);
}

#[test]
fn outdated_store_without_changes_still_records_version() {
    let dir = TempDir::new().unwrap();
    let store = write_store(dir.path(), json!({ "DataVersion": 2, "sellers": {} }));

    let report = engine(affected_codec()).run(&store).unwrap();

    assert!(report.persisted);
    assert_eq!(report.data_version_before, 2);
    assert_eq!(store.load().unwrap().data_version(), CURRENT_DATA_VERSION);
}

/// Store whose backups always fail.
struct NoBackupStore(JsonFileStore);

impl RecordStore for NoBackupStore {
    fn load(&self) -> StoreResult<StoreDocument> {
        self.0.load()
    }

    fn save(&self, document: &StoreDocument) -> StoreResult<()> {
        self.0.save(document)
    }

    fn backup(&self) -> StoreResult<PathBuf> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }
}

#[test]
fn failed_backup_aborts_and_leaves_store_untouched() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let inner = write_store(
        dir.path(),
        json!({ "DataVersion": 3, "sellers": { "s": { "items": ["5|STONE|0|0"] } } }),
    );
    let before = fs::read(inner.path()).unwrap();
    let store = NoBackupStore(inner);

    let result = engine(affected_codec()).run(&store);

    assert!(matches!(result, Err(MigrationError::BackupFailed(_))));
    assert_eq!(fs::read(store.0.path()).unwrap(), before);
}

#[test]
fn missing_store_is_nothing_to_migrate() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("sellers.json"));

    let report = engine(affected_codec()).run(&store).unwrap();

    assert!(!report.persisted);
    assert!(!store.path().exists());
}

#[test]
fn second_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let codec = affected_codec();
    let store = write_store(
        dir.path(),
        json!({
            "DataVersion": 3,
            "sellers": {
                "s": {
                    "items": [
                        "5|STONE|0|0",
                        codec.encode(&empty_name_head()).unwrap().into_string()
                    ],
                    "misc": [format!("chest1:{}", bare_legacy(&codec, &Item::new("DIRT", 1)))]
                }
            }
        }),
    );

    let first = engine(codec.clone()).run(&store).unwrap();
    assert!(first.persisted);
    let after_first = fs::read(store.path()).unwrap();

    let second = engine(codec).run(&store).unwrap();
    assert!(!second.persisted);
    assert_eq!(second.changed_fields(), 0);
    assert_eq!(fs::read(store.path()).unwrap(), after_first);
    assert_eq!(backups(dir.path()).len(), 1);
}

#[test]
fn second_run_on_fixed_host_without_quarantine_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let codec = fixed_codec();
    let store = write_store(
        dir.path(),
        json!({ "DataVersion": 3, "sellers": { "s": { "items": ["5|STONE|0|0"] } } }),
    );

    engine(codec.clone()).run(&store).unwrap();
    let after_first = fs::read(store.path()).unwrap();

    let second = engine(codec).run(&store).unwrap();
    assert!(!second.persisted);
    assert_eq!(fs::read(store.path()).unwrap(), after_first);
}

// ── Re-migration ─────────────────────────────────────────────────

#[test]
fn quarantined_records_are_promoted_once_defect_is_fixed() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let quarantined = affected_codec().encode(&empty_name_head()).unwrap().into_string();
    let store = write_store(
        dir.path(),
        json!({
            "DataVersion": CURRENT_DATA_VERSION,
            "sellers": {
                "s": {
                    "items": [quarantined.clone()],
                    "misc": [format!("chest2:{quarantined}~{quarantined}"), "note:kept"]
                }
            }
        }),
    );

    let codec = fixed_codec();
    let report = engine(codec.clone()).run(&store).unwrap();

    assert_eq!(report.promoted, 3);
    assert!(report.persisted);
    assert!(report.backup_path.is_some());

    let items = items_of(&store, "s");
    assert!(items[0].starts_with("MODERN:"));
    assert!(codec.decode(&items[0]).unwrap().same_content(&empty_name_head()));

    let misc = misc_of(&store, "s");
    let chest = misc[0].strip_prefix("chest2:").unwrap();
    assert!(chest.split('~').all(|r| r.starts_with("MODERN:")));
    assert_eq!(misc[1], "note:kept");
}

#[test]
fn no_promotion_while_a_detector_is_relevant() {
    let dir = TempDir::new().unwrap();
    let codec = affected_codec();
    let quarantined = codec.encode(&empty_name_head()).unwrap().into_string();
    let store = write_store(
        dir.path(),
        json!({ "DataVersion": CURRENT_DATA_VERSION, "sellers": { "s": { "items": [quarantined.clone()] } } }),
    );

    let report = engine(codec).run(&store).unwrap();

    assert_eq!(report.promoted, 0);
    assert!(!report.persisted);
    assert!(report.backup_path.is_none());
    assert_eq!(items_of(&store, "s"), vec![quarantined]);
}

#[test]
fn undecodable_record_is_counted_by_remigration_pass() {
    let dir = TempDir::new().unwrap();
    let store = write_store(
        dir.path(),
        json!({
            "DataVersion": CURRENT_DATA_VERSION,
            "sellers": { "s": { "items": ["LEGACY:%%%"], "misc": ["chest1:LEGACY:%%%"] } }
        }),
    );

    let report = engine(fixed_codec()).run(&store).unwrap();

    assert_eq!(report.unparseable, 2);
    assert_eq!(report.promoted, 0);
    assert!(!report.persisted);
}

#[test]
fn undecodable_record_is_counted_once_per_run() {
    let dir = TempDir::new().unwrap();
    let store = write_store(
        dir.path(),
        json!({ "DataVersion": 2, "sellers": { "s": { "items": ["LEGACY:%%%"] } } }),
    );

    let report = engine(fixed_codec()).run(&store).unwrap();

    assert_eq!(report.unparseable, 1);
    assert_eq!(items_of(&store, "s"), vec!["LEGACY:%%%"]);
}

// ── Misc and containers ──────────────────────────────────────────

#[test]
fn multi_line_container_is_split_and_flattened() {
    let dir = TempDir::new().unwrap();
    let codec = affected_codec();
    let first = bare_legacy(&codec, &Item::new("DIRT", 4));
    let second = bare_legacy(&codec, &Item::new("SAND", 6));
    let (head, tail) = first.split_at(first.len() / 2);
    let wrapped = format!("chest1:{head}\n      {tail}\n~{second}");

    let store = write_store(
        dir.path(),
        json!({ "DataVersion": 3, "sellers": { "s": { "misc": [wrapped, "chest2:~", "chest3:x"] } } }),
    );

    let report = engine(codec.clone()).run(&store).unwrap();

    let misc = misc_of(&store, "s");
    let value = misc[0].strip_prefix("chest1:").unwrap();
    assert!(!value.contains('\n'));
    let records: Vec<&str> = value.split('~').collect();
    assert_eq!(records.len(), 2);
    assert_eq!(codec.decode(records[0]).unwrap().item_type, "DIRT");
    assert_eq!(codec.decode(records[1]).unwrap().amount, 6);

    assert_eq!(misc[1], "chest2:~");
    assert_eq!(misc[2], "chest3:x");
    assert_eq!(report.containers_migrated, 1);
}

#[test]
fn single_line_modern_container_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let codec = affected_codec();
    let modern = codec.encode(&Item::new("STONE", 1)).unwrap().into_string();
    let entry = format!("chest1:{modern}~{modern}");
    let store = write_store(
        dir.path(),
        json!({ "DataVersion": 3, "sellers": { "s": { "misc": [entry.clone()] } } }),
    );

    let report = engine(codec).run(&store).unwrap();

    assert_eq!(misc_of(&store, "s"), vec![entry]);
    assert_eq!(report.containers_migrated, 0);
}

#[test]
fn misc_pipe_prefix_is_stripped() {
    let dir = TempDir::new().unwrap();
    let store = write_store(
        dir.path(),
        json!({
            "DataVersion": 3,
            "sellers": { "s": { "misc": ["sign:old|world/1/2/3", "plain:value", "nocolon"] } }
        }),
    );

    engine(affected_codec()).run(&store).unwrap();

    assert_eq!(
        misc_of(&store, "s"),
        vec![
            "sign:world/1/2/3".to_string(),
            "plain:value".to_string(),
            "nocolon".to_string()
        ]
    );
}

#[test]
fn container_with_unreadable_chunk_keeps_it() {
    let dir = TempDir::new().unwrap();
    let codec = affected_codec();
    let good = bare_legacy(&codec, &Item::new("DIRT", 1));
    let store = write_store(
        dir.path(),
        json!({ "DataVersion": 3, "sellers": { "s": { "misc": [format!("chest1:{good}~QUJD")] } } }),
    );

    let report = engine(codec).run(&store).unwrap();

    let misc = misc_of(&store, "s");
    let value = misc[0].strip_prefix("chest1:").unwrap();
    let records: Vec<&str> = value.split('~').collect();
    assert!(records[0].starts_with("MODERN:"));
    assert_eq!(records[1], "QUJD");
    assert_eq!(report.unparseable, 1);
}
