use pretty_assertions::assert_eq;
use serde_json::json;
use stockline_host::{ReferenceHost, EMPTY_NAME_DEFECT_SINCE};
use stockline_types::{HostError, HostPlatform, HostVersion, Item};

fn affected_host() -> ReferenceHost {
    ReferenceHost::new(EMPTY_NAME_DEFECT_SINCE)
}

fn empty_name_head() -> Item {
    Item::new("PLAYER_HEAD", 1).with_meta(
        "skull-owner",
        json!({ "name": "", "uniqueId": "00000000-0000-0000-0000-000000000000" }),
    )
}

// ── Native tree ──────────────────────────────────────────────────

#[test]
fn native_round_trip_stamps_current_epoch() {
    let host = affected_host().with_data_version(100);
    let item = Item::new("STONE", 5).with_data_version(40);

    let tree = host.native_encode(&item).unwrap();
    assert_eq!(tree, json!({ "type": "STONE", "amount": 5, "v": 40 }));

    let decoded = host.native_decode(&tree).unwrap();
    assert_eq!(decoded, Item::new("STONE", 5).with_data_version(100));
}

#[test]
fn native_tree_carries_meta_discriminator() {
    let host = affected_host();
    let book = Item::new("WRITTEN_BOOK", 1).with_meta("pages", json!(["a"]));
    let tree = host.native_encode(&book).unwrap();
    assert_eq!(tree["meta"]["meta-type"], json!("BOOK_SIGNED"));

    let decoded = host.native_decode(&tree).unwrap();
    assert!(decoded.same_content(&book));
    assert!(!decoded.meta.contains_key("meta-type"));
}

#[test]
fn native_encode_rejects_reserved_key_and_bad_shapes() {
    let host = affected_host();
    let reserved = Item::new("STONE", 1).with_meta("meta-type", json!("SKULL"));
    assert!(matches!(host.native_encode(&reserved), Err(HostError::Encode(_))));
    assert!(host.native_encode(&Item::new("STONE", 0)).is_err());
    assert!(host.native_encode(&Item::new("", 1)).is_err());
}

#[test]
fn native_decode_rejects_newer_epoch() {
    let host = affected_host().with_data_version(10);
    let tree = json!({ "type": "STONE", "amount": 1, "v": 11 });
    assert!(matches!(host.native_decode(&tree), Err(HostError::Decode(_))));
}

#[test]
fn native_decode_rejects_malformed_trees() {
    let host = affected_host();
    assert!(host.native_decode(&json!([1, 2])).is_err());
    assert!(host.native_decode(&json!({ "amount": 1 })).is_err());
    assert!(host.native_decode(&json!({ "type": "STONE", "amount": 0 })).is_err());
    assert!(host
        .native_decode(&json!({ "type": "STONE", "amount": 1, "meta": "x" }))
        .is_err());
}

#[test]
fn native_decode_validates_owner_uuid() {
    let host = ReferenceHost::new(HostVersion::new(1, 20, 4));
    let tree = json!({
        "type": "PLAYER_HEAD",
        "amount": 1,
        "meta": { "skull-owner": { "name": "Notch", "uniqueId": "not-a-uuid" } }
    });
    assert!(host.native_decode(&tree).is_err());
}

// ── Empty owner name defect ──────────────────────────────────────

#[test]
fn empty_owner_name_faults_on_affected_host() {
    let host = affected_host();
    let tree = host.native_encode(&empty_name_head()).unwrap();
    assert!(matches!(host.native_decode(&tree), Err(HostError::Defect(_))));
}

#[test]
fn empty_owner_name_decodes_before_and_after_defect_window() {
    let old = ReferenceHost::new(HostVersion::new(1, 21, 4));
    let fixed = ReferenceHost::new(HostVersion::new(1, 21, 12))
        .with_defect_fixed_in(HostVersion::new(1, 21, 12));

    for host in [old, fixed] {
        assert!(!host.empty_name_defect_active());
        let tree = host.native_encode(&empty_name_head()).unwrap();
        let decoded = host.native_decode(&tree).unwrap();
        assert!(decoded.same_content(&empty_name_head()));
    }
}

// ── Legacy binary ────────────────────────────────────────────────

#[test]
fn legacy_round_trip_keeps_stored_epoch() {
    let host = affected_host();
    let items = vec![
        Item::new("STONE", 3).with_data_version(7),
        empty_name_head().with_data_version(9),
    ];

    let bytes = host.legacy_encode(&items).unwrap();
    assert!(bytes.starts_with(b"SLOG"));
    assert_eq!(host.legacy_decode(&bytes).unwrap(), items);
}

#[test]
fn legacy_decode_rejects_foreign_bytes() {
    let host = affected_host();
    assert!(host.legacy_decode(b"").is_err());
    assert!(host.legacy_decode(b"SLOG").is_err());
    assert!(host.legacy_decode(b"SLOG\x02\x00").is_err());
    assert!(host.legacy_decode(b"{\"item\":{}}").is_err());
}

#[test]
fn legacy_empty_list_round_trips() {
    let host = affected_host();
    let bytes = host.legacy_encode(&[]).unwrap();
    assert!(host.legacy_decode(&bytes).unwrap().is_empty());
}
