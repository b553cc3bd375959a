use crate::book::repair_legacy_book;
use crate::tree::validate_tree;
use crate::{CodecConfig, CodecError, CodecResult, RecordTag, SerializedRecord};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use stockline_compat::CompatibilityChecker;
use stockline_types::{HostPlatform, Item, Tree};
use tracing::{debug, error, warn};

/// Key wrapping the host tree inside a modern payload.
const ITEM_SECTION: &str = "item";

/// Converts items to and from tagged single-line records.
///
/// Encoding prefers the modern structured-tree form. Items a relevant
/// detector flags are quarantined in the legacy binary form instead, and a
/// modern encode that faults falls back to legacy as well. Decoding never
/// panics and never lets a host fault escape [`decode`](Self::decode).
///
/// The codec holds no mutable state and can be shared across threads.
pub struct ItemCodec {
    host: Arc<dyn HostPlatform>,
    checker: CompatibilityChecker,
    config: CodecConfig,
    reject_corrupt_trees: bool,
}

impl ItemCodec {
    #[must_use]
    pub fn new(
        host: Arc<dyn HostPlatform>,
        checker: CompatibilityChecker,
        config: CodecConfig,
    ) -> Self {
        let reject_corrupt_trees = checker.count_relevant() > 0;
        Self {
            host,
            checker,
            config,
            reject_corrupt_trees,
        }
    }

    /// Codec with the default detector registry for the host's version.
    #[must_use]
    pub fn for_host(host: Arc<dyn HostPlatform>, config: CodecConfig) -> Self {
        let checker = CompatibilityChecker::new(host.version());
        Self::new(host, checker, config)
    }

    #[must_use]
    pub fn host(&self) -> &dyn HostPlatform {
        self.host.as_ref()
    }

    #[must_use]
    pub fn checker(&self) -> &CompatibilityChecker {
        &self.checker
    }

    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    // ── Encoding ─────────────────────────────────────────────────

    /// Encodes an item through the best available generation.
    pub fn encode(&self, item: &Item) -> CodecResult<SerializedRecord> {
        if let Some(finding) = self.checker.classify(item) {
            warn!(
                item_type = %item.item_type,
                finding = finding.id(),
                remediation = finding.remediation(),
                "quarantining item in legacy format"
            );
            return self.encode_legacy(item).map_err(|e| {
                error!(item_type = %item.item_type, error = %e, "legacy encode of quarantined item failed");
                CodecError::EncodeFailed(e.to_string())
            });
        }

        match self.encode_modern(item) {
            Ok(record) => Ok(record),
            Err(modern) => {
                warn!(
                    item_type = %item.item_type,
                    error = %modern,
                    "modern encode failed; falling back to legacy"
                );
                self.encode_legacy(item).map_err(|legacy| {
                    error!(
                        item_type = %item.item_type,
                        modern = %modern,
                        legacy = %legacy,
                        "item could not be encoded"
                    );
                    CodecError::EncodeFailed(format!("modern: {modern}; legacy: {legacy}"))
                })
            }
        }
    }

    /// Encodes as `MODERN:`, without fallback.
    pub fn encode_modern(&self, item: &Item) -> CodecResult<SerializedRecord> {
        let tree = self.host.native_encode(item)?;
        let text = serde_json::to_string(&json!({ ITEM_SECTION: tree }))?;
        Ok(SerializedRecord::modern(&BASE64.encode(text)))
    }

    /// Encodes as `LEGACY:`, without consulting detectors.
    pub fn encode_legacy(&self, item: &Item) -> CodecResult<SerializedRecord> {
        let bytes = self.host.legacy_encode(std::slice::from_ref(item))?;
        Ok(SerializedRecord::legacy(&BASE64.encode(bytes)))
    }

    // ── Decoding ─────────────────────────────────────────────────

    /// Decodes a record, returning `None` for empty text and for any
    /// failure. Failures are logged.
    pub fn decode(&self, text: &str) -> Option<Item> {
        match self.try_decode(text) {
            Ok(item) => item,
            Err(e) => {
                if self.config.verbose_diagnostics {
                    warn!(
                        error = %e,
                        preview = %preview(text, self.config.preview_len),
                        "failed to decode record"
                    );
                } else {
                    warn!(error = %e, "failed to decode record");
                }
                None
            }
        }
    }

    /// Decodes a record, reporting why it failed.
    ///
    /// Empty text is `Ok(None)`. Decoded items are normalised to the host's
    /// current data epoch.
    pub fn try_decode(&self, text: &str) -> CodecResult<Option<Item>> {
        let Some(tag) = RecordTag::of(text) else {
            return Ok(None);
        };

        let payload = tag.payload(text);
        self.check_payload_len(payload)?;

        let item = match tag {
            RecordTag::Modern => self.decode_modern(payload)?,
            RecordTag::Legacy | RecordTag::Untagged => self.decode_legacy_payload(payload)?,
        };

        Ok(Some(self.normalize(item)))
    }

    fn decode_modern(&self, payload: &str) -> CodecResult<Item> {
        let tree = match parse_modern_tree(payload) {
            Ok(tree) => tree,
            Err(modern) => {
                debug!(error = %modern, "payload is not a modern tree; trying legacy decode");
                return self.decode_legacy_payload(payload).map_err(|legacy| {
                    CodecError::BothPathsFailed {
                        modern: modern.to_string(),
                        legacy: legacy.to_string(),
                    }
                });
            }
        };

        validate_tree(&tree, self.config.max_tree_depth, self.reject_corrupt_trees)?;
        Ok(self.host.native_decode(&tree)?)
    }

    /// Decodes an untagged legacy base64 payload to its first item.
    ///
    /// The payload is bounded by `max_payload_len`. The item is not normalised.
    pub fn decode_legacy_payload(&self, payload: &str) -> CodecResult<Item> {
        self.check_payload_len(payload)?;
        let bytes = BASE64.decode(payload)?;
        let mut items = self.host.legacy_decode(&bytes)?;
        if items.is_empty() {
            return Err(CodecError::EmptyLegacyPayload);
        }

        let mut item = items.swap_remove(0);
        if self.config.written_book_fix && repair_legacy_book(&mut item) {
            debug!("repaired legacy written book");
        }
        Ok(item)
    }

    fn check_payload_len(&self, payload: &str) -> CodecResult<()> {
        if payload.len() > self.config.max_payload_len {
            return Err(CodecError::PayloadTooLarge {
                len: payload.len(),
                max: self.config.max_payload_len,
            });
        }
        Ok(())
    }

    /// Runs one host encode/decode cycle to stamp the current data epoch.
    /// On a host fault the item is returned as given.
    #[must_use]
    pub fn normalize(&self, item: Item) -> Item {
        match self
            .host
            .native_encode(&item)
            .and_then(|tree| self.host.native_decode(&tree))
        {
            Ok(normalized) => normalized,
            Err(e) => {
                debug!(
                    item_type = %item.item_type,
                    error = %e,
                    "version normalisation failed; keeping item as decoded"
                );
                item
            }
        }
    }

    // ── Format checks ────────────────────────────────────────────

    #[must_use]
    pub fn is_modern_format(text: &str) -> bool {
        RecordTag::of(text) == Some(RecordTag::Modern)
    }

    /// True for `LEGACY:` and untagged non-empty text.
    #[must_use]
    pub fn is_legacy_format(text: &str) -> bool {
        RecordTag::of(text).is_some_and(RecordTag::is_legacy)
    }
}

impl fmt::Debug for ItemCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemCodec")
            .field("host_version", &self.host.version())
            .field("data_version", &self.host.data_version())
            .field("checker", &self.checker)
            .field("config", &self.config)
            .finish()
    }
}

fn parse_modern_tree(payload: &str) -> CodecResult<Tree> {
    let bytes = BASE64.decode(payload)?;
    let text = String::from_utf8(bytes)?;
    let mut root: Value = serde_json::from_str(&text)?;
    root.get_mut(ITEM_SECTION)
        .map(Value::take)
        .filter(|tree| !tree.is_null())
        .ok_or(CodecError::MissingItemSection)
}

/// First `len` characters of `text`, with `...` appended when cut.
#[must_use]
pub fn preview(text: &str, len: usize) -> String {
    match text.char_indices().nth(len) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
