use crate::field::{is_bare_base64, is_tagged, FieldState, ALT_SEPARATOR, ITEM_SEPARATOR};
use crate::positional::{is_continuation, row_fields, PositionalRow, MIN_FIELDS};
use crate::{
    MigrationConfig, MigrationError, MigrationReport, MigrationResult, CURRENT_DATA_VERSION,
};
use std::path::PathBuf;
use std::sync::Arc;
use stockline_codec::{preview, ItemCodec, MODERN_PREFIX};
use stockline_store::{RecordStore, StoreDocument, StoreError};
use stockline_types::Item;
use tracing::{debug, error, info, warn};

/// Brings a record store up to the best safe encoding generation.
///
/// A run has two passes:
///
/// 1. **Full pass**, only when the store's `DataVersion` is below
///    [`CURRENT_DATA_VERSION`]: every item list and misc list of every shop
///    is converted, quarantining items a relevant detector flags.
/// 2. **Re-migration pass**, on every run where no detector is relevant to
///    the host: `LEGACY:` and bare base64 records are decoded and rewritten
///    when they now encode as `MODERN:`.
///
/// The store is backed up before the first mutation and persisted once at
/// the end, only if something changed or the version was outdated.
pub struct MigrationEngine {
    codec: Arc<ItemCodec>,
    config: MigrationConfig,
}

impl MigrationEngine {
    #[must_use]
    pub fn new(codec: Arc<ItemCodec>, config: MigrationConfig) -> Self {
        Self { codec, config }
    }

    #[must_use]
    pub fn codec(&self) -> &ItemCodec {
        &self.codec
    }

    #[must_use]
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Migrates the store.
    ///
    /// Fails only when the store cannot be loaded, backed up, or saved.
    /// A missing store is not an error: there is nothing to migrate.
    pub fn run(&self, store: &dyn RecordStore) -> MigrationResult<MigrationReport> {
        let mut document = match store.load() {
            Ok(document) => document,
            Err(StoreError::NotFound(path)) => {
                info!(path = %path.display(), "no store found, nothing to migrate");
                return Ok(MigrationReport::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut report = MigrationReport {
            data_version_before: document.data_version(),
            shops: document.shop_count(),
            ..MigrationReport::default()
        };

        let outdated = report.data_version_before < CURRENT_DATA_VERSION;
        let mut changed = false;

        if outdated {
            info!(
                from = report.data_version_before,
                to = CURRENT_DATA_VERSION,
                shops = report.shops,
                "converting store data"
            );
            report.backup_path = Some(backup(store)?);
            changed |= self.full_pass(&mut document, &mut report);
            document.set_data_version(CURRENT_DATA_VERSION);
        } else {
            info!(data_version = report.data_version_before, "store data is current");
        }

        if self.config.remigrate_quarantined && self.codec.checker().count_relevant() == 0 {
            // Records the full pass already counted as unparseable are not counted twice.
            let promoted = self.remigration_pass(&mut document, &mut report, !outdated);
            if promoted && report.backup_path.is_none() {
                report.backup_path = Some(backup(store)?);
            }
            changed |= promoted;
        }

        if outdated || changed {
            store.save(&document)?;
            report.persisted = true;
        }

        report.log_summary();
        Ok(report)
    }

    // ── Full pass ────────────────────────────────────────────────

    fn full_pass(&self, document: &mut StoreDocument, report: &mut MigrationReport) -> bool {
        let mut changed = false;

        for shop in document.shop_ids() {
            match document.items(&shop) {
                Ok(Some(items)) if !items.is_empty() => {
                    let migrated = self.migrate_item_list(&shop, &items, report);
                    if migrated != items {
                        changed |= store_list(document, &shop, "items", migrated);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(shop = %shop, error = %e, "item list skipped"),
            }

            match document.misc(&shop) {
                Ok(Some(misc)) if !misc.is_empty() => {
                    let migrated = self.migrate_misc(&shop, &misc, report);
                    if migrated != misc {
                        changed |= store_list(document, &shop, "misc", migrated);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(shop = %shop, error = %e, "misc list skipped"),
            }
        }

        changed
    }

    /// Migrates one item list.
    ///
    /// A list whose first entry is a positional row is read as a historical
    /// positional list, where a short entry may be the continuation of the
    /// row before it. Otherwise every entry is handled by its own tag.
    pub(crate) fn migrate_item_list(
        &self,
        shop: &str,
        items: &[String],
        report: &mut MigrationReport,
    ) -> Vec<String> {
        let positional = items
            .first()
            .is_some_and(|first| FieldState::of(first) == FieldState::LegacyUntagged);

        let mut out = Vec::with_capacity(items.len());
        let mut i = 0;
        while i < items.len() {
            let entry = items[i].as_str();
            if positional && !is_tagged(entry) {
                let next = items.get(i + 1).map(String::as_str);
                let consumed = self.migrate_positional(shop, entry, next, report, &mut out);
                i += consumed;
                continue;
            }

            let migrated = match FieldState::of(entry) {
                FieldState::Modern => {
                    report.already_modern += 1;
                    entry.to_string()
                }
                FieldState::LegacyTagged => self.migrate_tagged(shop, entry, report),
                FieldState::LegacyUntagged => {
                    self.migrate_positional(shop, entry, None, report, &mut out);
                    i += 1;
                    continue;
                }
                FieldState::Unparseable => {
                    if !entry.is_empty() {
                        report.unparseable += 1;
                        warn!(shop = %shop, "unrecognised item record left untouched");
                    }
                    entry.to_string()
                }
            };
            out.push(migrated);
            i += 1;
        }
        out
    }

    /// Converts one positional row, absorbing `next` when it is the row's
    /// broken-off payload. Pushes the resulting entries and returns how many
    /// input entries were consumed.
    fn migrate_positional(
        &self,
        shop: &str,
        row: &str,
        next: Option<&str>,
        report: &mut MigrationReport,
        out: &mut Vec<String>,
    ) -> usize {
        let field_count = row_fields(row).len();
        if field_count < MIN_FIELDS {
            let migrated = if is_bare_base64(row) {
                self.migrate_tagged(shop, row, report)
            } else {
                report.unparseable += 1;
                warn!(shop = %shop, fields = field_count, "positional row too short, left untouched");
                row.to_string()
            };
            out.push(migrated);
            return 1;
        }

        // A continuation is only absorbed when it lands in the payload field.
        let merged = next
            .filter(|n| is_continuation(field_count, n))
            .and_then(|n| PositionalRow::parse(&format!("{row}{ALT_SEPARATOR}{n}")).ok())
            .filter(|parsed| parsed.payload.is_some());

        let (parsed, consumed) = match merged {
            Some(parsed) => (parsed, 2),
            None => match PositionalRow::parse(row) {
                Ok(parsed) => (parsed, 1),
                Err(e) => {
                    report.unparseable += 1;
                    warn!(shop = %shop, error = %e, "positional row could not be converted, left untouched");
                    out.push(row.to_string());
                    return 1;
                }
            },
        };

        let item = self.convert_positional(shop, &parsed);
        match self.transition(shop, &item, report) {
            Some(record) => out.push(record),
            None => {
                report.unparseable += 1;
                out.push(row.to_string());
                if let Some(next) = next.filter(|_| consumed == 2) {
                    out.push(next.to_string());
                }
            }
        }
        consumed
    }

    fn convert_positional(&self, shop: &str, row: &PositionalRow) -> Item {
        if row.book_id.is_some() || row.meta_id.is_some() {
            debug!(
                shop = %shop,
                book_id = ?row.book_id,
                meta_id = ?row.meta_id,
                "positional lookup ids have no table here and are dropped"
            );
        }

        if let Some(payload) = &row.payload {
            match self.codec.decode_legacy_payload(payload) {
                Ok(item) => return item,
                Err(e) => {
                    debug!(shop = %shop, error = %e, "embedded payload unreadable, using positional fields");
                }
            }
        }

        row.to_item()
    }

    /// Decodes a `LEGACY:` or bare base64 record and re-encodes it.
    fn migrate_tagged(&self, shop: &str, text: &str, report: &mut MigrationReport) -> String {
        let decoded = match self.codec.try_decode(text) {
            Ok(decoded) => decoded,
            Err(e) => {
                if self.codec.config().verbose_diagnostics {
                    warn!(
                        shop = %shop,
                        error = %e,
                        preview = %preview(text, self.codec.config().preview_len),
                        "legacy record could not be decoded, left untouched"
                    );
                } else {
                    warn!(shop = %shop, error = %e, "legacy record could not be decoded, left untouched");
                }
                None
            }
        };

        match decoded.and_then(|item| self.transition(shop, &item, report)) {
            Some(record) => record,
            None => {
                report.unparseable += 1;
                text.to_string()
            }
        }
    }

    /// Encodes a decoded item: legacy when a detector flags it, modern
    /// otherwise, legacy again if the modern encoder faults.
    fn transition(&self, shop: &str, item: &Item, report: &mut MigrationReport) -> Option<String> {
        let finding = self.codec.checker().classify(item);

        if finding.is_none() {
            match self.codec.encode_modern(item) {
                Ok(record) => {
                    report.converted += 1;
                    return Some(record.into_string());
                }
                Err(e) => {
                    warn!(
                        shop = %shop,
                        item_type = %item.item_type,
                        error = %e,
                        "modern encode failed, keeping item in legacy format"
                    );
                }
            }
        }

        match self.codec.encode_legacy(item) {
            Ok(record) => {
                report.record_quarantine(finding);
                Some(record.into_string())
            }
            Err(e) => {
                warn!(
                    shop = %shop,
                    item_type = %item.item_type,
                    error = %e,
                    "item could not be re-encoded, left untouched"
                );
                None
            }
        }
    }

    /// Strips historical `|` prefixes from misc values and migrates
    /// container entries.
    pub(crate) fn migrate_misc(
        &self,
        shop: &str,
        misc: &[String],
        report: &mut MigrationReport,
    ) -> Vec<String> {
        misc.iter()
            .map(|entry| {
                let Some((key, value)) = entry.split_once(':') else {
                    return entry.clone();
                };
                let value = value.split_once('|').map_or(value, |(_, rest)| rest);

                if self.config.is_container_key(key) {
                    if let Some(migrated) = self.migrate_container(shop, key, value, report) {
                        report.containers_migrated += 1;
                        return format!("{key}:{migrated}");
                    }
                }
                format!("{key}:{value}")
            })
            .collect()
    }

    /// Re-splits a container value on `~` and migrates each record.
    /// Returns `None` when the value is left as it was.
    fn migrate_container(
        &self,
        shop: &str,
        key: &str,
        value: &str,
        report: &mut MigrationReport,
    ) -> Option<String> {
        let single_line_modern = value.starts_with(MODERN_PREFIX) && !value.contains('\n');
        if value.is_empty() || value == "~" || single_line_modern {
            return None;
        }

        let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        let migrated: Vec<String> = compact
            .split(ITEM_SEPARATOR)
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| match FieldState::of(chunk) {
                FieldState::Modern => {
                    report.already_modern += 1;
                    chunk.to_string()
                }
                FieldState::LegacyTagged => self.migrate_tagged(shop, chunk, report),
                FieldState::LegacyUntagged | FieldState::Unparseable => {
                    report.unparseable += 1;
                    warn!(shop = %shop, key = %key, "unrecognised container record left untouched");
                    chunk.to_string()
                }
            })
            .collect();

        if migrated.is_empty() {
            return None;
        }

        let joined = migrated.join("~");
        (joined != value).then_some(joined)
    }

    // ── Re-migration pass ────────────────────────────────────────

    fn remigration_pass(
        &self,
        document: &mut StoreDocument,
        report: &mut MigrationReport,
        count_failures: bool,
    ) -> bool {
        let mut changed = false;

        for shop in document.shop_ids() {
            if let Ok(Some(items)) = document.items(&shop) {
                let mut shop_changed = false;
                let mut promoted = Vec::with_capacity(items.len());
                for entry in &items {
                    match self.promote(&shop, entry, report, count_failures) {
                        Some(record) => {
                            report.promoted += 1;
                            shop_changed = true;
                            promoted.push(record);
                        }
                        None => promoted.push(entry.clone()),
                    }
                }
                if shop_changed {
                    changed |= store_list(document, &shop, "items", promoted);
                }
            }

            if let Ok(Some(misc)) = document.misc(&shop) {
                let mut shop_changed = false;
                let mut promoted = Vec::with_capacity(misc.len());
                for entry in &misc {
                    match self.promote_container(&shop, entry, report, count_failures) {
                        Some(rewritten) => {
                            shop_changed = true;
                            promoted.push(rewritten);
                        }
                        None => promoted.push(entry.clone()),
                    }
                }
                if shop_changed {
                    changed |= store_list(document, &shop, "misc", promoted);
                }
            }
        }

        if report.promoted > 0 {
            info!(promoted = report.promoted, "quarantined records promoted to modern format");
        }
        changed
    }

    /// Returns the `MODERN:` form of a legacy record, if it now has one.
    fn promote(
        &self,
        shop: &str,
        text: &str,
        report: &mut MigrationReport,
        count_failures: bool,
    ) -> Option<String> {
        if FieldState::of(text) != FieldState::LegacyTagged {
            return None;
        }

        let Some(item) = self.codec.decode(text) else {
            if count_failures {
                report.unparseable += 1;
            }
            return None;
        };
        match self.codec.encode(&item) {
            Ok(record) if record.is_modern() => {
                debug!(shop = %shop, item_type = %item.item_type, "promoted quarantined record");
                Some(record.into_string())
            }
            Ok(_) => None,
            Err(e) => {
                warn!(shop = %shop, error = %e, "quarantined record could not be promoted");
                None
            }
        }
    }

    fn promote_container(
        &self,
        shop: &str,
        entry: &str,
        report: &mut MigrationReport,
        count_failures: bool,
    ) -> Option<String> {
        let (key, value) = entry.split_once(':')?;
        if !self.config.is_container_key(key) {
            return None;
        }

        let mut any = false;
        let chunks: Vec<String> = value
            .split(ITEM_SEPARATOR)
            .map(|chunk| match self.promote(shop, chunk, report, count_failures) {
                Some(record) => {
                    report.promoted += 1;
                    any = true;
                    record
                }
                None => chunk.to_string(),
            })
            .collect();

        any.then(|| format!("{key}:{}", chunks.join("~")))
    }
}

fn backup(store: &dyn RecordStore) -> MigrationResult<PathBuf> {
    store.backup().map_err(|e| {
        error!(error = %e, "could not back up store, migration aborted");
        MigrationError::BackupFailed(e)
    })
}

/// Writes a migrated list back. Returns false if the write was refused.
fn store_list(document: &mut StoreDocument, shop: &str, field: &str, values: Vec<String>) -> bool {
    match document.set_string_list(shop, field, values) {
        Ok(()) => true,
        Err(e) => {
            warn!(shop = %shop, field, error = %e, "migrated list could not be stored");
            false
        }
    }
}
