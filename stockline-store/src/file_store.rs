use crate::{RecordStore, StoreDocument, StoreError, StoreResult};
use chrono::{DateTime, Local};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A store document kept as a single JSON file.
///
/// Saves write a sibling temp file and rename it over the store, so readers
/// never observe a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backup location for a given time: `<stem>Backup<yyyyMMdd-HHmmss>.<ext>`
    /// next to the store file.
    #[must_use]
    pub fn backup_path_at(&self, at: DateTime<Local>) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut name = format!("{stem}Backup{}", at.format(BACKUP_TIMESTAMP_FORMAT));
        if let Some(ext) = self.path.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> StoreResult<StoreDocument> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        StoreDocument::from_json(&text)
    }

    fn save(&self, document: &StoreDocument) -> StoreResult<()> {
        let text = document.to_json_pretty()?;

        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        tmp.write_all(text.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %self.path.display(), bytes = text.len(), "store saved");
        Ok(())
    }

    fn backup(&self) -> StoreResult<PathBuf> {
        if !self.path.exists() {
            return Err(StoreError::NotFound(self.path.clone()));
        }

        let base = self.backup_path_at(Local::now());
        let mut target = base.clone();
        let mut n = 1;
        while target.exists() {
            let stem = base
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut name = format!("{stem}-{n}");
            if let Some(ext) = base.extension() {
                name.push('.');
                name.push_str(&ext.to_string_lossy());
            }
            target = base.with_file_name(name);
            n += 1;
        }

        fs::copy(&self.path, &target)?;
        info!(
            store = %self.path.display(),
            backup = %target.display(),
            "store backed up"
        );
        Ok(target)
    }
}
