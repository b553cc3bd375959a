use serde::{Deserialize, Serialize};

/// Codec limits and diagnostics switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Repair page and generation fields of legacy written books.
    pub written_book_fix: bool,
    /// Longest payload text accepted for decoding.
    pub max_payload_len: usize,
    /// Deepest tree walked by pre-validation.
    pub max_tree_depth: usize,
    /// Characters of a failing record included in diagnostics.
    pub preview_len: usize,
    /// Log a preview of records that fail to decode.
    pub verbose_diagnostics: bool,
}

impl CodecConfig {
    pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 1024 * 1024;
    pub const DEFAULT_MAX_TREE_DEPTH: usize = 64;
    pub const DEFAULT_PREVIEW_LEN: usize = 100;
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            written_book_fix: true,
            max_payload_len: Self::DEFAULT_MAX_PAYLOAD_LEN,
            max_tree_depth: Self::DEFAULT_MAX_TREE_DEPTH,
            preview_len: Self::DEFAULT_PREVIEW_LEN,
            verbose_diagnostics: false,
        }
    }
}
