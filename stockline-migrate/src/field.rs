use stockline_codec::RecordTag;

/// Item boundary inside container values and positional rows.
pub const ITEM_SEPARATOR: char = '~';

/// Field separator used by some positional rows and by binary continuations.
pub const ALT_SEPARATOR: char = '|';

/// Migration state of one stored record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// `MODERN:` record. Never rewritten.
    Modern,
    /// `LEGACY:` record or bare base64.
    LegacyTagged,
    /// Pre-versioning positional row, `~` or `|` delimited.
    LegacyUntagged,
    /// Empty or unrecognisable text.
    Unparseable,
}

impl FieldState {
    /// Sniffs the state of a field from its text alone.
    #[must_use]
    pub fn of(text: &str) -> Self {
        match RecordTag::of(text) {
            None => Self::Unparseable,
            Some(RecordTag::Modern) => Self::Modern,
            Some(RecordTag::Legacy) => Self::LegacyTagged,
            Some(RecordTag::Untagged) if is_bare_base64(text) => Self::LegacyTagged,
            Some(RecordTag::Untagged) if text.contains([ITEM_SEPARATOR, ALT_SEPARATOR]) => {
                Self::LegacyUntagged
            }
            Some(RecordTag::Untagged) => Self::Unparseable,
        }
    }
}

/// True if `text` carries an explicit generation tag.
pub(crate) fn is_tagged(text: &str) -> bool {
    matches!(RecordTag::of(text), Some(RecordTag::Modern | RecordTag::Legacy))
}

/// Standard-alphabet base64 with optional padding.
pub(crate) fn is_bare_base64(text: &str) -> bool {
    let body = text.trim_end_matches('=');
    !body.is_empty()
        && text.len() - body.len() <= 2
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}
