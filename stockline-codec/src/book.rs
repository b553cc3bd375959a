use serde_json::Value;
use stockline_types::Item;

const WRITTEN_BOOK: &str = "WRITTEN_BOOK";

/// Repairs written books restored from the legacy format, which may carry
/// null or non-text pages and no generation.
///
/// Returns true if the item was changed.
pub(crate) fn repair_legacy_book(item: &mut Item) -> bool {
    if !item.is_type(WRITTEN_BOOK) {
        return false;
    }

    let mut changed = false;

    if let Some(Value::Array(pages)) = item.meta.get_mut("pages") {
        let before = pages.len();
        pages.retain(|page| !page.is_null());
        changed |= pages.len() != before;

        for page in pages.iter_mut() {
            if !page.is_string() {
                *page = Value::String(page.to_string());
                changed = true;
            }
        }
    }

    if !item.meta.contains_key("generation") {
        item.meta.insert("generation".into(), Value::from(0));
        changed = true;
    }

    changed
}
