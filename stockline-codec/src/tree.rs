//! Tree-level checks run before a modern tree reaches the host.

use crate::{CodecError, CodecResult};
use serde_json::Value;

const SKULL_META_TYPE: &str = "SKULL";

/// Walks `tree` looking for shapes the host is known to crash on.
///
/// Fails with [`CodecError::TooDeep`] past `max_depth` levels. With
/// `reject_corrupt` set, also fails with [`CodecError::CorruptTree`] on a
/// skull meta whose owner name is empty.
pub(crate) fn validate_tree(tree: &Value, max_depth: usize, reject_corrupt: bool) -> CodecResult<()> {
    Walker {
        max_depth,
        reject_corrupt,
    }
    .walk(tree, 0)
}

struct Walker {
    max_depth: usize,
    reject_corrupt: bool,
}

impl Walker {
    fn walk(&self, value: &Value, depth: usize) -> CodecResult<()> {
        if depth > self.max_depth {
            return Err(CodecError::TooDeep(self.max_depth));
        }

        match value {
            Value::Object(map) => {
                if self.reject_corrupt && is_corrupt_skull(map) {
                    return Err(CodecError::CorruptTree(
                        "skull owner profile has an empty name".into(),
                    ));
                }
                map.values().try_for_each(|v| self.walk(v, depth + 1))
            }
            Value::Array(items) => items.iter().try_for_each(|v| self.walk(v, depth + 1)),
            _ => Ok(()),
        }
    }
}

fn is_corrupt_skull(map: &serde_json::Map<String, Value>) -> bool {
    map.get("meta-type").and_then(Value::as_str) == Some(SKULL_META_TYPE)
        && map
            .get("skull-owner")
            .and_then(|owner| owner.get("name"))
            .and_then(Value::as_str)
            == Some("")
}
