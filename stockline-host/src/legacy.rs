//! Binary object-graph format used by the legacy encoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stockline_types::{HostError, HostResult, Item};

const MAGIC: &[u8; 4] = b"SLOG";
const FORMAT_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct LegacyFrame {
    item_type: String,
    amount: u32,
    data_version: u32,
    meta_json: String,
}

pub(crate) fn encode(items: &[Item]) -> HostResult<Vec<u8>> {
    let frames = items
        .iter()
        .map(|item| {
            Ok(LegacyFrame {
                item_type: item.item_type.clone(),
                amount: item.amount,
                data_version: item.data_version,
                meta_json: serde_json::to_string(&item.meta)?,
            })
        })
        .collect::<HostResult<Vec<_>>>()?;

    let body = postcard::to_stdvec(&frames).map_err(|e| HostError::Encode(e.to_string()))?;

    let mut out = Vec::with_capacity(MAGIC.len() + 1 + body.len());
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&body);
    Ok(out)
}

pub(crate) fn decode(bytes: &[u8]) -> HostResult<Vec<Item>> {
    let body = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or_else(|| HostError::Decode("not a legacy object stream".into()))?;

    let (&format, body) = body
        .split_first()
        .ok_or_else(|| HostError::Decode("truncated legacy header".into()))?;
    if format != FORMAT_VERSION {
        return Err(HostError::Decode(format!(
            "unsupported legacy format version {format}"
        )));
    }

    let frames: Vec<LegacyFrame> =
        postcard::from_bytes(body).map_err(|e| HostError::Decode(e.to_string()))?;

    frames
        .into_iter()
        .map(|frame| {
            if frame.item_type.is_empty() || frame.amount == 0 {
                return Err(HostError::Decode("legacy frame has no type or amount".into()));
            }
            let meta: Map<String, Value> = serde_json::from_str(&frame.meta_json)?;
            Ok(Item {
                item_type: frame.item_type,
                amount: frame.amount,
                meta,
                data_version: frame.data_version,
            })
        })
        .collect()
}
