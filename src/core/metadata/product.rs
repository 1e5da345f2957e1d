//! Product identifier derivation
//!
//! A product id names "the data for this run/well/tag set" independently of
//! where or how often it was published. It is a SHA-256 over a canonical
//! JSON document, so key order and well label padding never change it.

use crate::domain::ids::{ProductId, WellLabel};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Derives the product id for a run/well/tag set
///
/// The digest input is the compact JSON of
/// `{"plate": <n>, "run": <name>, "tags": "<a,b>", "well": "A1"}` with keys
/// sorted; `tags` is omitted when empty and `plate` when absent.
///
/// # Examples
///
/// ```
/// use seqferry::core::metadata::product_id;
/// use seqferry::domain::WellLabel;
///
/// let padded = WellLabel::new("A01").unwrap();
/// let plain = WellLabel::new("A1").unwrap();
/// assert_eq!(
///     product_id("TRACTION-RUN-1140", &padded, ["bc2001"], None),
///     product_id("TRACTION-RUN-1140", &plain, ["bc2001"], None),
/// );
/// ```
pub fn product_id<I, S>(
    run_name: &str,
    well_label: &WellLabel,
    tags: I,
    plate_number: Option<u8>,
) -> ProductId
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tags: BTreeSet<String> = tags
        .into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    let mut document = Map::new();
    document.insert("run".to_string(), json!(run_name));
    document.insert("well".to_string(), json!(well_label.normalized()));
    if !tags.is_empty() {
        let joined = tags.into_iter().collect::<Vec<_>>().join(",");
        document.insert("tags".to_string(), json!(joined));
    }
    if let Some(plate) = plate_number {
        document.insert("plate".to_string(), json!(plate));
    }

    let canonical = canonical_json(&Value::Object(document)).to_string();

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    ProductId::from_digest(digest)
}

/// Recursively sorts object keys
fn canonical_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: std::collections::BTreeMap<String, Value> =
                std::collections::BTreeMap::new();
            for (k, v) in map {
                sorted.insert(k.clone(), canonical_json(v));
            }
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.iter().map(canonical_json).collect()),
        _ => value.clone(),
    }
}
