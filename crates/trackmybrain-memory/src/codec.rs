//! Snapshot codec for the record collection.
//!
//! The snapshot is a JSON array of records with camelCase fields:
//! `{id, kind, rawText, summary, createdAt, embedding?, mediaUri?}`.
//! Embedding components are written as f32 values, which serde_json prints
//! in shortest round-trip form.

use crate::error::{DecodeError, StorageError};
use crate::model::MemoryRecord;
use log::warn;
use serde_json::Value;

/// Serialize a full collection into snapshot bytes.
///
/// Fails when an embedding holds NaN or infinity, since JSON has no literal
/// for them and the written snapshot would no longer decode.
pub fn encode(records: &[MemoryRecord]) -> Result<Vec<u8>, StorageError> {
    for record in records {
        ensure_finite(record)?;
    }
    Ok(serde_json::to_vec(records)?)
}

/// Deserialize snapshot bytes, degrading to an empty collection.
///
/// Missing, empty, truncated, or wrongly shaped input yields `Vec::new()`
/// and a warning; callers never see the error.
pub fn decode(bytes: Option<&[u8]>) -> Vec<MemoryRecord> {
    let Some(bytes) = bytes else {
        return Vec::new();
    };
    match try_decode(bytes) {
        Ok(records) => records,
        Err(err) => {
            warn!(
                "discarding unreadable memory snapshot (len={}, error={})",
                bytes.len(),
                err
            );
            Vec::new()
        }
    }
}

/// Strict variant of [`decode`] reporting why a snapshot was rejected.
pub fn try_decode(bytes: &[u8]) -> Result<Vec<MemoryRecord>, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    if !value.is_array() {
        return Err(DecodeError::NotACollection(value_kind(&value)));
    }
    let records: Vec<MemoryRecord> = serde_json::from_value(value)?;
    if let Some((id, index)) = records.iter().find_map(non_finite_component) {
        return Err(DecodeError::NonFiniteEmbedding { id, index });
    }
    Ok(records)
}

/// Components beyond the f32 range deserialize as infinity.
fn non_finite_component(record: &MemoryRecord) -> Option<(String, usize)> {
    let embedding = record.embedding.as_deref()?;
    let index = embedding.iter().position(|value| !value.is_finite())?;
    Some((record.id.clone(), index))
}

pub(crate) fn ensure_finite(record: &MemoryRecord) -> Result<(), StorageError> {
    match non_finite_component(record) {
        Some((id, index)) => Err(StorageError::NonFiniteEmbedding { id, index }),
        None => Ok(()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, try_decode};
    use crate::error::{DecodeError, StorageError};
    use crate::model::{MemoryKind, MemoryRecord};
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<MemoryRecord> {
        vec![
            MemoryRecord::new("1700000000002", MemoryKind::Voice, "call mom", "call mom", 2)
                .with_embedding(vec![0.1, -0.333_333_34, 1e-7, 12345.678])
                .with_media_uri("file:///voice_2.m4a"),
            MemoryRecord::new("1700000000001", MemoryKind::Image, "", "a salad", 1),
        ]
    }

    #[test]
    fn round_trips_all_fields() {
        let records = sample();
        let bytes = encode(&records).expect("encode");
        assert_eq!(decode(Some(&bytes)), records);
    }

    #[test]
    fn omits_absent_optional_fields() {
        let bytes = encode(&sample()[1..]).expect("encode");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(!text.contains("embedding"));
        assert!(!text.contains("mediaUri"));
        assert!(text.contains("\"rawText\""));
        assert!(text.contains("\"kind\":\"image\""));
    }

    #[test]
    fn accepts_legacy_type_field_and_null_optionals() {
        let legacy = br#"[{"id":"9","type":"text","rawText":"r","summary":"s","createdAt":9,"embedding":null}]"#;
        let records = decode(Some(legacy));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, MemoryKind::Text);
        assert_eq!(records[0].embedding, None);
        assert_eq!(records[0].media_uri, None);
    }

    #[test]
    fn missing_empty_or_truncated_input_decodes_empty() {
        assert!(decode(None).is_empty());
        assert!(decode(Some(b"")).is_empty());
        assert!(decode(Some(b"   ")).is_empty());
        let bytes = encode(&sample()).expect("encode");
        assert!(decode(Some(&bytes[..bytes.len() / 2])).is_empty());
    }

    #[test]
    fn non_collection_input_decodes_empty() {
        assert!(decode(Some(br#"{"id":"1"}"#)).is_empty());
        assert!(decode(Some(b"42")).is_empty());
        assert!(matches!(
            try_decode(b"\"hello\""),
            Err(DecodeError::NotACollection("string"))
        ));
    }

    #[test]
    fn wrongly_shaped_record_rejects_snapshot() {
        let bad = br#"[{"id":"1","kind":"smell","rawText":"","summary":"","createdAt":1}]"#;
        assert!(matches!(try_decode(bad), Err(DecodeError::Malformed(_))));
        assert!(decode(Some(bad)).is_empty());
    }

    #[test]
    fn encode_rejects_non_finite_embedding() {
        let record =
            MemoryRecord::new("x", MemoryKind::Text, "t", "t", 1).with_embedding(vec![0.0, f32::NAN]);
        let err = encode(&[record]).unwrap_err();
        assert!(matches!(
            err,
            StorageError::NonFiniteEmbedding { ref id, index: 1 } if id == "x"
        ));
    }

    #[test]
    fn out_of_range_embedding_rejects_snapshot() {
        let wide = br#"[
            {"id":"2","kind":"text","rawText":"ok","summary":"ok","createdAt":2,"embedding":[0.5]},
            {"id":"1","kind":"text","rawText":"r","summary":"s","createdAt":1,"embedding":[0.25,1e39]}
        ]"#;
        assert!(matches!(
            try_decode(wide),
            Err(DecodeError::NonFiniteEmbedding { ref id, index: 1 }) if id == "1"
        ));
        assert!(decode(Some(wide)).is_empty());
    }
}
