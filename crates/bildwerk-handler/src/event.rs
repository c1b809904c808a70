// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Storage event parsing — splits an event document into records and pulls
// the bucket/key pair out of each.

use bildwerk_core::ObjectRef;
use bildwerk_core::error::{BildwerkError, Result};
use percent_encoding::percent_decode_str;
use serde_json::Value;

/// The records of an event.
///
/// A document with a non-empty `Records` array yields its elements; any
/// other document is treated as a single record.
pub fn parse_records(event: &Value) -> Vec<&Value> {
    match event.get("Records").and_then(Value::as_array) {
        Some(records) if !records.is_empty() => records.iter().collect(),
        _ => vec![event],
    }
}

/// Read `s3.bucket.name` and `s3.object.key` from a record.
///
/// Both must be non-empty strings. The key is URL-decoded.
pub fn extract_object_ref(record: &Value) -> Result<ObjectRef> {
    if !record.is_object() {
        return Err(BildwerkError::EventParse("record is not an object".into()));
    }

    let s3 = record.get("s3");
    let bucket = s3
        .and_then(|s3| s3.pointer("/bucket/name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty());
    let key = s3
        .and_then(|s3| s3.pointer("/object/key"))
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty());

    match (bucket, key) {
        (Some(bucket), Some(key)) => Ok(ObjectRef::new(bucket, decode_key(key))),
        _ => Err(BildwerkError::EventParse(
            "missing bucket name or object key".into(),
        )),
    }
}

/// Undo the form-style encoding of object keys in storage events:
/// `+` is a space and `%XX` is a byte.
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(bucket: &str, key: &str) -> Value {
        json!({ "s3": { "bucket": { "name": bucket }, "object": { "key": key } } })
    }

    #[test]
    fn records_array_is_split() {
        let event = json!({ "Records": [record("a", "1"), record("b", "2")] });
        let records = parse_records(&event);
        assert_eq!(records.len(), 2);
        assert_eq!(extract_object_ref(records[1]).unwrap(), ObjectRef::new("b", "2"));
    }

    #[test]
    fn bare_record_is_single_item() {
        let event = record("uploads", "cat.png");
        let records = parse_records(&event);
        assert_eq!(records.len(), 1);
        assert_eq!(
            extract_object_ref(records[0]).unwrap(),
            ObjectRef::new("uploads", "cat.png")
        );
    }

    #[test]
    fn empty_records_falls_back_to_event() {
        let event = json!({ "Records": [] });
        let records = parse_records(&event);
        assert_eq!(records.len(), 1);
        assert!(matches!(
            extract_object_ref(records[0]),
            Err(BildwerkError::EventParse(_))
        ));
    }

    #[test]
    fn missing_or_empty_fields_are_rejected() {
        for bad in [
            json!({}),
            json!({ "s3": { "bucket": { "name": "b" } } }),
            json!({ "s3": { "object": { "key": "k" } } }),
            record("", "k"),
            record("b", ""),
            json!({ "s3": { "bucket": { "name": 7 }, "object": { "key": "k" } } }),
            json!("not a record"),
        ] {
            assert!(
                matches!(extract_object_ref(&bad), Err(BildwerkError::EventParse(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn keys_are_url_decoded() {
        assert_eq!(decode_key("holiday+photos/beach%20day.jpg"), "holiday photos/beach day.jpg");
        assert_eq!(decode_key("caf%C3%A9.png"), "café.png");
        assert_eq!(decode_key("plain.png"), "plain.png");
        // A literal plus arrives encoded.
        assert_eq!(decode_key("a%2Bb.png"), "a+b.png");
    }
}
