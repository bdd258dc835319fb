//! Canonical encoding and digests.
//!
//! Every node must turn a block into exactly the same bytes before hashing,
//! otherwise hash links computed on one node fail validation on another. The
//! canonical form is JSON with object keys sorted at every level, `", "` and
//! `": "` as separators, and every character outside printable ASCII escaped
//! as `\uXXXX`.

use serde::Serialize;
use serde_json::{ser::Formatter, Serializer, Value};
use sha2::{Digest, Sha256};
use std::io;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(bytes.as_ref()))
}

/// `serde_json` formatter producing the canonical layout. Numbers, escapes
/// of control characters and quoting stay with `serde_json`.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        for c in fragment.chars() {
            if matches!(c, ' '..='~') {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Canonical bytes of `value`.
///
/// Relies on `serde_json::Map` being a `BTreeMap`, i.e. on the
/// `preserve_order` feature staying off; `keys_are_sorted_at_every_level`
/// fails if it is ever enabled.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, CanonicalFormatter);
    value
        .serialize(&mut ser)
        .expect("serializing a JSON value into memory cannot fail");
    out
}

/// Render `value` in canonical form. The output is always ASCII.
pub fn canonical_string(value: &Value) -> String {
    String::from_utf8_lossy(&canonical_bytes(value)).into_owned()
}

/// Digest of the canonical form of `value`.
pub fn canonical_digest(value: &Value) -> String {
    sha256_hex(canonical_bytes(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HASH_HEX_SIZE;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_at_every_level() {
        let value = json!({
            "b": 1,
            "a": [{"z": true, "y": null}],
        });
        assert_eq!(
            canonical_string(&value),
            r#"{"a": [{"y": null, "z": true}], "b": 1}"#
        );
    }

    #[test]
    fn construction_order_does_not_matter() {
        let mut left = serde_json::Map::new();
        left.insert("sender".into(), json!("a"));
        left.insert("amount".into(), json!(3));
        let mut right = serde_json::Map::new();
        right.insert("amount".into(), json!(3));
        right.insert("sender".into(), json!("a"));
        assert_eq!(
            canonical_digest(&Value::Object(left)),
            canonical_digest(&Value::Object(right))
        );
    }

    #[test]
    fn non_ascii_is_escaped_as_utf16() {
        let value = json!({"sender": "José", "recipient": "😀", "amount": 2.5});
        assert_eq!(
            canonical_string(&value),
            r#"{"amount": 2.5, "recipient": "\ud83d\ude00", "sender": "Jos\u00e9"}"#
        );
    }

    #[test]
    fn control_characters_are_escaped() {
        let value = json!("a\"b\\c\nd\u{1}\u{7f}");
        assert_eq!(canonical_string(&value), r#""a\"b\\c\nd\u0001\u007f""#);
    }

    #[test]
    fn integers_and_floats_keep_their_form() {
        assert_eq!(canonical_string(&json!([1, 1.0, 1600000000.25])), "[1, 1.0, 1600000000.25]");
    }

    #[test]
    fn digest_is_fixed_length_hex() {
        let digest = sha256_hex("100");
        assert_eq!(digest.len(), HASH_HEX_SIZE);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, sha256_hex("100"));
    }
}
