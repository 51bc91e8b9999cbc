//! Deterministic CBOR encoder for documents.

use crate::document::Document;
use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// CBOR tag wrapping the 12 raw bytes of an [`ObjectId`](crate::ObjectId).
pub const OBJECT_ID_TAG: u64 = 39;

/// Encode a document to CBOR bytes.
///
/// Output is deterministic:
/// - Document keys are sorted length-first, then bytewise
/// - Integers use the shortest possible encoding
/// - Doubles are always encoded as 64-bit floats
/// - No indefinite-length encoding
///
/// # Errors
///
/// Returns an error if the document contains a NaN double.
pub fn to_cbor(document: &Document) -> CodecResult<Vec<u8>> {
    let mut encoder = DocumentEncoder::new();
    encoder.encode_document(document)?;
    Ok(encoder.into_bytes())
}

/// Encode a single value to CBOR bytes.
pub fn value_to_cbor(value: &Value) -> CodecResult<Vec<u8>> {
    let mut encoder = DocumentEncoder::new();
    encoder.encode(value)?;
    Ok(encoder.into_bytes())
}

/// A deterministic CBOR encoder.
pub struct DocumentEncoder {
    buffer: Vec<u8>,
}

impl DocumentEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode a value.
    pub fn encode(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => self.buffer.push(0xf6),
            Value::Bool(b) => self.buffer.push(if *b { 0xf5 } else { 0xf4 }),
            Value::Integer(n) => self.encode_integer(*n),
            Value::Double(n) => self.encode_double(*n)?,
            Value::Text(s) => self.encode_text(s),
            Value::Bytes(b) => self.encode_bytes(b),
            Value::ObjectId(id) => {
                self.encode_unsigned(6, OBJECT_ID_TAG);
                self.encode_bytes(id.as_bytes());
            }
            Value::Array(items) => {
                self.encode_unsigned(4, items.len() as u64);
                for item in items {
                    self.encode(item)?;
                }
            }
            Value::Document(doc) => self.encode_document(doc)?,
        }
        Ok(())
    }

    /// Encode a document as a CBOR map with sorted text keys.
    pub fn encode_document(&mut self, document: &Document) -> CodecResult<()> {
        let mut fields: Vec<(&str, &Value)> = document.iter().collect();
        // Text keys share a major type, so canonical order is length-first then bytewise.
        fields.sort_by(|a, b| {
            a.0.len()
                .cmp(&b.0.len())
                .then_with(|| a.0.as_bytes().cmp(b.0.as_bytes()))
        });

        self.encode_unsigned(5, fields.len() as u64);
        for (key, value) in fields {
            self.encode_text(key);
            self.encode(value)?;
        }
        Ok(())
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[allow(clippy::cast_sign_loss)]
    fn encode_integer(&mut self, n: i64) {
        if n >= 0 {
            self.encode_unsigned(0, n as u64);
        } else {
            // CBOR negative integers carry -(n+1)
            self.encode_unsigned(1, (-(n + 1)) as u64);
        }
    }

    fn encode_double(&mut self, n: f64) -> CodecResult<()> {
        if n.is_nan() {
            return Err(CodecError::NaNForbidden);
        }
        self.buffer.push(0xfb);
        self.buffer.extend_from_slice(&n.to_bits().to_be_bytes());
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode_unsigned(&mut self, major_type: u8, value: u64) {
        let mt = major_type << 5;

        if value < 24 {
            self.buffer.push(mt | (value as u8));
        } else if u8::try_from(value).is_ok() {
            self.buffer.push(mt | 24);
            self.buffer.push(value as u8);
        } else if u16::try_from(value).is_ok() {
            self.buffer.push(mt | 25);
            self.buffer.extend_from_slice(&(value as u16).to_be_bytes());
        } else if u32::try_from(value).is_ok() {
            self.buffer.push(mt | 26);
            self.buffer.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buffer.push(mt | 27);
            self.buffer.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn encode_bytes(&mut self, bytes: &[u8]) {
        self.encode_unsigned(2, bytes.len() as u64);
        self.buffer.extend_from_slice(bytes);
    }

    fn encode_text(&mut self, text: &str) {
        self.encode_unsigned(3, text.len() as u64);
        self.buffer.extend_from_slice(text.as_bytes());
    }
}

impl Default for DocumentEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{doc, ObjectId};

    #[test]
    fn encode_simple_values() {
        assert_eq!(value_to_cbor(&Value::Null).unwrap(), vec![0xf6]);
        assert_eq!(value_to_cbor(&Value::Bool(false)).unwrap(), vec![0xf4]);
        assert_eq!(value_to_cbor(&Value::Bool(true)).unwrap(), vec![0xf5]);
    }

    #[test]
    fn encode_integers_shortest_form() {
        assert_eq!(value_to_cbor(&Value::Integer(23)).unwrap(), vec![0x17]);
        assert_eq!(value_to_cbor(&Value::Integer(24)).unwrap(), vec![0x18, 24]);
        assert_eq!(
            value_to_cbor(&Value::Integer(256)).unwrap(),
            vec![0x19, 0x01, 0x00]
        );
        assert_eq!(value_to_cbor(&Value::Integer(-1)).unwrap(), vec![0x20]);
        assert_eq!(
            value_to_cbor(&Value::Integer(-100)).unwrap(),
            vec![0x38, 99]
        );
    }

    #[test]
    fn encode_double() {
        let bytes = value_to_cbor(&Value::Double(1.5)).unwrap();
        assert_eq!(bytes[0], 0xfb);
        assert_eq!(&bytes[1..], &1.5f64.to_bits().to_be_bytes());
    }

    #[test]
    fn nan_is_rejected() {
        assert_eq!(
            value_to_cbor(&Value::Double(f64::NAN)),
            Err(CodecError::NaNForbidden)
        );
    }

    #[test]
    fn encode_object_id_as_tag() {
        let id = ObjectId::from_bytes([7; 12]);
        let bytes = value_to_cbor(&Value::ObjectId(id)).unwrap();
        // tag(39), bytes(12)
        assert_eq!(&bytes[..3], &[0xd8, 0x27, 0x4c]);
        assert_eq!(&bytes[3..], &[7; 12]);
    }

    #[test]
    fn document_keys_sorted() {
        let doc = doc! { "bb" => 2i64, "a" => 1i64 };
        let bytes = to_cbor(&doc).unwrap();
        assert_eq!(bytes, vec![0xa2, 0x61, b'a', 0x01, 0x62, b'b', b'b', 0x02]);
    }

    #[test]
    fn deterministic_across_insertion_order() {
        let d1 = doc! { "z" => 1i64, "a" => 2i64, "mm" => "x" };
        let d2 = doc! { "mm" => "x", "a" => 2i64, "z" => 1i64 };
        assert_eq!(to_cbor(&d1).unwrap(), to_cbor(&d2).unwrap());
    }
}
