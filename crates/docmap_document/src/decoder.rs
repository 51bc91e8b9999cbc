//! CBOR decoder for documents.

use crate::document::Document;
use crate::encoder::OBJECT_ID_TAG;
use crate::error::{CodecError, CodecResult};
use crate::object_id::ObjectId;
use crate::value::Value;

/// Decode a document from CBOR bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid CBOR, the top-level item is
/// not a map, or bytes remain after it.
pub fn from_cbor(bytes: &[u8]) -> CodecResult<Document> {
    let mut decoder = DocumentDecoder::new(bytes);
    let document = match decoder.decode()? {
        Value::Document(doc) => doc,
        other => {
            return Err(CodecError::invalid_structure(format!(
                "expected a document at top level, found {}",
                other.kind()
            )))
        }
    };
    if !decoder.is_empty() {
        return Err(CodecError::TrailingBytes {
            count: decoder.remaining().len(),
        });
    }
    Ok(document)
}

/// Decode a single value from CBOR bytes.
pub fn value_from_cbor(bytes: &[u8]) -> CodecResult<Value> {
    let mut decoder = DocumentDecoder::new(bytes);
    decoder.decode()
}

/// A CBOR decoder.
///
/// Rejects non-shortest integer encodings, indefinite-length items and
/// non-text document keys.
pub struct DocumentDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

/// Maximum allowed element count for arrays and maps.
const MAX_CONTAINER_ELEMENTS: u64 = 16 * 1024 * 1024;

/// Maximum allowed byte/string length.
const MAX_BYTES_LENGTH: u64 = 256 * 1024 * 1024;

/// Maximum container nesting.
pub const MAX_NESTING_DEPTH: usize = 128;

impl<'a> DocumentDecoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
        }
    }

    /// Decode the next value.
    pub fn decode(&mut self) -> CodecResult<Value> {
        let initial_byte = self.read_byte()?;
        let major_type = initial_byte >> 5;
        let additional_info = initial_byte & 0x1f;

        match major_type {
            0 => {
                let n = self.decode_unsigned(additional_info)?;
                i64::try_from(n)
                    .map(Value::Integer)
                    .map_err(|_| CodecError::IntegerOverflow)
            }
            1 => {
                // Negative integer: value is -(n+1)
                let n = self.decode_unsigned(additional_info)?;
                i64::try_from(n)
                    .map(|n| Value::Integer(-n - 1))
                    .map_err(|_| CodecError::IntegerOverflow)
            }
            2 => self.decode_bytes(additional_info).map(|b| Value::Bytes(b.to_vec())),
            3 => self.decode_text(additional_info).map(Value::Text),
            4 => self.nested(|d| d.decode_array(additional_info)),
            5 => self.nested(|d| d.decode_map(additional_info)),
            6 => self.decode_tagged(additional_info),
            7 => self.decode_simple(additional_info),
            _ => Err(CodecError::invalid_structure("invalid major type")),
        }
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> CodecResult<Value>,
    ) -> CodecResult<Value> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CodecError::NestingTooDeep {
                max_depth: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    #[inline]
    fn read_byte(&mut self) -> CodecResult<u8> {
        let byte = *self.data.get(self.pos).ok_or(CodecError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(CodecError::UnexpectedEof)?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn decode_unsigned(&mut self, additional_info: u8) -> CodecResult<u64> {
        let non_canonical =
            || CodecError::invalid_structure("non-canonical: value could be encoded in fewer bytes");

        match additional_info {
            0..=23 => Ok(u64::from(additional_info)),
            24 => {
                let byte = self.read_byte()?;
                if byte < 24 {
                    return Err(non_canonical());
                }
                Ok(u64::from(byte))
            }
            25 => {
                let bytes = self.read_bytes(2)?;
                let value = u16::from_be_bytes([bytes[0], bytes[1]]);
                if u8::try_from(value).is_ok() {
                    return Err(non_canonical());
                }
                Ok(u64::from(value))
            }
            26 => {
                let bytes = self.read_bytes(4)?;
                let value = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                if u16::try_from(value).is_ok() {
                    return Err(non_canonical());
                }
                Ok(u64::from(value))
            }
            27 => {
                let bytes = self.read_bytes(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(bytes);
                let value = u64::from_be_bytes(buf);
                if u32::try_from(value).is_ok() {
                    return Err(non_canonical());
                }
                Ok(value)
            }
            31 => Err(CodecError::IndefiniteLengthForbidden),
            _ => Err(CodecError::invalid_structure("reserved additional info")),
        }
    }

    fn decode_length(&mut self, additional_info: u8, max: u64) -> CodecResult<usize> {
        let len = self.decode_unsigned(additional_info)?;
        if len > max {
            return Err(CodecError::SizeLimitExceeded {
                claimed: len,
                max_allowed: max,
            });
        }
        usize::try_from(len).map_err(|_| CodecError::SizeLimitExceeded {
            claimed: len,
            max_allowed: max,
        })
    }

    fn decode_bytes(&mut self, additional_info: u8) -> CodecResult<&'a [u8]> {
        let len = self.decode_length(additional_info, MAX_BYTES_LENGTH)?;
        self.read_bytes(len)
    }

    fn decode_text(&mut self, additional_info: u8) -> CodecResult<String> {
        let bytes = self.decode_bytes(additional_info)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| CodecError::InvalidUtf8)
    }

    fn decode_array(&mut self, additional_info: u8) -> CodecResult<Value> {
        let len = self.decode_length(additional_info, MAX_CONTAINER_ELEMENTS)?;
        // Cap preallocation; the claimed length is untrusted.
        let mut items = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            items.push(self.decode()?);
        }
        Ok(Value::Array(items))
    }

    fn decode_map(&mut self, additional_info: u8) -> CodecResult<Value> {
        let len = self.decode_length(additional_info, MAX_CONTAINER_ELEMENTS)?;
        let mut doc = Document::with_capacity(len.min(1024));
        for _ in 0..len {
            let key_byte = self.read_byte()?;
            if key_byte >> 5 != 3 {
                return Err(CodecError::invalid_structure("document keys must be text"));
            }
            let key = self.decode_text(key_byte & 0x1f)?;
            let value = self.decode()?;
            if doc.contains_key(&key) {
                return Err(CodecError::invalid_structure(format!(
                    "duplicate document key {key:?}"
                )));
            }
            doc.insert(key, value);
        }
        Ok(Value::Document(doc))
    }

    fn decode_tagged(&mut self, additional_info: u8) -> CodecResult<Value> {
        let tag = self.decode_unsigned(additional_info)?;
        if tag != OBJECT_ID_TAG {
            // Unknown tags carry no meaning for documents; keep the inner value.
            return self.nested(Self::decode);
        }

        let initial_byte = self.read_byte()?;
        if initial_byte >> 5 != 2 {
            return Err(CodecError::invalid_object_id("tag content must be bytes"));
        }
        let bytes = self.decode_bytes(initial_byte & 0x1f)?;
        ObjectId::from_slice(bytes)
            .map(Value::ObjectId)
            .ok_or_else(|| {
                CodecError::invalid_object_id(format!("expected 12 bytes, got {}", bytes.len()))
            })
    }

    fn decode_simple(&mut self, additional_info: u8) -> CodecResult<Value> {
        match additional_info {
            20 => Ok(Value::Bool(false)),
            21 => Ok(Value::Bool(true)),
            22 => Ok(Value::Null),
            23 => Err(CodecError::unsupported_type("undefined")),
            25 => Err(CodecError::unsupported_type("half-precision float")),
            26 => {
                let bytes = self.read_bytes(4)?;
                let bits = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                let n = f32::from_bits(bits);
                if n.is_nan() {
                    return Err(CodecError::NaNForbidden);
                }
                Ok(Value::Double(f64::from(n)))
            }
            27 => {
                let bytes = self.read_bytes(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(bytes);
                let n = f64::from_bits(u64::from_be_bytes(buf));
                if n.is_nan() {
                    return Err(CodecError::NaNForbidden);
                }
                Ok(Value::Double(n))
            }
            31 => Err(CodecError::IndefiniteLengthForbidden),
            _ => Err(CodecError::unsupported_type(format!(
                "simple value {additional_info}"
            ))),
        }
    }
}
