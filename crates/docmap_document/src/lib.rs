//! # docmap Document
//!
//! The schema-less document model used by docmap, plus its wire formats.
//!
//! This crate provides:
//! - [`Value`] and [`Document`], the loosely-typed representation a
//!   document store hands out
//! - [`ObjectId`], the store-assigned identifier
//! - A deterministic CBOR codec (`to_cbor` / `from_cbor`)
//! - JSON interop through `serde`
//!
//! ## Usage
//!
//! ```
//! use docmap_document::{doc, from_cbor, to_cbor, Value};
//!
//! let document = doc! { "name" => "gizmo", "tags" => vec!["a", "b"] };
//! let bytes = to_cbor(&document).unwrap();
//!
//! let decoded = from_cbor(&bytes).unwrap();
//! assert_eq!(decoded, document);
//! assert_eq!(decoded.get("name"), Some(&Value::from("gizmo")));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod document;
mod encoder;
mod error;
mod object_id;
mod serde_impl;
mod value;

pub use decoder::{from_cbor, value_from_cbor, DocumentDecoder, MAX_NESTING_DEPTH};
pub use document::Document;
pub use encoder::{to_cbor, value_to_cbor, DocumentEncoder, OBJECT_ID_TAG};
pub use error::{CodecError, CodecResult};
pub use object_id::ObjectId;
pub use value::{Value, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            (-1.0e12f64..1.0e12).prop_map(Value::Double),
            "[a-z0-9 ]{0,12}".prop_map(Value::Text),
            prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
            any::<[u8; 12]>().prop_map(|b| Value::ObjectId(ObjectId::from_bytes(b))),
        ]
    }

    fn value() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Document(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn cbor_roundtrip(fields in prop::collection::btree_map("[a-z_]{1,8}", value(), 0..6)) {
            let document: Document = fields.into_iter().collect();
            let bytes = to_cbor(&document).unwrap();
            prop_assert_eq!(from_cbor(&bytes).unwrap(), document);
        }

        #[test]
        fn decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let _ = from_cbor(&bytes);
        }
    }

    #[test]
    fn nested_document_roundtrip() {
        let document = doc! {
            "_id" => ObjectId::from_bytes([1; 12]),
            "child" => doc! { "name" => "x", "score" => 2.5 },
            "list" => Value::Array(vec![Value::Integer(-3), Value::Null]),
        };
        let bytes = to_cbor(&document).unwrap();
        assert_eq!(from_cbor(&bytes).unwrap(), document);
    }
}
