//! Wire vectors: fixture entities and their exact CBOR encoding.

use crate::fixtures::{Child, Parent, Widget};

/// A fixture entity paired with its expected encoding.
#[derive(Debug, Clone)]
pub struct TestVector<T> {
    /// Vector name.
    pub name: &'static str,
    /// The entity.
    pub entity: T,
    /// Expected CBOR bytes, hex encoded.
    pub cbor_hex: &'static str,
}

impl<T> TestVector<T> {
    /// Decodes the expected bytes.
    pub fn cbor(&self) -> Vec<u8> {
        hex_decode(self.cbor_hex)
    }
}

/// Widget vectors.
pub fn widget_vectors() -> Vec<TestVector<Widget>> {
    vec![
        TestVector {
            name: "widget_full",
            entity: Widget {
                id: Some("1".to_string()),
                name: "a".to_string(),
                tags: vec!["b".to_string()],
            },
            // {"_id": "1", "name": "a", "tags": ["b"]}
            cbor_hex: "a3 635f6964 6131 646e616d65 6161 6474616773 816162",
        },
        TestVector {
            name: "widget_without_identity",
            entity: Widget {
                id: None,
                name: String::new(),
                tags: Vec::new(),
            },
            // {"name": "", "tags": []}
            cbor_hex: "a2 646e616d65 60 6474616773 80",
        },
    ]
}

/// Parent vectors, covering a nested entity and a written null.
pub fn parent_vectors() -> Vec<TestVector<Parent>> {
    vec![
        TestVector {
            name: "parent_with_child",
            entity: Parent {
                id: Some("1".to_string()),
                child: Some(Child {
                    name: "x".to_string(),
                }),
            },
            // {"_id": "1", "child": {"name": "x"}}
            cbor_hex: "a2 635f6964 6131 656368696c64 a1646e616d656178",
        },
        TestVector {
            name: "parent_without_child",
            entity: Parent {
                id: None,
                child: None,
            },
            // {"child": null}
            cbor_hex: "a1 656368696c64 f6",
        },
    ]
}

/// Encodes bytes as lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decodes hex, ignoring whitespace.
///
/// # Panics
///
/// Panics on malformed hex.
pub fn hex_decode(hex: &str) -> Vec<u8> {
    let digits: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    digits
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).expect("Invalid hex");
            u8::from_str_radix(text, 16).expect("Invalid hex")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_helpers() {
        assert_eq!(hex_encode(&[0x00, 0xab, 0x10]), "00ab10");
        assert_eq!(hex_decode("00 ab10"), vec![0x00, 0xab, 0x10]);
    }
}
