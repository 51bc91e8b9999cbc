//! Store-assigned object identifiers.

use crate::error::{CodecError, CodecResult};
use std::fmt;
use std::str::FromStr;

/// A 12-byte identifier assigned by the document store.
///
/// The external form is 24 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Length of the raw identifier in bytes.
    pub const LEN: usize = 12;

    /// Creates an object id from raw bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Creates an object id from a slice.
    ///
    /// Returns `None` if the slice is not exactly 12 bytes.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 12]>::try_from(slice).ok().map(Self)
    }

    /// Parses the 24-digit hex form.
    pub fn parse_str(hex: &str) -> CodecResult<Self> {
        if hex.len() != Self::LEN * 2 {
            return Err(CodecError::invalid_object_id(format!(
                "expected {} hex digits, got {}",
                Self::LEN * 2,
                hex.len()
            )));
        }

        let mut bytes = [0u8; 12];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let high = hex_digit(chunk[0])?;
            let low = hex_digit(chunk[1])?;
            bytes[i] = (high << 4) | low;
        }
        Ok(Self(bytes))
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Returns the lowercase hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

fn hex_digit(c: u8) -> CodecResult<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(CodecError::invalid_object_id(format!(
            "invalid hex digit {:?}",
            char::from(c)
        ))),
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl FromStr for ObjectId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self::from_bytes(bytes)
    }
}
