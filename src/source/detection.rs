//! # Detection payload.
//!
//! A [`Detection`] is an uninterpreted byte sequence (for an RFID reader, the
//! EPC bytes of a tag). The only formatting the crate offers is
//! [`Detection::to_hex`].

use std::fmt;

/// One opaque sighting produced by a [`Source`](crate::Source).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Detection {
    bytes: Vec<u8>,
}

impl Detection {
    /// Wraps raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the detection and returns the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encodes the bytes as uppercase hex, two characters per byte.
    ///
    /// # Example
    /// ```
    /// use pollvisor::Detection;
    ///
    /// let epc = Detection::new([0x30, 0x08, 0x33, 0xB2, 0xDD, 0xD9]);
    /// assert_eq!(epc.to_hex(), "300833B2DDD9");
    /// ```
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.bytes)
    }

    /// Number of payload bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for an empty payload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for Detection {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for Detection {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl fmt::Debug for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Detection").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_encodes_to_empty_string() {
        let d = Detection::new(Vec::new());
        assert!(d.is_empty());
        assert_eq!(d.to_hex(), "");
    }

    #[test]
    fn debug_shows_hex() {
        let d = Detection::from(&[0x0A, 0xFF][..]);
        assert_eq!(format!("{d:?}"), "Detection(\"0AFF\")");
        assert_eq!(d.to_string(), "0AFF");
        assert_eq!(d.len(), 2);
    }
}
