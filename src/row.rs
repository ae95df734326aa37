//! Record codec: a `Row` and its fixed-width byte layout.
//!
//! ```text
//! [0, 4)      id        i32, little-endian
//! [4, 36)     username  32 bytes, zero padded
//! [36, 291)   email     255 bytes, zero padded
//! ```

use std::borrow::Cow;
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::CodecError;
use crate::{EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE};

/// Text stored in a fixed-capacity, zero-padded byte buffer.
///
/// Content longer than `N` bytes is cut at the last UTF-8 character boundary
/// that fits. Trailing zero bytes are padding and are stripped on read.
#[derive(Clone, PartialEq, Eq)]
pub struct FixedText<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedText<N> {
    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(N);
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        let mut bytes = [0u8; N];
        bytes[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self { bytes }
    }

    /// Wraps a raw buffer as read from a page.
    pub fn from_padded(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    pub fn as_padded(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Content without the zero padding.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self
            .bytes
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        &self.bytes[..len]
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for FixedText<N> {
    fn default() -> Self {
        Self { bytes: [0u8; N] }
    }
}

impl<const N: usize> From<&str> for FixedText<N> {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl<const N: usize> PartialEq<str> for FixedText<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> PartialEq<&str> for FixedText<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

/// One record of the table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub id: i32,
    pub username: FixedText<USERNAME_SIZE>,
    pub email: FixedText<EMAIL_SIZE>,
}

impl Row {
    pub fn new(id: i32, username: &str, email: &str) -> Self {
        Self {
            id,
            username: FixedText::new(username),
            email: FixedText::new(email),
        }
    }

    /// Writes the row into a window of exactly `ROW_SIZE` bytes.
    pub fn serialize_into(&self, destination: &mut [u8; ROW_SIZE]) {
        LittleEndian::write_i32(&mut destination[ID_OFFSET..USERNAME_OFFSET], self.id);
        destination[USERNAME_OFFSET..EMAIL_OFFSET].copy_from_slice(self.username.as_padded());
        destination[EMAIL_OFFSET..ROW_SIZE].copy_from_slice(self.email.as_padded());
    }

    pub fn serialize(&self) -> [u8; ROW_SIZE] {
        let mut block = [0u8; ROW_SIZE];
        self.serialize_into(&mut block);
        block
    }

    pub fn deserialize(source: &[u8; ROW_SIZE]) -> Self {
        let mut username = [0u8; USERNAME_SIZE];
        username.copy_from_slice(&source[USERNAME_OFFSET..EMAIL_OFFSET]);
        let mut email = [0u8; EMAIL_SIZE];
        email.copy_from_slice(&source[EMAIL_OFFSET..ROW_SIZE]);

        Self {
            id: LittleEndian::read_i32(&source[ID_OFFSET..USERNAME_OFFSET]),
            username: FixedText::from_padded(username),
            email: FixedText::from_padded(email),
        }
    }

    /// Checked decode for slices of unknown length.
    pub fn from_bytes(source: &[u8]) -> Result<Self, CodecError> {
        let block: &[u8; ROW_SIZE] = source.try_into().map_err(|_| CodecError::BlockLength {
            expected: ROW_SIZE,
            found: source.len(),
        })?;
        Ok(Self::deserialize(block))
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}
