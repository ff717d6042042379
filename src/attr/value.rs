//! Typed Attribute Values

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{Error, Result};

/// Kind of an attribute value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Kind {
    Integer = 0,
    Float = 1,
    Boolean = 2,
    Text = 3,
    Blob = 4,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Blob => "blob",
        };
        f.write_str(name)
    }
}

/// An attribute value. The variant is the kind, so the two cannot drift.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// The kind of this value.
    #[inline]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Integer(_) => Kind::Integer,
            Self::Float(_) => Kind::Float,
            Self::Boolean(_) => Kind::Boolean,
            Self::Text(_) => Kind::Text,
            Self::Blob(_) => Kind::Blob,
        }
    }

    /// Number of bytes [`encode_into`](Self::encode_into) writes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Integer(_) => core::mem::size_of::<i64>(),
            Self::Float(_) => core::mem::size_of::<f64>(),
            Self::Boolean(_) => 1,
            Self::Text(s) => s.len(),
            Self::Blob(b) => b.len(),
        }
    }

    /// Copy the value into `out`.
    ///
    /// Integers and floats are little-endian, booleans are one byte, text is
    /// its UTF-8 bytes. If `out` is too short nothing is written and the
    /// required size is reported.
    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize> {
        let required = self.encoded_len();
        if out.len() < required {
            return Err(Error::BufferTooSmall { required });
        }
        let dst = &mut out[..required];
        match self {
            Self::Integer(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::Float(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::Boolean(v) => dst[0] = u8::from(*v),
            Self::Text(s) => dst.copy_from_slice(s.as_bytes()),
            Self::Blob(b) => dst.copy_from_slice(b),
        }
        Ok(required)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(String::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_size_encodings() {
        let mut buf = [0u8; 8];
        assert_eq!(Value::Integer(-2).encode_into(&mut buf), Ok(8));
        assert_eq!(i64::from_le_bytes(buf), -2);

        assert_eq!(Value::Float(1.5).encode_into(&mut buf), Ok(8));
        assert_eq!(f64::from_le_bytes(buf), 1.5);

        let mut one = [0xAAu8; 1];
        assert_eq!(Value::Boolean(true).encode_into(&mut one), Ok(1));
        assert_eq!(one, [1]);
    }

    #[test]
    fn test_fixed_size_kinds_check_length() {
        let mut buf = [0x55u8; 4];
        assert_eq!(
            Value::Integer(1).encode_into(&mut buf),
            Err(Error::BufferTooSmall { required: 8 })
        );
        assert_eq!(buf, [0x55; 4]);
        assert_eq!(
            Value::Boolean(false).encode_into(&mut []),
            Err(Error::BufferTooSmall { required: 1 })
        );
    }

    #[test]
    fn test_text_and_blob() {
        let mut buf = [0u8; 16];
        assert_eq!(Value::from("uart0").encode_into(&mut buf), Ok(5));
        assert_eq!(&buf[..5], b"uart0");
        assert_eq!(Value::from(&[1u8, 2, 3][..]).encode_into(&mut buf), Ok(3));
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_kind_follows_variant() {
        assert_eq!(Value::from(3i64).kind(), Kind::Integer);
        assert_eq!(Value::from(vec![0u8]).kind(), Kind::Blob);
        assert_eq!(Kind::Text.to_string(), "text");
    }
}
