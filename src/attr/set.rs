//! Bounded per-record attribute set.

use alloc::string::String;
use alloc::vec::Vec;

use super::value::{Kind, Value};
use crate::error::{check_name, Error, Result};
use crate::limits::MAX_NAME_LEN;

/// A named, typed value.
#[derive(Clone, PartialEq, Debug)]
pub struct Attribute {
    name: String,
    value: Value,
}

impl Attribute {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.value.kind()
    }
}

/// Description of one attribute, without its value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AttributeInfo {
    pub name: String,
    pub kind: Kind,
    /// Encoded size in bytes.
    pub size: usize,
}

/// The attributes owned by one record.
///
/// Names are unique within the set and the set never grows past its
/// capacity.
#[derive(Clone, Debug)]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
    capacity: usize,
}

impl AttributeSet {
    /// Empty set holding at most `capacity` attributes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            attributes: Vec::new(),
            capacity,
        }
    }

    /// Number of attributes held.
    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// True when the set holds no attributes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Most attributes the set will hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Add an attribute, or replace the value of a same-kind attribute.
    ///
    /// Fails with `InvalidKind` if `name` exists with another kind and with
    /// `AttributeFull` if a new name would exceed capacity.
    pub fn add(&mut self, name: &str, value: Value) -> Result<()> {
        check_name(name, MAX_NAME_LEN)?;
        if let Some(index) = self.position(name) {
            let existing = &mut self.attributes[index];
            if existing.kind() != value.kind() {
                return Err(Error::InvalidKind);
            }
            existing.value = value;
            return Ok(());
        }
        if self.attributes.len() >= self.capacity {
            return Err(Error::AttributeFull);
        }
        self.attributes.push(Attribute {
            name: String::from(name),
            value,
        });
        Ok(())
    }

    /// Look up an attribute's value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// Copy an attribute's encoded value into `out`.
    ///
    /// An undersized buffer yields `BufferTooSmall` with the required size
    /// and leaves both the buffer and the attribute untouched.
    pub fn read_into(&self, name: &str, out: &mut [u8]) -> Result<usize> {
        self.get(name).ok_or(Error::NotFound)?.encode_into(out)
    }

    /// Replace an attribute's value. The kind must match.
    ///
    /// The previous value, including any blob buffer, is dropped here.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let index = self.position(name).ok_or(Error::NotFound)?;
        let attribute = &mut self.attributes[index];
        if attribute.kind() != value.kind() {
            return Err(Error::KindMismatch);
        }
        attribute.value = value;
        Ok(())
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Result<Value> {
        let index = self.position(name).ok_or(Error::NotFound)?;
        Ok(self.attributes.remove(index).value)
    }

    /// Name, kind and encoded size of an attribute.
    pub fn info(&self, name: &str) -> Option<AttributeInfo> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| AttributeInfo {
                name: a.name.clone(),
                kind: a.kind(),
                size: a.value.encoded_len(),
            })
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_integer() {
        let mut set = AttributeSet::with_capacity(4);
        set.add("x", Value::Integer(42)).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(set.read_into("x", &mut buf), Ok(8));
        assert_eq!(i64::from_le_bytes(buf), 42);

        set.set("x", Value::Integer(7)).unwrap();
        set.read_into("x", &mut buf).unwrap();
        assert_eq!(i64::from_le_bytes(buf), 7);
    }

    #[test]
    fn test_capacity_is_enforced_without_partial_mutation() {
        let mut set = AttributeSet::with_capacity(2);
        set.add("a", Value::Boolean(true)).unwrap();
        set.add("b", Value::Boolean(false)).unwrap();
        assert_eq!(set.add("c", Value::Boolean(true)), Err(Error::AttributeFull));
        assert_eq!(set.len(), 2);
        assert!(set.get("c").is_none());
        // Existing names can still be updated when full.
        set.add("a", Value::Boolean(false)).unwrap();
        assert_eq!(set.get("a"), Some(&Value::Boolean(false)));
    }

    #[test]
    fn test_add_with_other_kind_is_rejected() {
        let mut set = AttributeSet::with_capacity(2);
        set.add("irq", Value::Integer(33)).unwrap();
        assert_eq!(set.add("irq", Value::from("33")), Err(Error::InvalidKind));
        assert_eq!(set.get("irq"), Some(&Value::Integer(33)));
    }

    #[test]
    fn test_set_kind_mismatch() {
        let mut set = AttributeSet::with_capacity(2);
        set.add("ratio", Value::Float(0.5)).unwrap();
        assert_eq!(set.set("ratio", Value::Integer(1)), Err(Error::KindMismatch));
        assert_eq!(set.set("missing", Value::Integer(1)), Err(Error::NotFound));
        assert_eq!(set.get("ratio"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn test_buffer_too_small_is_idempotent() {
        let mut set = AttributeSet::with_capacity(1);
        set.add("model", Value::from("pl011-uart")).unwrap();
        let mut small = [0u8; 4];
        for _ in 0..3 {
            assert_eq!(
                set.read_into("model", &mut small),
                Err(Error::BufferTooSmall { required: 10 })
            );
        }
        assert_eq!(small, [0; 4]);
        assert_eq!(set.get("model"), Some(&Value::from("pl011-uart")));

        let mut big = [0u8; 10];
        assert_eq!(set.read_into("model", &mut big), Ok(10));
        assert_eq!(&big, b"pl011-uart");
    }

    #[test]
    fn test_blob_replacement() {
        let mut set = AttributeSet::with_capacity(1);
        set.add("fw", Value::from(vec![1u8; 32])).unwrap();
        set.set("fw", Value::from(vec![2u8; 3])).unwrap();
        assert_eq!(set.info("fw").map(|i| i.size), Some(3));
        set.set("fw", Value::from(vec![3u8; 5])).unwrap();
        assert_eq!(set.get("fw"), Some(&Value::Blob(vec![3u8; 5])));
    }

    #[test]
    fn test_names_are_validated() {
        let mut set = AttributeSet::with_capacity(2);
        let long = "n".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            set.add(&long, Value::Integer(0)),
            Err(Error::NameTooLong { max: MAX_NAME_LEN })
        );
        assert_eq!(set.add("", Value::Integer(0)), Err(Error::InvalidEntry));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_frees_capacity() {
        let mut set = AttributeSet::with_capacity(1);
        set.add("a", Value::Integer(1)).unwrap();
        assert_eq!(set.remove("a"), Ok(Value::Integer(1)));
        set.add("b", Value::Integer(2)).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["b"]);
    }
}
