//! Key-value records stored in the table

/// A key with its opaque value payload
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Record {
    /// Lookup key
    pub key: Vec<u8>,
    /// Payload returned by a successful search
    pub value: Vec<u8>,
}

impl Record {
    /// Create a record from anything convertible to byte vectors
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Key bytes
    #[inline]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Value bytes
    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl<K: Into<Vec<u8>>, V: Into<Vec<u8>>> From<(K, V)> for Record {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}
