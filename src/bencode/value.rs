use std::borrow::Cow;
use std::collections::BTreeMap;

/// Dictionary with raw byte string keys.
pub type Dictionary = BTreeMap<Vec<u8>, Value>;

/// A decoded bencode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer.
    Integer(i64),
    /// Raw byte string, not necessarily valid UTF-8.
    Bytes(Vec<u8>),
    List(Vec<Self>),
    Dictionary(Dictionary),
}

impl Value {
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(number) => Some(*number),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(dictionary) => Some(dictionary),
            _ => None,
        }
    }

    /// Byte string decoded as UTF-8 with invalid sequences replaced by U+FFFD.
    #[must_use]
    pub fn as_text_lossy(&self) -> Option<Cow<'_, str>> {
        self.as_bytes().map(String::from_utf8_lossy)
    }

    /// Byte string decoded as UTF-8 with invalid sequences dropped.
    #[must_use]
    pub fn as_text_ignoring_invalid(&self) -> Option<String> {
        self.as_text_lossy().map(|text| text.replace('\u{FFFD}', ""))
    }

    /// Look up a key if this value is a dictionary.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&Self> {
        self.as_dictionary().and_then(|dictionary| dictionary.get(key))
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Integer(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Bytes(text.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<Self>> for Value {
    fn from(list: Vec<Self>) -> Self {
        Self::List(list)
    }
}

impl From<Dictionary> for Value {
    fn from(dictionary: Dictionary) -> Self {
        Self::Dictionary(dictionary)
    }
}
