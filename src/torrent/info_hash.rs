use std::fmt;

use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::bencode::Value;

const HEX_CHARS: &[u8] = b"0123456789abcdef";

/// Multihash prefix for SHA-256: function code 0x12 and digest length 0x20.
pub const SHA256_MULTIHASH_PREFIX: &str = "1220";

/// Content identifier derived from the encoded `info` dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InfoHash {
    /// 40 lowercase hex chars of the SHA-1 digest.
    V1(String),
    /// `1220` followed by 64 lowercase hex chars of the SHA-256 digest.
    V2(String),
}

impl InfoHash {
    /// Derive the identifier from the original encoded bytes of the `info` value.
    ///
    /// Torrents declaring `meta version` 2 use SHA-256 multihash, everything else SHA-1.
    #[must_use]
    pub fn derive(info: Option<&Value>, info_bytes: &[u8]) -> Self {
        if is_meta_version_2(info) {
            Self::V2(format!("{SHA256_MULTIHASH_PREFIX}{}", to_hex(&Sha256::digest(info_bytes))))
        } else {
            Self::V1(to_hex(&Sha1::digest(info_bytes)))
        }
    }

    /// Magnet URN namespace for this identifier.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::V1(_) => "btih",
            Self::V2(_) => "btmh",
        }
    }

    /// The identifier hex string without the scheme.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::V1(hash) | Self::V2(hash) => hash,
        }
    }

    #[must_use]
    pub const fn is_v2(&self) -> bool {
        matches!(self, Self::V2(_))
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme(), self.as_str())
    }
}

/// Derive the infohash when the `info` span was captured.
///
/// Returns `None` without a span: hashing anything else would give a wrong identifier.
#[must_use]
pub fn derive_info_hash(info: Option<&Value>, info_bytes: Option<&[u8]>) -> Option<InfoHash> {
    info_bytes.map(|bytes| InfoHash::derive(info, bytes))
}

fn is_meta_version_2(info: Option<&Value>) -> bool {
    info.and_then(|info| info.get(b"meta version"))
        .and_then(Value::as_integer)
        == Some(2)
}

/// Convert bytes to a lowercase hex string.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        hex.push(char::from(HEX_CHARS[(byte >> 4) as usize]));
        hex.push(char::from(HEX_CHARS[(byte & 0x0f) as usize]));
    }
    hex
}
