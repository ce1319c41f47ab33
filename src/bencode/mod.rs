//! Bencode decoding for `.torrent` metadata.
//!
//! Decodes a byte buffer into a dynamically typed [`Value`] tree and can record the exact
//! byte span of the value stored under a chosen dictionary key while descending.
//! The span points into the original input so the encoded bytes can be hashed as-is.

mod decode;
mod error;
mod value;

pub use decode::{DEFAULT_MAX_DEPTH, Decoded, Decoder, decode, decode_dictionary};
pub use error::BencodeError;
pub use value::{Dictionary, Value};
