//! Torrent metadata records.
//!
//! Decodes `.torrent` files into [`TorrentRecord`]s holding the display name,
//! infohash, magnet URI and the set of contained file names.

mod files;
mod info_hash;
mod magnet;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::bencode::{BencodeError, DEFAULT_MAX_DEPTH, Decoder, Value};

pub use files::file_names;
pub use info_hash::{InfoHash, SHA256_MULTIHASH_PREFIX, derive_info_hash, to_hex};
pub use magnet::{build_magnet, trackers};

const INFO_KEY: &[u8] = b"info";

/// Metadata decoded from one `.torrent` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentRecord {
    /// Source `.torrent` file.
    pub path: PathBuf,
    /// Name from the info dictionary, or the file stem if missing.
    pub display_name: String,
    pub info_hash: Option<InfoHash>,
    pub magnet: Option<String>,
    /// Lowercase leaf file names.
    pub files: BTreeSet<String>,
}

impl TorrentRecord {
    /// Read and decode a `.torrent` file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid bencode.
    pub fn from_path(path: &Path, max_depth: usize) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_bytes(path, &bytes, max_depth).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Decode torrent metadata from raw bytes.
    ///
    /// # Errors
    /// Returns a [`BencodeError`] if the bytes are not a valid bencoded dictionary.
    pub fn from_bytes(path: &Path, bytes: &[u8], max_depth: usize) -> Result<Self, BencodeError> {
        let (torrent, info_span) = Decoder::new(bytes)
            .capture_key(INFO_KEY)
            .max_depth(max_depth)
            .decode_dictionary()?;

        let info = torrent.get(INFO_KEY);
        let display_name = info
            .and_then(|info| info.get(b"name"))
            .and_then(Value::as_text_lossy)
            .filter(|name| !name.is_empty())
            .map_or_else(|| crate::path_to_file_stem_string(path), |name| name.to_string());

        let info_hash = derive_info_hash(info, info_span.map(|span| &bytes[span]));
        let magnet = build_magnet(&torrent, info_hash.as_ref(), &display_name);
        let files = info.map(file_names).unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            display_name,
            info_hash,
            magnet,
            files,
        })
    }

    /// Decode with the default nesting limit.
    ///
    /// # Errors
    /// Returns a [`BencodeError`] if the bytes are not a valid bencoded dictionary.
    pub fn parse(path: &Path, bytes: &[u8]) -> Result<Self, BencodeError> {
        Self::from_bytes(path, bytes, DEFAULT_MAX_DEPTH)
    }
}
