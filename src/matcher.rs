//! Match movie directories to decoded torrents.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::torrent::TorrentRecord;

/// A movie directory found in the library root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDirectory {
    pub name: String,
    pub path: PathBuf,
    pub modified: Option<DateTime<Local>>,
}

impl MovieDirectory {
    /// Find the best matching torrent for this directory.
    #[must_use]
    pub fn find_torrent<'a>(&self, torrents: &'a [TorrentRecord]) -> Option<&'a TorrentRecord> {
        find_match(&self.name, torrents)
    }
}

/// Find the torrent that best matches the given directory name.
///
/// Tiers are tried in order and the first record satisfying a tier wins:
/// 1. display name equals the directory name
/// 2. either name contains the other
/// 3. the directory name is part of a file name in the torrent
///
/// All comparisons are case-insensitive.
#[must_use]
pub fn find_match<'a>(directory_name: &str, torrents: &'a [TorrentRecord]) -> Option<&'a TorrentRecord> {
    let directory_name = directory_name.to_lowercase();
    let display_names: Vec<String> = torrents
        .iter()
        .map(|torrent| torrent.display_name.to_lowercase())
        .collect();

    let named = || {
        torrents
            .iter()
            .zip(&display_names)
            .filter(|(_, display_name)| !display_name.is_empty())
    };

    named()
        .find(|(_, display_name)| **display_name == directory_name)
        .or_else(|| {
            named().find(|(_, display_name)| {
                display_name.contains(&directory_name) || directory_name.contains(display_name.as_str())
            })
        })
        .map(|(torrent, _)| torrent)
        .or_else(|| {
            torrents.iter().find(|torrent| {
                torrent
                    .files
                    .iter()
                    .any(|file| file.to_lowercase().contains(&directory_name))
            })
        })
}
