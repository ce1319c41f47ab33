//! Filesystem scanning for torrent files and movie directories.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local};
#[cfg(not(test))]
use indicatif::ProgressStyle;
use indicatif::{ParallelProgressIterator, ProgressBar};
use itertools::{Either, Itertools};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use walkdir::WalkDir;

use movie_index::matcher::MovieDirectory;
use movie_index::torrent::TorrentRecord;

#[cfg(not(test))]
const PROGRESS_BAR_CHARS: &str = "=>-";
#[cfg(not(test))]
const PROGRESS_BAR_TEMPLATE: &str = "[{elapsed_precise}] {bar:80.magenta/blue} {pos}/{len} {percent}%";

const TORRENT_EXTENSION: &str = "torrent";

/// Torrent files that could not be loaded, with the reason.
pub type LoadFailures = Vec<(PathBuf, anyhow::Error)>;

/// Find all `.torrent` files under the root recursively, sorted by path.
pub fn gather_torrent_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| movie_index::path_to_file_extension_string(path) == TORRENT_EXTENSION)
        .sorted()
        .collect()
}

/// Decode torrent files in parallel.
///
/// Records keep the order of the input paths.
/// Files that fail to load are returned separately so one bad torrent never stops the run.
pub fn load_torrents(paths: &[PathBuf], max_depth: usize) -> (Vec<TorrentRecord>, LoadFailures) {
    #[cfg(test)]
    let progress_bar = ProgressBar::hidden();
    #[cfg(not(test))]
    let progress_bar = {
        let pb = ProgressBar::new(paths.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars(PROGRESS_BAR_CHARS),
        );
        pb
    };

    let results: Vec<Result<TorrentRecord>> = paths
        .par_iter()
        .progress_with(progress_bar.clone())
        .map(|path| TorrentRecord::from_path(path, max_depth))
        .collect();
    progress_bar.finish_and_clear();

    results
        .into_iter()
        .zip(paths)
        .partition_map(|(result, path)| match result {
            Ok(record) => Either::Left(record),
            Err(error) => Either::Right((path.clone(), error)),
        })
}

/// List the movie directories directly under the root, sorted case-insensitively by name,
/// together with the most recent modification time among them.
pub fn walk_movie_directories(
    root: &Path,
    skip_hidden: bool,
    ignore_dirs: &[String],
) -> Result<(Vec<MovieDirectory>, Option<DateTime<Local>>)> {
    let mut directories = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.path().is_dir() || (skip_hidden && movie_index::is_hidden(&entry)) {
            continue;
        }

        let name = movie_index::get_normalized_dir_name(entry.path())?;
        if ignore_dirs.contains(&name) {
            continue;
        }

        let modified = entry
            .metadata()
            .ok()
            .and_then(|metadata| metadata.modified().ok())
            .map(DateTime::<Local>::from);

        directories.push(MovieDirectory {
            name,
            path: entry.into_path(),
            modified,
        });
    }

    directories.sort_by_cached_key(|directory| directory.name.to_lowercase());
    let last_updated = directories.iter().filter_map(|directory| directory.modified).max();

    Ok((directories, last_updated))
}
