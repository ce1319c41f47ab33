use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use movie_index::torrent::TorrentRecord;

use crate::MovieIndexArgs;
use crate::config::{Config, MovieIndexConfig};
use crate::logger::Logger;
use crate::report::{self, IndexRow};
use crate::scan;

/// Builds the movie index from the library and torrent directories.
pub struct MovieIndex {
    config: Config,
    logger: Logger,
}

impl MovieIndex {
    /// Create a new indexer from command line arguments and the user config file.
    pub fn new(args: MovieIndexArgs) -> Result<Self> {
        let user_config = MovieIndexConfig::get_user_config()?;
        let config = Config::from_args(args, user_config)?;
        let logger = Logger::new(config.log_file.as_deref(), config.verbose);
        Ok(Self { config, logger })
    }

    #[cfg(test)]
    const fn with_config(config: Config) -> Self {
        Self {
            config,
            logger: Logger::silent(),
        }
    }

    /// Scan, match and write the index files.
    /// Returns true if at least one output file changed.
    pub fn run(&mut self) -> Result<bool> {
        let start = Instant::now();
        self.logger.debug(&format!("{:#?}", self.config));

        if !self.config.dryrun {
            fs::create_dir_all(&self.config.output_dir).with_context(|| {
                format!(
                    "Failed to create output directory: {}",
                    self.config.output_dir.display()
                )
            })?;
        }

        let torrents = self.load_torrents();
        let (directories, last_updated) = scan::walk_movie_directories(
            &self.config.movies_dir,
            self.config.skip_hidden,
            &self.config.ignore_dirs,
        )?;
        self.logger.info(&format!("Found {} movie directories", directories.len()));

        let mut rows: Vec<IndexRow> = directories
            .iter()
            .map(|directory| {
                let torrent = directory.find_torrent(&torrents);
                match torrent {
                    Some(torrent) => self.logger.debug(&format!(
                        "{} -> {}",
                        directory.name,
                        movie_index::path_to_string(&torrent.path)
                    )),
                    None => self.logger.debug(&format!("{} -> no torrent", directory.name)),
                }
                IndexRow {
                    title: directory.name.clone(),
                    directory: movie_index::path_to_string(&directory.path),
                    magnet: torrent.and_then(|torrent| torrent.magnet.clone()),
                }
            })
            .collect();
        report::sort_rows(&mut rows);

        let matched = rows.iter().filter(|row| row.magnet.is_some()).count();
        self.logger
            .info(&format!("Matched {matched} of {} movies to a magnet", rows.len()));

        let csv = report::render_csv(&rows)?;
        let markdown = report::render_markdown(&rows, last_updated, &self.config.csv_filename);

        let csv_changed = self.update_output(&self.config.csv_path(), &csv)?;
        let markdown_changed = self.update_output(&self.config.markdown_path(), &markdown)?;
        let changed = csv_changed || markdown_changed;

        if !changed {
            self.logger.info("No changes detected in movie library");
        }
        self.logger.debug(&format!(
            "Finished in {}",
            movie_index::format_duration(start.elapsed())
        ));

        Ok(changed)
    }

    /// Decode all torrent files, logging the ones that fail.
    fn load_torrents(&mut self) -> Vec<TorrentRecord> {
        let paths = scan::gather_torrent_files(&self.config.torrents_dir);
        self.logger.info(&format!(
            "Found {} torrent files in {}",
            paths.len(),
            self.config.torrents_dir.display()
        ));

        let (torrents, failures) = scan::load_torrents(&paths, self.config.max_depth);
        for (path, error) in &failures {
            self.logger
                .warning(&format!("Failed to parse {}: {error:#}", movie_index::path_to_string(path)));
        }
        for torrent in &torrents {
            let info_hash = torrent
                .info_hash
                .as_ref()
                .map_or_else(|| "no infohash".to_string(), ToString::to_string);
            self.logger.debug(&format!(
                "{}: {} ({info_hash}, {} files)",
                movie_index::path_to_string(&torrent.path),
                torrent.display_name,
                torrent.files.len()
            ));
        }
        if !failures.is_empty() {
            self.logger.info(&format!(
                "Loaded {} torrents, skipped {}",
                torrents.len(),
                failures.len()
            ));
        }

        torrents
    }

    /// Write the output file if the content changed.
    /// In dry-run mode only prints the pending diff.
    fn update_output(&mut self, path: &Path, content: &str) -> Result<bool> {
        let name = movie_index::path_to_string(path);
        if self.config.dryrun {
            let existing = report::read_existing(path)?;
            if existing == content {
                return Ok(false);
            }
            self.logger.info(&format!("Would update {name}:"));
            movie_index::show_line_diff(&existing, content);
            return Ok(true);
        }

        match report::write_if_changed(path, content) {
            Ok(true) => {
                self.logger.success(&format!("Updated {name}"));
                Ok(true)
            }
            Ok(false) => {
                self.logger.debug(&format!("No changes to {name}"));
                Ok(false)
            }
            Err(error) => {
                self.logger.error(&format!("{error:#}"));
                Err(error)
            }
        }
    }
}
