//! Configuration for movindex.
//!
//! Handles reading configuration from CLI arguments and the user config file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Deserialize;

use movie_index::bencode::DEFAULT_MAX_DEPTH;

use crate::MovieIndexArgs;

/// Default CSV output filename.
const DEFAULT_CSV_FILENAME: &str = "movies.csv";

/// Default Markdown output filename.
const DEFAULT_MARKDOWN_FILENAME: &str = "MOVIES.md";

/// User configuration from the config file.
#[derive(Debug, Default, Deserialize)]
pub struct MovieIndexConfig {
    /// Movie library directory.
    #[serde(default)]
    movies_dir: Option<PathBuf>,
    /// Directory searched recursively for torrent files.
    #[serde(default)]
    torrents_dir: Option<PathBuf>,
    /// Directory for the generated index files.
    #[serde(default)]
    output_dir: Option<PathBuf>,
    #[serde(default)]
    csv_filename: Option<String>,
    #[serde(default)]
    markdown_filename: Option<String>,
    /// Skip movie directories starting with a dot. Defaults to true.
    #[serde(default)]
    skip_hidden: Option<bool>,
    /// Movie directory names to ignore.
    #[serde(default)]
    ignore_dirs: Vec<String>,
    /// Append log messages to this file.
    #[serde(default)]
    log_file: Option<PathBuf>,
    /// Maximum nesting depth allowed in torrent files.
    #[serde(default)]
    max_depth: Option<usize>,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    movie_index: MovieIndexConfig,
}

/// Final config combined from CLI arguments and user config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) movies_dir: PathBuf,
    pub(crate) torrents_dir: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) csv_filename: String,
    pub(crate) markdown_filename: String,
    pub(crate) skip_hidden: bool,
    pub(crate) ignore_dirs: Vec<String>,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) max_depth: usize,
    pub(crate) dryrun: bool,
    pub(crate) verbose: bool,
}

impl MovieIndexConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub(crate) fn get_user_config() -> Result<Self> {
        let Some(path) = movie_index::config::CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.movie_index)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the movies or torrents directory is missing or does not exist.
    pub fn from_args(args: MovieIndexArgs, user_config: MovieIndexConfig) -> Result<Self> {
        let movies_dir = args
            .movies_dir
            .or(user_config.movies_dir)
            .context("Movies directory not set: use --movies or set movies_dir in the config file")?;
        let movies_dir = movie_index::resolve_required_dir(&movies_dir, "Movies directory")?;

        let torrents_dir = args
            .torrents_dir
            .or(user_config.torrents_dir)
            .context("Torrents directory not set: use --torrents or set torrents_dir in the config file")?;
        let torrents_dir = movie_index::resolve_required_dir(&torrents_dir, "Torrents directory")?;

        let output_dir = match args.output_dir.or(user_config.output_dir) {
            Some(path) => dunce::simplified(&path).to_path_buf(),
            None => std::env::current_dir().context("Failed to get current working directory")?,
        };

        let csv_filename = args
            .csv_filename
            .or(user_config.csv_filename)
            .unwrap_or_else(|| DEFAULT_CSV_FILENAME.to_string());

        let markdown_filename = args
            .markdown_filename
            .or(user_config.markdown_filename)
            .unwrap_or_else(|| DEFAULT_MARKDOWN_FILENAME.to_string());

        if csv_filename.trim().is_empty() || markdown_filename.trim().is_empty() {
            anyhow::bail!("Output filenames must not be empty");
        }

        let max_depth = args.max_depth.or(user_config.max_depth).unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            anyhow::bail!("Maximum nesting depth must be at least 1");
        }

        let ignore_dirs = user_config
            .ignore_dirs
            .into_iter()
            .chain(args.ignore_dirs)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unique()
            .collect();

        Ok(Self {
            movies_dir,
            torrents_dir,
            output_dir,
            csv_filename,
            markdown_filename,
            skip_hidden: !args.all && user_config.skip_hidden.unwrap_or(true),
            ignore_dirs,
            log_file: args.log_file.or(user_config.log_file),
            max_depth,
            dryrun: args.print || user_config.dryrun,
            verbose: args.verbose || user_config.verbose,
        })
    }

    #[must_use]
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.csv_filename)
    }

    #[must_use]
    pub fn markdown_path(&self) -> PathBuf {
        self.output_dir.join(&self.markdown_filename)
    }
}
