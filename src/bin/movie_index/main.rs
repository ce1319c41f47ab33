//! movindex - Index a movie library and link movies to magnets from torrent files.
//!
//! Scans the movie library for movie directories, decodes every `.torrent` file in the torrents directory,
//! matches each movie directory to a torrent and writes a CSV and a Markdown index.

mod config;
mod index;
mod logger;
mod report;
mod scan;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::index::MovieIndex;

/// Exit code used when the run succeeded but no output file changed.
const NO_CHANGES_EXIT_CODE: u8 = 1;

/// Index a movie library and link movies to magnets from torrent files.
///
/// Every directory directly under the movies directory is a movie.
/// Each movie is matched to a torrent by name or contained file names,
/// and the resulting index is written as CSV and Markdown.
/// Output files are only rewritten when their content changes.
/// Exits with 0 when an output changed and 1 when nothing changed.
#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Index a movie library and link movies to magnets from torrent files"
)]
pub struct MovieIndexArgs {
    /// Movie library directory
    #[arg(short = 'm', long = "movies", name = "MOVIES_DIR", value_hint = clap::ValueHint::DirPath)]
    movies_dir: Option<PathBuf>,

    /// Directory to search recursively for torrent files
    #[arg(short = 't', long = "torrents", name = "TORRENTS_DIR", value_hint = clap::ValueHint::DirPath)]
    torrents_dir: Option<PathBuf>,

    /// Output directory for the index files
    #[arg(short = 'o', long = "output", name = "OUTPUT_DIR", value_hint = clap::ValueHint::DirPath)]
    output_dir: Option<PathBuf>,

    /// CSV output filename
    #[arg(short = 'c', long = "csv", name = "CSV_NAME")]
    csv_filename: Option<String>,

    /// Markdown output filename
    #[arg(short = 'k', long = "markdown", name = "MD_NAME")]
    markdown_filename: Option<String>,

    /// Include hidden movie directories
    #[arg(short = 'a', long)]
    all: bool,

    /// Movie directory names to ignore
    #[arg(short = 'i', long = "ignore", num_args = 1, action = clap::ArgAction::Append, name = "NAME")]
    ignore_dirs: Vec<String>,

    /// Append log messages to this file
    #[arg(short = 'f', long = "log-file", name = "LOG_FILE", value_hint = clap::ValueHint::FilePath)]
    log_file: Option<PathBuf>,

    /// Maximum nesting depth allowed in torrent files
    #[arg(short = 'd', long = "max-depth", name = "DEPTH")]
    max_depth: Option<usize>,

    /// Only print changes without writing files
    #[arg(short = 'p', long)]
    print: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = MovieIndexArgs::parse();

    // Handle shell completion generation
    if let Some(ref shell) = args.completion {
        movie_index::generate_shell_completion(*shell, MovieIndexArgs::command(), true, env!("CARGO_BIN_NAME"))?;
        return Ok(ExitCode::SUCCESS);
    }

    let changed = MovieIndex::new(args)?.run()?;
    Ok(if changed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(NO_CHANGES_EXIT_CODE)
    })
}
