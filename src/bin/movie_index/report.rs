//! CSV and Markdown rendering of the movie index.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

/// CSV column names.
const CSV_HEADER: [&str; 3] = ["title", "directory", "magnet"];

/// One movie in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    /// Movie directory name.
    pub title: String,
    /// Full path of the movie directory.
    pub directory: String,
    /// Magnet of the matched torrent, if any.
    pub magnet: Option<String>,
}

/// Sort rows case-insensitively by title, keeping the original order for equal titles.
pub fn sort_rows(rows: &mut [IndexRow]) {
    rows.sort_by_cached_key(|row| row.title.to_lowercase());
}

/// Render rows as CSV with a header line and CRLF line endings.
pub fn render_csv(rows: &[IndexRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record([
            row.title.as_str(),
            row.directory.as_str(),
            row.magnet.as_deref().unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| anyhow::anyhow!("Failed to finish CSV output: {error}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Render the Markdown summary with one bullet per movie.
///
/// The bullet list is separated from the header by two blank lines.
#[must_use]
pub fn render_markdown(rows: &[IndexRow], last_updated: Option<DateTime<Local>>, csv_filename: &str) -> String {
    let last_updated = last_updated.map_or_else(
        || "unknown".to_string(),
        |time| time.format("%Y-%m-%d %H:%M:%S").to_string(),
    );

    let mut markdown = format!(
        "# Movie Library Index\n\n\
         **Movies:** {}\n\
         **Last Updated:** {last_updated}\n\n\
         _Auto-generated movie list. See {csv_filename} for full details._\n\n\n",
        rows.len()
    );

    for row in rows {
        markdown.push_str("- ");
        markdown.push_str(&row.title);
        markdown.push('\n');
    }

    markdown
}

/// Read the current file content, treating a missing file as empty.
pub fn read_existing(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(error) => Err(error).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Write content only if it differs from what is already in the file.
/// Returns true if the file was written.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if read_existing(path)? == content {
        return Ok(false);
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod report_tests {
    use super::*;

    use chrono::TimeZone;

    fn row(title: &str, magnet: Option<&str>) -> IndexRow {
        IndexRow {
            title: title.to_string(),
            directory: format!("/movies/{title}"),
            magnet: magnet.map(ToString::to_string),
        }
    }

    #[test]
    fn sorts_case_insensitively_and_stable() {
        let mut rows = vec![row("beta", None), row("Alpha", None), row("ALPHA", Some("m")), row("alpha", None)];
        sort_rows(&mut rows);
        let titles: Vec<_> = rows.iter().map(|row| row.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "ALPHA", "alpha", "beta"]);
    }

    #[test]
    fn csv_has_header_and_empty_magnet() {
        let csv = render_csv(&[row("Alpha", Some("magnet:?xt=urn:btih:00")), row("Beta", None)]).expect("should render");
        assert_eq!(
            csv,
            "title,directory,magnet\r\n\
             Alpha,/movies/Alpha,magnet:?xt=urn:btih:00\r\n\
             Beta,/movies/Beta,\r\n"
        );
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        let csv = render_csv(&[row("Crouching Tiger, Hidden Dragon", None)]).expect("should render");
        assert!(csv.contains("\"Crouching Tiger, Hidden Dragon\",\"/movies/Crouching Tiger, Hidden Dragon\",\r\n"));
    }

    #[test]
    fn csv_without_rows_has_header() {
        assert_eq!(render_csv(&[]).expect("should render"), "title,directory,magnet\r\n");
    }

    #[test]
    fn markdown_lists_titles() {
        let time = Local
            .with_ymd_and_hms(2024, 5, 17, 21, 3, 9)
            .single()
            .expect("valid time");
        let markdown = render_markdown(&[row("Alpha", None), row("Beta", None)], Some(time), "movies.csv");
        assert_eq!(
            markdown,
            "# Movie Library Index\n\n\
             **Movies:** 2\n\
             **Last Updated:** 2024-05-17 21:03:09\n\n\
             _Auto-generated movie list. See movies.csv for full details._\n\n\n\
             - Alpha\n\
             - Beta\n"
        );
    }

    #[test]
    fn markdown_without_modification_time() {
        let markdown = render_markdown(&[], None, "index.csv");
        assert!(markdown.contains("**Movies:** 0\n"));
        assert!(markdown.contains("**Last Updated:** unknown\n"));
        assert!(markdown.ends_with("See index.csv for full details._\n\n\n"));
    }

    #[test]
    fn writes_only_when_changed() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("MOVIES.md");

        assert!(write_if_changed(&path, "one\n").expect("should write"));
        assert!(!write_if_changed(&path, "one\n").expect("should compare"));
        assert!(write_if_changed(&path, "two\n").expect("should write"));
        assert_eq!(fs::read_to_string(&path).expect("should read"), "two\n");
    }

    #[test]
    fn existing_index_files_are_left_untouched() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let csv_path = dir.path().join("movies.csv");
        let markdown_path = dir.path().join("MOVIES.md");
        fs::write(&csv_path, "title,directory,magnet\r\nAlpha,/movies/Alpha,\r\n").expect("should write");
        fs::write(
            &markdown_path,
            "# Movie Library Index\n\n**Movies:** 1\n**Last Updated:** unknown\n\n\
             _Auto-generated movie list. See movies.csv for full details._\n\n\n- Alpha\n",
        )
        .expect("should write");

        let rows = [row("Alpha", None)];
        let csv = render_csv(&rows).expect("should render");
        let markdown = render_markdown(&rows, None, "movies.csv");
        assert!(!write_if_changed(&csv_path, &csv).expect("should compare"));
        assert!(!write_if_changed(&markdown_path, &markdown).expect("should compare"));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        assert_eq!(read_existing(&dir.path().join("none.csv")).expect("should read"), "");
    }
}
