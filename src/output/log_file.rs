//! Crawl log file generation
//!
//! Writes `<domain>_log.txt` in the line format existing consumers parse:
//!
//! ```text
//! <N> Pages Found:
//! <page URL>...
//!
//! <M> Assests Found:
//! <asset URL>...
//! ```
//!
//! Both headers end with a space, and `Assests` is spelled exactly like that.

use crate::output::aggregator::CrawlResult;
use crate::output::OutputResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Returns the log file name for a domain
pub fn log_file_name(domain: &str) -> String {
    format!("{}_log.txt", domain)
}

/// Writes the crawl log for `domain` into `directory`, overwriting any existing file
///
/// Lines are written one at a time; the first failing write aborts the rest and
/// is returned. The in-memory result is never touched.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_log_file(
    directory: &Path,
    domain: &str,
    result: &CrawlResult,
) -> OutputResult<PathBuf> {
    let path = directory.join(log_file_name(domain));
    let mut writer = BufWriter::new(File::create(&path)?);
    write_log(&mut writer, result)?;
    writer.flush()?;
    Ok(path)
}

/// Writes the log lines to any writer
pub fn write_log<W: Write>(writer: &mut W, result: &CrawlResult) -> OutputResult<()> {
    writeln!(writer, "{} Pages Found: ", result.pages.len())?;
    for page in &result.pages {
        writeln!(writer, "{}", page)?;
    }

    writeln!(writer)?;

    writeln!(writer, "{} Assests Found: ", result.assets.len())?;
    for asset in &result.assets {
        writeln!(writer, "{}", asset)?;
    }

    Ok(())
}

/// Formats the crawl log as a string
pub fn format_log(result: &CrawlResult) -> String {
    let mut log = String::new();

    log.push_str(&format!("{} Pages Found: \n", result.pages.len()));
    for page in &result.pages {
        log.push_str(page);
        log.push('\n');
    }

    log.push('\n');

    log.push_str(&format!("{} Assests Found: \n", result.assets.len()));
    for asset in &result.assets {
        log.push_str(asset);
        log.push('\n');
    }

    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputError;
    use std::io;
    use tempfile::TempDir;

    fn sample() -> CrawlResult {
        CrawlResult::new(
            vec![
                "https://example.com/".to_string(),
                "https://example.com/about".to_string(),
            ],
            vec!["https://example.com/img.png".to_string()],
        )
    }

    const SAMPLE_LOG: &str = "2 Pages Found: \n\
https://example.com/\n\
https://example.com/about\n\
\n\
1 Assests Found: \n\
https://example.com/img.png\n";

    #[test]
    fn test_format_exact_bytes() {
        assert_eq!(format_log(&sample()), SAMPLE_LOG);
    }

    #[test]
    fn test_format_empty_result() {
        assert_eq!(
            format_log(&CrawlResult::default()),
            "0 Pages Found: \n\n0 Assests Found: \n"
        );
    }

    #[test]
    fn test_writer_matches_formatter() {
        let mut buffer = Vec::new();
        write_log(&mut buffer, &sample()).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), format_log(&sample()));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(log_file_name("example.com"), "example.com_log.txt");
    }

    #[test]
    fn test_write_file() {
        let dir = TempDir::new().unwrap();
        let path = write_log_file(dir.path(), "example.com", &sample()).unwrap();

        assert_eq!(path, dir.path().join("example.com_log.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SAMPLE_LOG);
    }

    #[test]
    fn test_write_twice_is_byte_identical_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("example.com_log.txt");
        std::fs::write(&path, "stale content that is much longer than the new log file\n".repeat(10))
            .unwrap();

        write_log_file(dir.path(), "example.com", &sample()).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_log_file(dir.path(), "example.com", &sample()).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, SAMPLE_LOG.as_bytes());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does/not/exist");
        let result = write_log_file(&missing, "example.com", &sample());
        assert!(matches!(result, Err(OutputError::Io(_))));
    }

    struct FailAfter {
        remaining: usize,
        written: Vec<u8>,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.remaining -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_aborts_remaining_lines() {
        let mut writer = FailAfter {
            remaining: 1,
            written: Vec::new(),
        };
        let result = write_log(&mut writer, &sample());

        assert!(matches!(result, Err(OutputError::Io(_))));
        let written = String::from_utf8(writer.written).unwrap();
        assert!(!written.contains("Assests"));
    }
}
