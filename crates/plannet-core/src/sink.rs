//! CSV output sink

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A flat row with a fixed column order.
///
/// `COLUMNS` is written as the header; the serialized fields must follow
/// the same order.
pub trait Record: Serialize {
    const COLUMNS: &'static [&'static str];
}

/// CSV writer that always emits the header, even for zero rows.
///
/// Truncates any existing file at the target path.
pub struct CsvSink<R> {
    writer: csv::Writer<fs::File>,
    path: PathBuf,
    row_count: usize,
    _record: PhantomData<fn(&R)>,
}

impl<R> std::fmt::Debug for CsvSink<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvSink")
            .field("path", &self.path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl<R: Record> CsvSink<R> {
    /// Create (or truncate) `path` and write the header row
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Header comes from `R::COLUMNS`; serde headers vanish on zero rows
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(R::COLUMNS)?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            row_count: 0,
            _record: PhantomData,
        })
    }

    pub fn write(&mut self, record: &R) -> io::Result<()> {
        self.writer.serialize(record)?;
        self.row_count += 1;
        Ok(())
    }

    /// Flush and close the file, returning the number of data rows
    pub fn finalize(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        log::debug!("{}: {} rows written", self.path.display(), self.row_count);
        Ok(self.row_count)
    }
}

/// Write all `records` to `path` in one go
pub fn write_csv<'a, R, I>(path: &Path, records: I) -> io::Result<usize>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut sink = CsvSink::create(path)?;
    for record in records {
        sink.write(record)?;
    }
    sink.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Pair {
        key: String,
        #[serde(rename = "someValue")]
        value: String,
    }

    impl Record for Pair {
        const COLUMNS: &'static [&'static str] = &["key", "someValue"];
    }

    fn pair(key: &str, value: &str) -> Pair {
        Pair {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn zero_rows_is_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");

        let rows = write_csv::<Pair, _>(&path, &[]).unwrap();

        assert_eq!(rows, 0);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec!["key,someValue"]);
    }

    #[test]
    fn rows_follow_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pairs.csv");

        let rows = write_csv(&path, &[pair("a", "1"), pair("b", "2")]).unwrap();

        assert_eq!(rows, 2);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().collect::<Vec<_>>(),
            vec!["key,someValue", "a,1", "b,2"]
        );
    }

    #[test]
    fn quotes_delimiters_and_quotes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quoted.csv");

        write_csv(&path, &[pair("x", "123, 456"), pair("y", r#"say "hi""#)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[1], r#"x,"123, 456""#);
        assert_eq!(lines[2], r#"y,"say ""hi""""#);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale\ncontent\nhere\n").unwrap();

        write_csv(&path, &[pair("k", "v")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec!["key,someValue", "k,v"]);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/out.csv");

        let mut sink = CsvSink::create(&path).unwrap();
        sink.write(&pair("k", "v")).unwrap();
        assert_eq!(sink.finalize().unwrap(), 1);
        assert!(path.exists());
    }
}
