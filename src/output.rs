//! Persists a report as CSV readable by spreadsheet tools that expect a byte-order mark.

use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error writing report '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing report '{0}'")]
    Csv(PathBuf, #[source] PolarsError),

    #[error("Failed to move finished report into place at '{0}'")]
    Persist(PathBuf, #[source] tempfile::PersistError),
}

/// Writes `frame` to `path` as BOM-prefixed UTF-8 CSV with a header row.
///
/// The file is assembled next to the destination and renamed over it once
/// complete, so an interrupted run never leaves a partial report behind.
pub fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<(), OutputError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| OutputError::Io(dir.clone(), e))?;

    let mut temp_file =
        NamedTempFile::new_in(&dir).map_err(|e| OutputError::Io(path.to_path_buf(), e))?;
    temp_file
        .write_all(UTF8_BOM)
        .map_err(|e| OutputError::Io(path.to_path_buf(), e))?;
    CsvWriter::new(&mut temp_file)
        .include_header(true)
        .finish(frame)
        .map_err(|e| OutputError::Csv(path.to_path_buf(), e))?;
    temp_file
        .flush()
        .map_err(|e| OutputError::Io(path.to_path_buf(), e))?;

    temp_file
        .persist(path)
        .map_err(|e| OutputError::Persist(path.to_path_buf(), e))?;
    log::info!("Wrote {} rows to {:?}", frame.height(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_bom_header_and_nulls() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("monthly.csv");
        let mut df = df!(
            "station" => ["108", "108"],
            "month" => [1i32, 2],
            "sunshine" => [Some(3.0), None],
        )?;

        write_csv(&mut df, &path)?;

        let bytes = std::fs::read(&path)?;
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..])?;
        assert_eq!(text, "station,month,sunshine\n108,1,3.0\n108,2,\n");
        Ok(())
    }

    #[test]
    fn replaces_existing_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "stale")?;

        let mut df = df!("region" => ["경기"], "sunshine" => [5.5])?;
        write_csv(&mut df, &path)?;

        let text = std::fs::read_to_string(&path)?;
        assert!(text.ends_with("region,sunshine\n경기,5.5\n"));
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
