//! Output file handling shared by the binary, JSON and text writers.

use crate::{Result, WaveformError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `path` through a temp file in the same directory, persisting it
/// only once `write` has succeeded and the data is flushed.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }

    temp.persist(path)
        .map_err(|e| WaveformError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.dat");

        let result = write_atomically(&path, |w| {
            w.write_all(b"partial")?;
            Err(WaveformError::Other("disk on fire".into()))
        });

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_successful_write_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        write_atomically(&path, |w| {
            w.write_all(b"hello")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }
}
