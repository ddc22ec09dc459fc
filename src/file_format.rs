//! File type detection

use crate::{Result, WaveformError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// File types understood by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// WAV audio (input only)
    Wav,
    /// Binary waveform data
    Dat,
    /// JSON waveform data
    Json,
    /// Plain text waveform data
    Txt,
}

impl FileFormat {
    /// Parse a format name such as `"json"` (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "wav" => Ok(FileFormat::Wav),
            "dat" => Ok(FileFormat::Dat),
            "json" => Ok(FileFormat::Json),
            "txt" => Ok(FileFormat::Txt),
            _ => Err(WaveformError::ConfigError(format!(
                "Unknown file type: {}",
                name
            ))),
        }
    }

    /// Detect the format from a path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                WaveformError::ConfigError(format!(
                    "Unknown file type: {}",
                    path.display()
                ))
            })?;
        Self::from_name(extension)
    }

    /// Lowercase name, matching the file extension
    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Wav => "wav",
            FileFormat::Dat => "dat",
            FileFormat::Json => "json",
            FileFormat::Txt => "txt",
        }
    }

    /// Whether this format holds waveform data (rather than audio)
    pub fn is_waveform_data(self) -> bool {
        matches!(self, FileFormat::Dat | FileFormat::Json | FileFormat::Txt)
    }
}

impl FromStr for FileFormat {
    type Err = WaveformError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
