//! Audio waveform data generator
//!
//! Reduces decoded PCM audio into a compact min/max "waveform" representation
//! suitable for visualization, rescales already-reduced data to coarser
//! resolutions, and persists it in binary (`.dat`), JSON and text formats.
//!
//! # Features
//! - Streaming min/max reduction with mono mixdown or per-channel output
//! - Three scale-factor policies: fixed zoom, pixels per second, fit duration
//! - Envelope-preserving rescaling without access to the original samples
//! - Binary format versions 1 and 2, 8-bit and 16-bit resolution
//! - Atomic output files (written to a temp file, persisted on success)
//!
//! # Crate feature flags
//! - `wav` (default): WAV decoding via `hound` ([`reader::WavFileReader`])
//! - `cli` (default): the `audiowaveform` command line binary
//!
//! # Quick start
//! ```no_run
//! use audiowaveform::reader::{AudioFileReader, VecAudioReader};
//! use audiowaveform::{Bits, ScaleFactor, WaveformGenerator, WaveformRescaler};
//!
//! # fn main() -> audiowaveform::Result<()> {
//! let pcm: Vec<i16> = vec![0; 44_100 * 2];
//! let mut reader = VecAudioReader::new(pcm, 44_100, 2);
//! let mut generator = WaveformGenerator::new(ScaleFactor::samples_per_pixel(256), false);
//! reader.run(&mut generator)?;
//!
//! let buffer = generator.into_buffer();
//! let coarse = WaveformRescaler::rescale(&buffer, 1024)?;
//! coarse.save("out.dat", Bits::Eight)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod amplitude; // Amplitude scaling helpers
pub mod buffer; // Waveform data model and persistence
pub mod file_format; // File type detection
pub mod generator; // PCM -> waveform reduction
pub mod processor; // Audio processor sink trait
pub mod reader; // Audio decoders (PCM sources)
pub mod rescaler; // Waveform re-binning
pub mod scale_factor; // Samples-per-pixel policies

/// Error types for waveform generation and persistence
#[derive(thiserror::Error, Debug)]
pub enum WaveformError {
    /// Binary or JSON data declares a version this crate cannot read
    #[error("Cannot load data file version: {0}")]
    UnsupportedVersion(i32),

    /// Malformed header or out-of-range value in a data file
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration (scale factor, bit depth, channel count)
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax error, missing key or wrong value type
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Text (CSV) writer error
    #[error("Text output error: {0}")]
    Csv(#[from] csv::Error),

    /// WAV decoder error
    #[cfg(feature = "wav")]
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Caller violated an operation's precondition
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for WaveformError {
    /// Converts a String into `WaveformError::Other`.
    ///
    /// Prefer the specific variants (`ConfigError`, `ParseError`, ...) where
    /// the caller may want to discriminate on the failure.
    fn from(msg: String) -> Self {
        WaveformError::Other(msg)
    }
}

impl From<&str> for WaveformError {
    fn from(msg: &str) -> Self {
        WaveformError::Other(msg.to_string())
    }
}

/// Result type for waveform operations
pub type Result<T> = std::result::Result<T, WaveformError>;

/// Largest channel count a waveform buffer (or generator input) may carry
pub const MAX_CHANNELS: usize = 24;

// Public API exports
pub use buffer::{Bits, WaveformBuffer};
pub use file_format::FileFormat;
pub use generator::WaveformGenerator;
pub use processor::{AudioProcessor, DurationCalculator};
pub use rescaler::WaveformRescaler;
pub use scale_factor::ScaleFactor;
