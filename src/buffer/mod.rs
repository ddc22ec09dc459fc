//! Waveform Data Model
//!
//! A [`WaveformBuffer`] holds one `(min, max)` pair per channel per pixel,
//! channel-interleaved: for pixel `i` and channel `c` the pair starts at
//! offset `(i * channels + c) * 2`. Samples are always 16-bit in memory;
//! [`Bits`] only selects the resolution used when persisting.
//!
//! Persistence formats:
//! - binary `.dat` (versions 1 and 2), see [`binary`]
//! - JSON, see [`json`]
//! - text (CSV), see [`text`]

pub mod binary;
pub mod json;
mod output;
pub mod text;

use crate::{Result, WaveformError, MAX_CHANNELS};
use std::fmt;

/// Persisted sample resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bits {
    /// Signed 8-bit samples (16-bit value divided by 256)
    Eight,
    /// Signed 16-bit samples
    #[default]
    Sixteen,
}

impl Bits {
    /// Bit count as stored in headers
    pub fn as_u32(self) -> u32 {
        match self {
            Bits::Eight => 8,
            Bits::Sixteen => 16,
        }
    }

    /// Divisor applied to in-memory 16-bit samples when persisting
    pub(crate) fn divisor(self) -> i16 {
        match self {
            Bits::Eight => 256,
            Bits::Sixteen => 1,
        }
    }
}

impl TryFrom<u32> for Bits {
    type Error = WaveformError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            8 => Ok(Bits::Eight),
            16 => Ok(Bits::Sixteen),
            _ => Err(WaveformError::ConfigError(format!(
                "Invalid bits: {}, must be either 8 or 16",
                value
            ))),
        }
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Min/max waveform data for one or more channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformBuffer {
    sample_rate: u32,
    samples_per_pixel: u32,
    bits: Bits,
    channels: usize,
    data: Vec<i16>,
}

impl WaveformBuffer {
    /// Create an empty single-channel buffer
    pub fn new() -> Self {
        WaveformBuffer {
            sample_rate: 0,
            samples_per_pixel: 0,
            bits: Bits::Sixteen,
            channels: 1,
            data: Vec::new(),
        }
    }

    /// Sample rate of the source audio in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Set the sample rate of the source audio
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    /// Number of source frames folded into each pixel
    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    /// Set the reduction ratio
    pub fn set_samples_per_pixel(&mut self, samples_per_pixel: u32) {
        self.samples_per_pixel = samples_per_pixel;
    }

    /// Resolution this buffer was loaded from (informational)
    pub fn bits(&self) -> Bits {
        self.bits
    }

    /// Record the resolution this buffer was loaded from
    pub fn set_bits(&mut self, bits: Bits) {
        self.bits = bits;
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Set the channel count. Existing data is reinterpreted, not converted,
    /// so this is meant to be called on an empty buffer.
    pub fn set_channels(&mut self, channels: usize) -> Result<()> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(WaveformError::ConfigError(format!(
                "Invalid number of channels: {}, must be between 1 and {}",
                channels, MAX_CHANNELS
            )));
        }
        self.channels = channels;
        Ok(())
    }

    /// Number of pixels (points)
    pub fn size(&self) -> usize {
        self.data.len() / (self.channels * 2)
    }

    /// Whether the buffer holds no points
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resize to `size` points, zero-filling new points
    pub fn set_size(&mut self, size: usize) {
        self.data.resize(size * self.channels * 2, 0);
    }

    /// Remove all points, keeping the metadata
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Duration of the source audio covered by this buffer, in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (self.size() as f64 * self.samples_per_pixel as f64) / self.sample_rate as f64
    }

    fn offset(&self, channel: usize, index: usize) -> usize {
        (index * self.channels + channel) * 2
    }

    /// Minimum sample of `channel` at pixel `index`
    ///
    /// # Panics
    /// If `channel` or `index` are out of range.
    pub fn min_sample(&self, channel: usize, index: usize) -> i16 {
        self.data[self.offset(channel, index)]
    }

    /// Maximum sample of `channel` at pixel `index`
    ///
    /// # Panics
    /// If `channel` or `index` are out of range.
    pub fn max_sample(&self, channel: usize, index: usize) -> i16 {
        self.data[self.offset(channel, index) + 1]
    }

    /// Append a pair for the next channel slot.
    ///
    /// Callers append one pair per channel per pixel, in channel order.
    pub fn append_samples(&mut self, min: i16, max: i16) {
        self.data.push(min);
        self.data.push(max);
    }

    /// Overwrite the pair of `channel` at pixel `index`
    ///
    /// # Panics
    /// If `channel` or `index` are out of range.
    pub fn set_samples(&mut self, channel: usize, index: usize, min: i16, max: i16) {
        let offset = self.offset(channel, index);
        self.data[offset] = min;
        self.data[offset + 1] = max;
    }

    /// Raw interleaved min/max data
    pub fn data(&self) -> &[i16] {
        &self.data
    }

    /// Drop any trailing values that don't make up a whole point
    pub(crate) fn truncate_to_whole_points(&mut self) {
        let whole = self.size() * self.channels * 2;
        self.data.truncate(whole);
    }

    /// Check the header fields a persisted buffer must satisfy
    pub(crate) fn validate_header(
        sample_rate: i64,
        samples_per_pixel: i64,
        channels: i64,
    ) -> Result<()> {
        if sample_rate < 1 {
            return Err(WaveformError::ParseError(format!(
                "Invalid sample rate: {} Hz, minimum 1 Hz",
                sample_rate
            )));
        }
        if samples_per_pixel < 2 {
            return Err(WaveformError::ParseError(format!(
                "Invalid samples per pixel: {}, minimum 2",
                samples_per_pixel
            )));
        }
        if channels < 1 || channels > MAX_CHANNELS as i64 {
            return Err(WaveformError::ParseError(format!(
                "Invalid number of channels: {}, must be between 1 and {}",
                channels, MAX_CHANNELS
            )));
        }
        Ok(())
    }
}

impl Default for WaveformBuffer {
    fn default() -> Self {
        Self::new()
    }
}
