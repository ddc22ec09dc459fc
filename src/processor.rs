//! Audio processor sink interface
//!
//! Decoders ([`crate::reader::AudioFileReader`]) push interleaved 16-bit PCM
//! blocks into an [`AudioProcessor`]: one `init`, any number of `process`
//! calls, then `done`.

use crate::Result;

/// Consumer of decoded interleaved PCM
pub trait AudioProcessor {
    /// Prepare for a stream. `frame_count` is 0 when the length is unknown.
    fn init(
        &mut self,
        sample_rate: u32,
        channels: usize,
        frame_count: u64,
        buffer_size: usize,
    ) -> Result<()>;

    /// Whether the decoder should push any samples after `init`
    fn should_continue(&self) -> bool {
        true
    }

    /// Consume `frame_count` frames of interleaved samples
    fn process(&mut self, samples: &[i16], frame_count: usize) -> Result<()>;

    /// Called once after the last block
    fn done(&mut self);
}

/// Measures the duration of an audio stream
///
/// When the decoder knows the frame count up front no samples are pushed.
#[derive(Debug, Default)]
pub struct DurationCalculator {
    sample_rate: u32,
    frame_count: u64,
}

impl DurationCalculator {
    /// Create a new calculator
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration in seconds (0 before `init`)
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }
}

impl AudioProcessor for DurationCalculator {
    fn init(
        &mut self,
        sample_rate: u32,
        _channels: usize,
        frame_count: u64,
        _buffer_size: usize,
    ) -> Result<()> {
        self.sample_rate = sample_rate;
        self.frame_count = frame_count;
        Ok(())
    }

    fn should_continue(&self) -> bool {
        self.frame_count == 0
    }

    fn process(&mut self, _samples: &[i16], frame_count: usize) -> Result<()> {
        self.frame_count += frame_count as u64;
        Ok(())
    }

    fn done(&mut self) {}
}
