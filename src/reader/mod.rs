//! Audio Decoders
//!
//! An [`AudioFileReader`] decodes a source into interleaved 16-bit PCM and
//! pushes it block by block into an [`AudioProcessor`].
//!
//! - [`VecAudioReader`]: PCM already held in memory
//! - [`WavFileReader`]: WAV files via `hound` (feature `wav`)

#[cfg(feature = "wav")]
mod wav;

#[cfg(feature = "wav")]
pub use wav::WavFileReader;

use crate::processor::AudioProcessor;
use crate::{Result, WaveformError};

/// Samples (not frames) pushed per `process` call
pub const BUFFER_SIZE: usize = 16_384;

/// Source of interleaved PCM
pub trait AudioFileReader {
    /// Decode the whole source into `processor`
    fn run(&mut self, processor: &mut dyn AudioProcessor) -> Result<()>;
}

/// Logs percentage progress whenever it changes
#[derive(Debug)]
pub(crate) struct ProgressReporter {
    percent: Option<u64>,
}

impl ProgressReporter {
    pub(crate) fn new() -> Self {
        ProgressReporter { percent: None }
    }

    pub(crate) fn update(&mut self, done: u64, total: u64) {
        let percent = if total > 0 {
            (done * 100 / total).min(100)
        } else {
            0
        };

        if self.percent != Some(percent) {
            self.percent = Some(percent);
            log::debug!("Done: {}%", percent);
        }
    }
}

/// Reader over interleaved samples held in memory
#[derive(Debug, Clone)]
pub struct VecAudioReader {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: usize,
}

impl VecAudioReader {
    /// Wrap interleaved `samples` with `channels` channels
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: usize) -> Self {
        VecAudioReader {
            samples,
            sample_rate,
            channels,
        }
    }
}

impl AudioFileReader for VecAudioReader {
    fn run(&mut self, processor: &mut dyn AudioProcessor) -> Result<()> {
        if self.channels == 0 {
            return Err(WaveformError::ConfigError(
                "Audio must have at least one channel".into(),
            ));
        }

        let total_frames = self.samples.len() / self.channels;

        processor.init(
            self.sample_rate,
            self.channels,
            total_frames as u64,
            BUFFER_SIZE,
        )?;

        if !processor.should_continue() {
            return Ok(());
        }

        let mut progress = ProgressReporter::new();
        progress.update(0, total_frames as u64);

        let frames_per_block = (BUFFER_SIZE / self.channels).max(1);
        let mut frames_done = 0;

        for block in self.samples[..total_frames * self.channels]
            .chunks(frames_per_block * self.channels)
        {
            let frames = block.len() / self.channels;
            processor.process(block, frames)?;

            frames_done += frames;
            progress.update(frames_done as u64, total_frames as u64);
        }

        processor.done();
        Ok(())
    }
}
