//! PCM to waveform reduction
//!
//! [`WaveformGenerator`] is an [`AudioProcessor`] that folds every
//! `samples_per_pixel` input frames into one `(min, max)` pair per output
//! channel. In mono mode all input channels are averaged (integer division,
//! truncating) before folding. In split-channel mode each input channel keeps
//! its own pair.
//!
//! Samples are clamped to `[-32767, 32767]` before folding, so the envelope is
//! symmetric and can be negated without overflow.

use crate::buffer::WaveformBuffer;
use crate::processor::AudioProcessor;
use crate::scale_factor::ScaleFactor;
use crate::{Result, WaveformError, MAX_CHANNELS};

/// Largest sample value emitted by the generator
pub const MAX_SAMPLE: i32 = i16::MAX as i32;
/// Smallest sample value emitted by the generator
pub const MIN_SAMPLE: i32 = -MAX_SAMPLE;

/// Streaming min/max reducer writing into an owned [`WaveformBuffer`]
#[derive(Debug)]
pub struct WaveformGenerator {
    buffer: WaveformBuffer,
    scale_factor: ScaleFactor,
    split_channels: bool,

    channels: usize,
    output_channels: usize,
    samples_per_pixel: usize,

    // Running state for the pixel being accumulated
    count: usize,
    min: Vec<i32>,
    max: Vec<i32>,
}

impl WaveformGenerator {
    /// Create a generator. With `split_channels` the output keeps one
    /// waveform per input channel, otherwise input is mixed down to mono.
    pub fn new(scale_factor: ScaleFactor, split_channels: bool) -> Self {
        WaveformGenerator {
            buffer: WaveformBuffer::new(),
            scale_factor,
            split_channels,
            channels: 0,
            output_channels: 0,
            samples_per_pixel: 0,
            count: 0,
            min: Vec::new(),
            max: Vec::new(),
        }
    }

    /// Samples per pixel chosen at `init` (0 before)
    pub fn samples_per_pixel(&self) -> usize {
        self.samples_per_pixel
    }

    /// Waveform generated so far
    pub fn buffer(&self) -> &WaveformBuffer {
        &self.buffer
    }

    /// Take the generated waveform
    pub fn into_buffer(self) -> WaveformBuffer {
        self.buffer
    }

    fn reset(&mut self) {
        self.min.iter_mut().for_each(|m| *m = i32::from(i16::MAX));
        self.max.iter_mut().for_each(|m| *m = i32::from(i16::MIN));
        self.count = 0;
    }

    fn flush_pixel(&mut self) {
        for channel in 0..self.output_channels {
            self.buffer
                .append_samples(self.min[channel] as i16, self.max[channel] as i16);
        }
        self.reset();
    }

    #[inline]
    fn fold(&mut self, channel: usize, sample: i32) {
        let sample = sample.clamp(MIN_SAMPLE, MAX_SAMPLE);
        if sample < self.min[channel] {
            self.min[channel] = sample;
        }
        if sample > self.max[channel] {
            self.max[channel] = sample;
        }
    }
}

impl AudioProcessor for WaveformGenerator {
    fn init(
        &mut self,
        sample_rate: u32,
        channels: usize,
        _frame_count: u64,
        _buffer_size: usize,
    ) -> Result<()> {
        if channels < 1 || channels > MAX_CHANNELS {
            return Err(WaveformError::ConfigError(format!(
                "Cannot generate waveform data from audio file with {} channels",
                channels
            )));
        }

        let samples_per_pixel = self.scale_factor.get_samples_per_pixel(sample_rate);
        if samples_per_pixel < 2 {
            return Err(WaveformError::ConfigError(
                "Invalid zoom: minimum 2".into(),
            ));
        }

        self.channels = channels;
        self.output_channels = if self.split_channels { channels } else { 1 };
        self.samples_per_pixel = samples_per_pixel as usize;

        self.buffer.clear();
        self.buffer.set_channels(self.output_channels)?;
        self.buffer.set_sample_rate(sample_rate);
        self.buffer.set_samples_per_pixel(samples_per_pixel);

        self.min = vec![0; self.output_channels];
        self.max = vec![0; self.output_channels];
        self.reset();

        log::info!(
            "Generating waveform data...\nSamples per pixel: {}\nInput channels: {}\nOutput channels: {}",
            samples_per_pixel,
            channels,
            self.output_channels
        );

        Ok(())
    }

    fn process(&mut self, samples: &[i16], frame_count: usize) -> Result<()> {
        if self.channels == 0 {
            return Err(WaveformError::Precondition(
                "process() called before init()".into(),
            ));
        }

        let needed = frame_count * self.channels;
        if samples.len() < needed {
            return Err(WaveformError::Precondition(format!(
                "Expected {} samples for {} frames, got {}",
                needed,
                frame_count,
                samples.len()
            )));
        }

        for frame in samples[..needed].chunks_exact(self.channels) {
            if self.split_channels {
                for (channel, &sample) in frame.iter().enumerate() {
                    self.fold(channel, i32::from(sample));
                }
            } else {
                let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                self.fold(0, sum / self.channels as i32);
            }

            self.count += 1;
            if self.count == self.samples_per_pixel {
                self.flush_pixel();
            }
        }

        Ok(())
    }

    fn done(&mut self) {
        if self.count > 0 {
            self.flush_pixel();
        }

        log::info!("Generated {} points", self.buffer.size());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(spp: u32, split: bool) -> WaveformGenerator {
        WaveformGenerator::new(ScaleFactor::samples_per_pixel(spp), split)
    }

    #[test]
    fn test_rejects_invalid_channel_counts() {
        let mut gen = generator(2, false);
        assert!(gen.init(44_100, 0, 0, 0).is_err());
        assert!(gen.init(44_100, 25, 0, 0).is_err());
        assert!(gen.init(44_100, 24, 0, 0).is_ok());
    }

    #[test]
    fn test_rejects_zoom_below_two() {
        let mut gen = generator(1, false);
        assert!(matches!(
            gen.init(44_100, 1, 0, 0),
            Err(WaveformError::ConfigError(_))
        ));
    }

    #[test]
    fn test_mono_bins_and_partial_flush() {
        let mut gen = generator(3, false);
        gen.init(8_000, 1, 0, 0).unwrap();
        gen.process(&[1, -2, 3, 4, 5], 5).unwrap();
        gen.process(&[-6, 7], 2).unwrap();
        gen.done();

        let buffer = gen.into_buffer();
        assert_eq!(buffer.size(), 3);
        assert_eq!(buffer.data(), &[-2, 3, -6, 5, 7, 7]);
        assert_eq!(buffer.sample_rate(), 8_000);
        assert_eq!(buffer.samples_per_pixel(), 3);
    }

    #[test]
    fn test_no_partial_pixel_when_exact() {
        let mut gen = generator(2, false);
        gen.init(8_000, 1, 0, 0).unwrap();
        gen.process(&[1, 2, 3, 4], 4).unwrap();
        gen.done();
        assert_eq!(gen.buffer().size(), 2);
    }

    #[test]
    fn test_stereo_mixdown_truncates() {
        let mut gen = generator(2, false);
        gen.init(8_000, 2, 0, 0).unwrap();
        // (3 + 0) / 2 = 1, (-3 + 0) / 2 = -1
        gen.process(&[3, 0, -3, 0], 2).unwrap();
        gen.done();
        assert_eq!(gen.buffer().data(), &[-1, 1]);
        assert_eq!(gen.buffer().channels(), 1);
    }

    #[test]
    fn test_split_channels_keeps_channels() {
        let mut gen = generator(2, true);
        gen.init(8_000, 2, 0, 0).unwrap();
        gen.process(&[10, -10, 20, -20, 5, 5], 3).unwrap();
        gen.done();

        let buffer = gen.into_buffer();
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.size(), 2);
        assert_eq!(buffer.min_sample(0, 0), 10);
        assert_eq!(buffer.max_sample(0, 0), 20);
        assert_eq!(buffer.min_sample(1, 0), -20);
        assert_eq!(buffer.max_sample(1, 0), -10);
        assert_eq!(buffer.min_sample(1, 1), 5);
    }

    #[test]
    fn test_clamps_to_symmetric_range() {
        for split in [false, true] {
            let mut gen = generator(2, split);
            gen.init(8_000, 2, 0, 0).unwrap();
            gen.process(&[i16::MAX, i16::MAX, i16::MIN, i16::MIN], 2).unwrap();
            gen.done();

            let buffer = gen.buffer();
            for channel in 0..buffer.channels() {
                assert_eq!(buffer.max_sample(channel, 0), 32767);
                assert_eq!(buffer.min_sample(channel, 0), -32767);
            }
        }
    }

    #[test]
    fn test_short_block_is_error() {
        let mut gen = generator(2, false);
        gen.init(8_000, 2, 0, 0).unwrap();
        assert!(gen.process(&[1, 2, 3], 2).is_err());
    }

    #[test]
    fn test_init_resets_previous_run() {
        let mut gen = generator(2, false);
        gen.init(8_000, 1, 0, 0).unwrap();
        gen.process(&[1, 2, 3], 3).unwrap();
        gen.init(8_000, 1, 0, 0).unwrap();
        gen.process(&[9], 1).unwrap();
        gen.done();
        assert_eq!(gen.buffer().data(), &[9, 9]);
    }

    #[test]
    fn test_pixels_per_second_scale() {
        let scale = ScaleFactor::pixels_per_second(100).unwrap();
        let mut gen = WaveformGenerator::new(scale, false);
        gen.init(16_000, 1, 0, 0).unwrap();
        assert_eq!(gen.samples_per_pixel(), 160);
    }
}
