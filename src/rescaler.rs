//! Waveform re-binning
//!
//! Rescaling turns a [`WaveformBuffer`] into a coarser one using only the
//! reduced `(min, max)` data. Input pixel `i` covers source samples
//! `[i * in_spp, (i + 1) * in_spp)` and output pixel `j` covers
//! `[j * out_spp, (j + 1) * out_spp)`. Each output pair is the envelope of
//! every input pixel that overlaps it, so an input pixel straddling an output
//! boundary contributes to both neighbours. The result never hides a peak that
//! the input shows.
//!
//! The output holds `ceil(size * in_spp / out_spp)` points.

use crate::buffer::WaveformBuffer;
use crate::{Result, WaveformError};

/// Running envelope of one output pixel, per channel
struct Envelope {
    min: Vec<i16>,
    max: Vec<i16>,
    empty: bool,
}

impl Envelope {
    fn new(channels: usize) -> Self {
        Envelope {
            min: vec![i16::MAX; channels],
            max: vec![i16::MIN; channels],
            empty: true,
        }
    }

    fn reset(&mut self) {
        self.min.iter_mut().for_each(|m| *m = i16::MAX);
        self.max.iter_mut().for_each(|m| *m = i16::MIN);
        self.empty = true;
    }

    fn fold(&mut self, input: &WaveformBuffer, index: usize) {
        for channel in 0..self.min.len() {
            self.min[channel] = self.min[channel].min(input.min_sample(channel, index));
            self.max[channel] = self.max[channel].max(input.max_sample(channel, index));
        }
        self.empty = false;
    }

    fn emit(&mut self, output: &mut WaveformBuffer) {
        for (&min, &max) in self.min.iter().zip(&self.max) {
            output.append_samples(min, max);
        }
        self.reset();
    }
}

/// Re-bins waveform data to a coarser resolution
pub struct WaveformRescaler;

impl WaveformRescaler {
    /// Rescale `input` to `samples_per_pixel`, which must be strictly greater
    /// than the input's. Equal resolutions are rejected; callers that want a
    /// pass-through should compare first.
    pub fn rescale(input: &WaveformBuffer, samples_per_pixel: u32) -> Result<WaveformBuffer> {
        let sample_rate = input.sample_rate();
        let input_spp = u64::from(input.samples_per_pixel());
        let output_spp = u64::from(samples_per_pixel);

        if sample_rate == 0 {
            return Err(WaveformError::Precondition(
                "Input sample rate must be greater than zero".into(),
            ));
        }
        if input_spp == 0 || output_spp == 0 {
            return Err(WaveformError::Precondition(
                "Samples per pixel must be greater than zero".into(),
            ));
        }
        if output_spp <= input_spp {
            return Err(WaveformError::Precondition(format!(
                "Cannot rescale to {} samples/pixel, must be greater than input {} samples/pixel",
                output_spp, input_spp
            )));
        }

        log::info!(
            "Rescaling to {} samples/pixel\nInput scale: {} samples/pixel\nOutput scale: {} samples/pixel\nInput buffer size: {}",
            samples_per_pixel,
            input_spp,
            output_spp,
            input.size()
        );

        let channels = input.channels();
        let mut output = WaveformBuffer::new();
        output.set_channels(channels)?;
        output.set_sample_rate(sample_rate);
        output.set_samples_per_pixel(samples_per_pixel);
        output.set_bits(input.bits());

        let mut envelope = Envelope::new(channels);
        let mut output_index: u64 = 0;

        for index in 0..input.size() {
            let start = index as u64 * input_spp;
            let end = start + input_spp;

            // Output pixels holding the first and last sample of this input
            // pixel. They differ by at most one since output_spp > input_spp.
            let first = start / output_spp;
            let last = (end - 1) / output_spp;

            if first != output_index {
                if !envelope.empty {
                    envelope.emit(&mut output);
                }
                output_index = first;
            }

            envelope.fold(input, index);

            if last != output_index {
                envelope.emit(&mut output);
                envelope.fold(input, index);
                output_index = last;
            }
        }

        if !envelope.empty {
            envelope.emit(&mut output);
        }

        log::info!("Generated {} points", output.size());

        Ok(output)
    }
}
