//! Amplitude scaling
//!
//! Helpers to stretch quiet waveforms vertically. [`amplitude_scale`] finds
//! the factor that brings the loudest point of a range to full scale, and
//! [`scale_amplitude`] applies a factor in place.

use crate::buffer::WaveformBuffer;
use crate::{Result, WaveformError};

const FULL_SCALE: f64 = i16::MAX as f64;

/// Multiply a sample, clamping to the i16 range and truncating toward zero
pub fn scale_sample(value: i16, multiplier: f64) -> i16 {
    let result = f64::from(value) * multiplier;
    result.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

fn amplitude_range(buffer: &WaveformBuffer, start_index: usize, end_index: usize) -> (i32, i32) {
    let mut low = i32::MAX;
    let mut high = i32::MIN;

    for index in start_index..end_index {
        for channel in 0..buffer.channels() {
            low = low.min(i32::from(buffer.min_sample(channel, index)));
            high = high.max(i32::from(buffer.max_sample(channel, index)));
        }
    }

    (low, high)
}

/// Factor that maps the peak of pixels `[start_index, end_index)` to full scale
pub fn amplitude_scale(buffer: &WaveformBuffer, start_index: usize, end_index: usize) -> Result<f64> {
    if end_index <= start_index || end_index > buffer.size() {
        return Err(WaveformError::Precondition(format!(
            "Invalid range [{}, {}) for waveform with {} points",
            start_index,
            end_index,
            buffer.size()
        )));
    }

    let (low, high) = amplitude_range(buffer, start_index, end_index);

    let scale_high = if high == 0 { 1.0 } else { FULL_SCALE / f64::from(high) };
    let scale_low = if low == 0 { 1.0 } else { FULL_SCALE / f64::from(low) };

    Ok(scale_high.abs().min(scale_low.abs()))
}

/// Multiply every min/max in the buffer by `amplitude_scale`
pub fn scale_amplitude(buffer: &mut WaveformBuffer, amplitude_scale: f64) {
    for index in 0..buffer.size() {
        for channel in 0..buffer.channels() {
            let min = scale_sample(buffer.min_sample(channel, index), amplitude_scale);
            let max = scale_sample(buffer.max_sample(channel, index), amplitude_scale);
            buffer.set_samples(channel, index, min, max);
        }
    }
}
