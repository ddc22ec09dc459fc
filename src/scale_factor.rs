//! Samples-per-pixel policies
//!
//! A [`ScaleFactor`] turns the sample rate of the input audio into the
//! reduction ratio used by the generator (or the target of a rescale).
//! Constructors validate their parameters immediately.

use crate::{Result, WaveformError};

/// How many input frames go into one output pixel
///
/// Only built through the constructors below, so every value has passed
/// validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(Policy);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Policy {
    SamplesPerPixel(u32),
    PixelsPerSecond(u32),
    Duration {
        start_time: f64,
        end_time: f64,
        width_pixels: u32,
    },
}

impl ScaleFactor {
    /// Fixed zoom. Values below 2 are rejected later, when the sample rate
    /// is known.
    pub fn samples_per_pixel(samples_per_pixel: u32) -> Self {
        ScaleFactor(Policy::SamplesPerPixel(samples_per_pixel))
    }

    /// Fixed pixels per second, must be greater than zero
    pub fn pixels_per_second(pixels_per_second: u32) -> Result<Self> {
        if pixels_per_second == 0 {
            return Err(WaveformError::ConfigError(
                "Invalid pixels per second: must be greater than zero".into(),
            ));
        }
        Ok(ScaleFactor(Policy::PixelsPerSecond(pixels_per_second)))
    }

    /// Fit a time range into an image width
    pub fn duration(start_time: f64, end_time: f64, width_pixels: u32) -> Result<Self> {
        if !start_time.is_finite() || !end_time.is_finite() || start_time < 0.0 {
            return Err(WaveformError::ConfigError(format!(
                "Invalid time range: {} to {}",
                start_time, end_time
            )));
        }
        if end_time < start_time {
            return Err(WaveformError::ConfigError(format!(
                "Invalid end time: {}, must be greater than start time {}",
                end_time, start_time
            )));
        }
        if width_pixels < 1 {
            return Err(WaveformError::ConfigError(
                "Invalid image width: minimum 1".into(),
            ));
        }
        Ok(ScaleFactor(Policy::Duration {
            start_time,
            end_time,
            width_pixels,
        }))
    }

    /// Samples per pixel for audio at `sample_rate`
    pub fn get_samples_per_pixel(&self, sample_rate: u32) -> u32 {
        match self.0 {
            Policy::SamplesPerPixel(samples_per_pixel) => samples_per_pixel,
            Policy::PixelsPerSecond(pixels_per_second) => sample_rate / pixels_per_second,
            Policy::Duration {
                start_time,
                end_time,
                width_pixels,
            } => {
                let seconds = end_time - start_time;
                let width_samples = (seconds * sample_rate as f64) as u64;
                let samples_per_pixel = width_samples / u64::from(width_pixels);
                u32::try_from(samples_per_pixel).unwrap_or(u32::MAX)
            }
        }
    }
}
