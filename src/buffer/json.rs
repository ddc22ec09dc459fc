//! JSON waveform data format
//!
//! ```json
//! {"version":2,"channels":1,"sample_rate":16000,"samples_per_pixel":64,
//!  "bits":16,"length":2,"data":[-1024,1024,-2048,2048]}
//! ```
//!
//! `data` is the flat channel-interleaved min/max array. When `bits` is 8
//! the values are the 16-bit samples divided by 256.

use super::output::write_atomically;
use super::{Bits, WaveformBuffer};
use crate::{Result, WaveformError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Version written by [`WaveformBuffer::save_as_json`]
pub const JSON_VERSION: u32 = 2;

/// On-disk JSON document. Field order is the key order on output.
#[derive(Debug, Serialize, Deserialize)]
struct WaveformJson {
    version: u32,
    channels: u32,
    sample_rate: u32,
    samples_per_pixel: u32,
    bits: u32,
    length: u32,
    data: Vec<i32>,
}

impl WaveformJson {
    fn into_buffer(self) -> Result<WaveformBuffer> {
        if self.version != 1 && self.version != 2 {
            return Err(WaveformError::UnsupportedVersion(self.version as i32));
        }

        WaveformBuffer::validate_header(
            self.sample_rate.into(),
            self.samples_per_pixel.into(),
            self.channels.into(),
        )?;

        if self.version == 1 && self.channels != 1 {
            return Err(WaveformError::ParseError(format!(
                "Invalid number of channels: {}, version 1 data must be mono",
                self.channels
            )));
        }

        let bits = Bits::try_from(self.bits)
            .map_err(|_| WaveformError::ParseError(format!("Invalid bits: {}", self.bits)))?;

        let (low, high) = match bits {
            Bits::Eight => (i8::MIN as i32, i8::MAX as i32),
            Bits::Sixteen => (i16::MIN as i32, i16::MAX as i32),
        };
        let multiplier = i32::from(bits.divisor());

        // Values past the declared length are ignored
        let declared = self.length as usize * self.channels as usize * 2;

        let data = self
            .data
            .iter()
            .take(declared)
            .map(|&value| {
                if value < low || value > high {
                    Err(WaveformError::ParseError(format!(
                        "Sample value {} out of range for {}-bit data",
                        value, bits
                    )))
                } else {
                    Ok((value * multiplier) as i16)
                }
            })
            .collect::<Result<Vec<i16>>>()?;

        let mut buffer = WaveformBuffer::new();
        buffer.set_channels(self.channels as usize)?;
        buffer.set_sample_rate(self.sample_rate);
        buffer.set_samples_per_pixel(self.samples_per_pixel);
        buffer.set_bits(bits);
        buffer.data = data;
        buffer.truncate_to_whole_points();

        if buffer.size() != self.length as usize {
            log::warn!(
                "Expected {} points, read {} min and max points",
                self.length,
                buffer.size()
            );
        }

        Ok(buffer)
    }
}

impl WaveformBuffer {
    /// Load a JSON waveform data file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Reading waveform data file: {}", path.display());

        let file = File::open(path)?;
        Self::read_json(BufReader::new(file))
    }

    /// Parse a JSON waveform document from any reader
    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        let doc: WaveformJson = serde_json::from_reader(reader)?;
        let buffer = doc.into_buffer()?;

        log::info!(
            "Sample rate: {} Hz\nBits: {}\nSamples per pixel: {}\nLength: {} points\nChannels: {}",
            buffer.sample_rate(),
            buffer.bits(),
            buffer.samples_per_pixel(),
            buffer.size(),
            buffer.channels()
        );

        Ok(buffer)
    }

    /// Save as a JSON waveform data file
    pub fn save_as_json<P: AsRef<Path>>(&self, path: P, bits: Bits) -> Result<()> {
        let path = path.as_ref();
        log::info!("Writing output file: {}", path.display());

        write_atomically(path, |writer| self.write_json(writer, bits))
    }

    /// Write the JSON format (with trailing newline) to any writer
    pub fn write_json<W: Write>(&self, mut writer: W, bits: Bits) -> Result<()> {
        let divisor = bits.divisor();

        let doc = WaveformJson {
            version: JSON_VERSION,
            channels: self.channels as u32,
            sample_rate: self.sample_rate,
            samples_per_pixel: self.samples_per_pixel,
            bits: bits.as_u32(),
            length: self.size() as u32,
            data: self.data.iter().map(|&v| i32::from(v / divisor)).collect(),
        };

        serde_json::to_writer(&mut writer, &doc)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_buffer() -> WaveformBuffer {
        let mut buffer = WaveformBuffer::new();
        buffer.set_sample_rate(16_000);
        buffer.set_samples_per_pixel(64);
        buffer.append_samples(-1024, 1024);
        buffer.append_samples(-2048, 2048);
        buffer
    }

    fn to_json(buffer: &WaveformBuffer, bits: Bits) -> String {
        let mut out = Vec::new();
        buffer.write_json(&mut out, bits).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_json_16_bit_output() {
        assert_eq!(
            to_json(&mono_buffer(), Bits::Sixteen).trim_end(),
            r#"{"version":2,"channels":1,"sample_rate":16000,"samples_per_pixel":64,"bits":16,"length":2,"data":[-1024,1024,-2048,2048]}"#
        );
    }

    #[test]
    fn test_json_8_bit_output() {
        assert_eq!(
            to_json(&mono_buffer(), Bits::Eight).trim_end(),
            r#"{"version":2,"channels":1,"sample_rate":16000,"samples_per_pixel":64,"bits":8,"length":2,"data":[-4,4,-8,8]}"#
        );
    }

    #[test]
    fn test_json_round_trip() {
        let mut buffer = WaveformBuffer::new();
        buffer.set_channels(2).unwrap();
        buffer.set_sample_rate(48_000);
        buffer.set_samples_per_pixel(512);
        buffer.append_samples(-100, 200);
        buffer.append_samples(-300, 400);

        let json = to_json(&buffer, Bits::Sixteen);
        let loaded = WaveformBuffer::read_json(json.as_bytes()).unwrap();
        assert_eq!(loaded, buffer);
    }

    #[test]
    fn test_json_8_bit_load_scales_up() {
        let json = r#"{"version":2,"channels":1,"sample_rate":8000,"samples_per_pixel":32,"bits":8,"length":1,"data":[-128,127]}"#;
        let loaded = WaveformBuffer::read_json(json.as_bytes()).unwrap();
        assert_eq!(loaded.bits(), Bits::Eight);
        assert_eq!(loaded.min_sample(0, 0), -32768);
        assert_eq!(loaded.max_sample(0, 0), 32512);
    }

    #[test]
    fn test_json_missing_key_is_error() {
        let json = r#"{"version":2,"channels":1,"sample_rate":8000,"bits":16,"length":0,"data":[]}"#;
        assert!(matches!(
            WaveformBuffer::read_json(json.as_bytes()),
            Err(WaveformError::Json(_))
        ));
    }

    #[test]
    fn test_json_wrong_type_is_error() {
        let json = r#"{"version":"2","channels":1,"sample_rate":8000,"samples_per_pixel":32,"bits":16,"length":0,"data":[]}"#;
        assert!(matches!(
            WaveformBuffer::read_json(json.as_bytes()),
            Err(WaveformError::Json(_))
        ));
    }

    #[test]
    fn test_json_unsupported_version() {
        let json = r#"{"version":3,"channels":1,"sample_rate":8000,"samples_per_pixel":32,"bits":16,"length":0,"data":[]}"#;
        assert!(matches!(
            WaveformBuffer::read_json(json.as_bytes()),
            Err(WaveformError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn test_json_invalid_bits() {
        let json = r#"{"version":2,"channels":1,"sample_rate":8000,"samples_per_pixel":32,"bits":12,"length":0,"data":[]}"#;
        assert!(matches!(
            WaveformBuffer::read_json(json.as_bytes()),
            Err(WaveformError::ParseError(_))
        ));
    }

    #[test]
    fn test_json_out_of_range_sample() {
        let json = r#"{"version":2,"channels":1,"sample_rate":8000,"samples_per_pixel":32,"bits":8,"length":1,"data":[-129,0]}"#;
        assert!(matches!(
            WaveformBuffer::read_json(json.as_bytes()),
            Err(WaveformError::ParseError(_))
        ));
    }

    #[test]
    fn test_json_short_data_is_soft() {
        let json = r#"{"version":2,"channels":2,"sample_rate":8000,"samples_per_pixel":32,"bits":16,"length":3,"data":[1,2,3,4,5,6]}"#;
        let loaded = WaveformBuffer::read_json(json.as_bytes()).unwrap();
        assert_eq!(loaded.size(), 1);
        assert_eq!(loaded.data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_json_extra_data_beyond_length_is_ignored() {
        let json = r#"{"version":2,"channels":1,"sample_rate":8000,"samples_per_pixel":32,"bits":16,"length":1,"data":[-1,1,-2,2,-3,3]}"#;
        let loaded = WaveformBuffer::read_json(json.as_bytes()).unwrap();
        assert_eq!(loaded.size(), 1);
        assert_eq!(loaded.data(), &[-1, 1]);
    }

    #[test]
    fn test_json_version_1_must_be_mono() {
        let json = r#"{"version":1,"channels":3,"sample_rate":8000,"samples_per_pixel":32,"bits":16,"length":0,"data":[]}"#;
        assert!(matches!(
            WaveformBuffer::read_json(json.as_bytes()),
            Err(WaveformError::ParseError(_))
        ));

        let json = r#"{"version":1,"channels":1,"sample_rate":8000,"samples_per_pixel":32,"bits":16,"length":1,"data":[-5,5]}"#;
        let loaded = WaveformBuffer::read_json(json.as_bytes()).unwrap();
        assert_eq!(loaded.channels(), 1);
        assert_eq!(loaded.size(), 1);
    }

    #[test]
    fn test_save_and_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.json");

        let buffer = mono_buffer();
        buffer.save_as_json(&path, Bits::Sixteen).unwrap();
        let loaded = WaveformBuffer::load_json(&path).unwrap();
        assert_eq!(loaded, buffer);
    }
}
