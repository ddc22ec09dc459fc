//! Binary waveform data format (`.dat`)
//!
//! All fields are little-endian:
//!
//! | Offset | Type  | Field                               |
//! |--------|-------|-------------------------------------|
//! | 0      | i32   | version (1 or 2)                    |
//! | 4      | u32   | flags (bit 0: 8-bit samples)        |
//! | 8      | i32   | sample rate (Hz)                    |
//! | 12     | i32   | samples per pixel                   |
//! | 16     | u32   | point count                         |
//! | 20     | i32   | channels (version 2 only)           |
//!
//! followed by `point_count * channels` min/max pairs, stored as i8 or i16.
//!
//! A file that ends before all declared points is still loaded: the points
//! actually present become the buffer size and a warning is logged. A bad
//! header is always an error.

use super::output::write_atomically;
use super::{Bits, WaveformBuffer};
use crate::{Result, WaveformError};
use bitflags::bitflags;
use nom::multi::count;
use nom::number::complete::{le_i16, le_i32, le_i8, le_u32};
use nom::IResult;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

bitflags! {
    /// Header flags word
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HeaderFlags: u32 {
        /// Samples are stored as signed 8-bit values
        const EIGHT_BIT = 0x0000_0001;
    }
}

/// Size of the version 1 header in bytes
pub const HEADER_SIZE_V1: usize = 20;
/// Size of the version 2 header in bytes
pub const HEADER_SIZE_V2: usize = 24;

/// Parsed `.dat` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatHeader {
    /// Format version (1 or 2)
    pub version: i32,
    /// Flags word
    pub flags: HeaderFlags,
    /// Sample rate in Hz
    pub sample_rate: i32,
    /// Samples per pixel
    pub samples_per_pixel: i32,
    /// Declared number of points
    pub size: u32,
    /// Channel count (1 for version 1 files)
    pub channels: i32,
}

impl DatHeader {
    /// Resolution of the stored samples
    pub fn bits(&self) -> Bits {
        if self.flags.contains(HeaderFlags::EIGHT_BIT) {
            Bits::Eight
        } else {
            Bits::Sixteen
        }
    }
}

fn parse_fields(input: &[u8], version: i32) -> IResult<&[u8], DatHeader> {
    let (input, flags) = le_u32(input)?;
    let (input, sample_rate) = le_i32(input)?;
    let (input, samples_per_pixel) = le_i32(input)?;
    let (input, size) = le_u32(input)?;
    let (input, channels) = if version == 2 {
        le_i32(input)?
    } else {
        (input, 1)
    };

    Ok((
        input,
        DatHeader {
            version,
            flags: HeaderFlags::from_bits_retain(flags),
            sample_rate,
            samples_per_pixel,
            size,
            channels,
        },
    ))
}

fn truncated_header() -> WaveformError {
    WaveformError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "file too short for waveform data header",
    ))
}

/// Parse and validate the header, returning the remaining sample bytes
pub fn parse_header(data: &[u8]) -> Result<(&[u8], DatHeader)> {
    let (rest, version) = le_i32::<_, nom::error::Error<&[u8]>>(data)
        .map_err(|_| truncated_header())?;

    if version != 1 && version != 2 {
        return Err(WaveformError::UnsupportedVersion(version));
    }

    let (rest, header) = parse_fields(rest, version).map_err(|_| truncated_header())?;

    WaveformBuffer::validate_header(
        header.sample_rate.into(),
        header.samples_per_pixel.into(),
        header.channels.into(),
    )?;

    Ok((rest, header))
}

impl WaveformBuffer {
    /// Load a binary waveform data file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Reading waveform data file: {}", path.display());

        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse binary waveform data held in memory
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (samples, header) = parse_header(data)?;

        let channels = header.channels as usize;
        let bits = header.bits();
        let sample_size = match bits {
            Bits::Eight => 1,
            Bits::Sixteen => 2,
        };

        let available = samples.len() / (channels * 2 * sample_size);
        let points = available.min(header.size as usize);
        let values = points * channels * 2;

        let decoded: IResult<&[u8], Vec<i16>> = match bits {
            Bits::Eight => count(le_i8, values)(samples)
                .map(|(rest, v)| (rest, v.into_iter().map(|s| i16::from(s) * 256).collect())),
            Bits::Sixteen => count(le_i16, values)(samples),
        };
        let (_, data) = decoded
            .map_err(|e| WaveformError::ParseError(format!("Failed to read samples: {}", e)))?;

        let mut buffer = WaveformBuffer::new();
        buffer.set_channels(channels)?;
        buffer.set_sample_rate(header.sample_rate as u32);
        buffer.set_samples_per_pixel(header.samples_per_pixel as u32);
        buffer.set_bits(bits);
        buffer.data = data;

        log::info!(
            "Sample rate: {} Hz\nBits: {}\nSamples per pixel: {}\nLength: {} points\nChannels: {}",
            buffer.sample_rate(),
            bits,
            buffer.samples_per_pixel(),
            buffer.size(),
            channels
        );

        if buffer.size() != header.size as usize {
            log::warn!(
                "Expected {} points, read {} min and max points",
                header.size,
                buffer.size()
            );
        }

        Ok(buffer)
    }

    /// Save as a binary waveform data file
    ///
    /// Mono buffers are written as version 1, anything else as version 2.
    pub fn save<P: AsRef<Path>>(&self, path: P, bits: Bits) -> Result<()> {
        let path = path.as_ref();
        log::info!(
            "Writing output file: {}\nResolution: {} bits",
            path.display(),
            bits
        );

        write_atomically(path, |writer| self.write_to(writer, bits))
    }

    /// Write the binary format to any writer
    pub fn write_to<W: Write>(&self, mut writer: W, bits: Bits) -> Result<()> {
        let version: i32 = if self.channels == 1 { 1 } else { 2 };

        let mut flags = HeaderFlags::empty();
        if bits == Bits::Eight {
            flags |= HeaderFlags::EIGHT_BIT;
        }

        writer.write_all(&version.to_le_bytes())?;
        writer.write_all(&flags.bits().to_le_bytes())?;
        writer.write_all(&(self.sample_rate as i32).to_le_bytes())?;
        writer.write_all(&(self.samples_per_pixel as i32).to_le_bytes())?;
        writer.write_all(&(self.size() as u32).to_le_bytes())?;

        if version == 2 {
            writer.write_all(&(self.channels as i32).to_le_bytes())?;
        }

        match bits {
            Bits::Eight => {
                let bytes: Vec<u8> = self
                    .data
                    .iter()
                    .map(|&v| ((v / 256) as i8) as u8)
                    .collect();
                writer.write_all(&bytes)?;
            }
            Bits::Sixteen => {
                let bytes: Vec<u8> = self.data.iter().flat_map(|v| v.to_le_bytes()).collect();
                writer.write_all(&bytes)?;
            }
        }

        Ok(())
    }

    /// Encode the binary format into a byte vector
    pub fn to_bytes(&self, bits: Bits) -> Vec<u8> {
        let mut bytes = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut bytes, bits);
        bytes
    }
}
