use audiowaveform::{Bits, FileFormat};
use clap::Parser;
use std::path::PathBuf;

/// Default samples per pixel when no scale option is given
pub const DEFAULT_ZOOM: u32 = 256;

/// `--zoom` value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zoom {
    /// Fixed samples per pixel
    SamplesPerPixel(u32),
    /// Fit the whole input into `--width` pixels
    Auto,
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom::SamplesPerPixel(DEFAULT_ZOOM)
    }
}

/// `--amplitude-scale` value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmplitudeScale {
    /// Multiply by a fixed factor
    Fixed(f64),
    /// Bring the loudest point to full scale
    Auto,
}

fn parse_zoom(value: &str) -> Result<Zoom, String> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok(Zoom::Auto);
    }
    value
        .parse::<u32>()
        .map(Zoom::SamplesPerPixel)
        .map_err(|_| format!("Invalid zoom: {}", value))
}

fn parse_amplitude_scale(value: &str) -> Result<AmplitudeScale, String> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok(AmplitudeScale::Auto);
    }
    match value.parse::<f64>() {
        Ok(scale) if scale.is_finite() && scale >= 0.0 => Ok(AmplitudeScale::Fixed(scale)),
        _ => Err(format!("Invalid amplitude scale: {}", value)),
    }
}

fn parse_bits(value: &str) -> Result<Bits, String> {
    let bits: u32 = value
        .parse()
        .map_err(|_| format!("Invalid bits: {}", value))?;
    Bits::try_from(bits).map_err(|err| err.to_string())
}

fn parse_format(value: &str) -> Result<FileFormat, String> {
    FileFormat::from_name(value).map_err(|err| err.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "audiowaveform", version)]
#[command(about = "Generate waveform data from audio files")]
pub struct Options {
    /// Input file name (.wav, .dat, .json)
    #[arg(short = 'i', long = "input-filename")]
    pub input_filename: PathBuf,

    /// Output file name (.dat, .json, .txt)
    #[arg(short = 'o', long = "output-filename")]
    pub output_filename: PathBuf,

    /// Input file format, overriding the file extension
    #[arg(long, value_parser = parse_format)]
    pub input_format: Option<FileFormat>,

    /// Output file format, overriding the file extension
    #[arg(long, value_parser = parse_format)]
    pub output_format: Option<FileFormat>,

    /// Zoom level in samples per pixel, or "auto" to fit --width
    #[arg(short = 'z', long, value_parser = parse_zoom)]
    pub zoom: Option<Zoom>,

    /// Zoom level in pixels per second
    #[arg(long)]
    pub pixels_per_second: Option<u32>,

    /// Start time in seconds
    #[arg(short = 's', long, default_value_t = 0.0)]
    pub start: f64,

    /// End time in seconds
    #[arg(short = 'e', long)]
    pub end: Option<f64>,

    /// Width in pixels, used with --end or --zoom auto
    #[arg(short = 'w', long, default_value_t = 800)]
    pub width: u32,

    /// Output resolution in bits (8 or 16)
    #[arg(short = 'b', long, value_parser = parse_bits)]
    pub bits: Option<Bits>,

    /// Output one waveform per input channel instead of mixing to mono
    #[arg(long)]
    pub split_channels: bool,

    /// Amplitude multiplier, or "auto"
    #[arg(long, value_parser = parse_amplitude_scale, default_value = "1.0")]
    pub amplitude_scale: AmplitudeScale,

    /// Only log errors
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Options {
    /// Whether any of the options that select a scale factor was given
    pub fn has_scale_option(&self) -> bool {
        self.zoom.is_some() || self.pixels_per_second.is_some() || self.end.is_some()
    }
}
