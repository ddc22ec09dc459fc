//! WAV decoding via `hound`

use super::{AudioFileReader, ProgressReporter, BUFFER_SIZE};
use crate::processor::AudioProcessor;
use crate::{Result, WaveformError};
use hound::{SampleFormat, WavReader};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

type SampleIter<'a> = Box<dyn Iterator<Item = hound::Result<i16>> + 'a>;

/// Decode every sample as 16-bit, whatever the stored format
fn pcm16_samples<'a, R: Read + 'a>(reader: &'a mut WavReader<R>) -> Result<SampleIter<'a>> {
    let spec = reader.spec();
    let bits = u32::from(spec.bits_per_sample);

    let samples: SampleIter<'a> = match (spec.sample_format, bits) {
        (SampleFormat::Int, 1..=16) => {
            let shift = 16 - bits;
            Box::new(reader.samples::<i16>().map(move |s| s.map(|v| v << shift)))
        }
        (SampleFormat::Int, 17..=32) => {
            let shift = bits - 16;
            Box::new(
                reader
                    .samples::<i32>()
                    .map(move |s| s.map(|v| (v >> shift) as i16)),
            )
        }
        (SampleFormat::Float, 32) => Box::new(reader.samples::<f32>().map(|s| {
            s.map(|v| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
        })),
        (format, bits) => {
            return Err(WaveformError::ConfigError(format!(
                "Unsupported WAV sample format: {:?} {}-bit",
                format, bits
            )))
        }
    };

    Ok(samples)
}

/// Reads WAV audio, from a file or any byte source
pub struct WavFileReader<R: Read = BufReader<File>> {
    reader: WavReader<R>,
}

impl WavFileReader<BufReader<File>> {
    /// Open a WAV file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Input file: {}", path.display());
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read> WavFileReader<R> {
    /// Read WAV data from `source`
    pub fn new(source: R) -> Result<Self> {
        let reader = WavReader::new(source)?;
        let spec = reader.spec();

        log::info!(
            "Format: {:?} {}-bit\nChannels: {}\nSample rate: {} Hz\nFrames: {}",
            spec.sample_format,
            spec.bits_per_sample,
            spec.channels,
            spec.sample_rate,
            reader.duration()
        );

        Ok(WavFileReader { reader })
    }

    /// Channel count of the stream
    pub fn channels(&self) -> usize {
        usize::from(self.reader.spec().channels)
    }

    /// Sample rate of the stream in Hz
    pub fn sample_rate(&self) -> u32 {
        self.reader.spec().sample_rate
    }
}

impl<R: Read> AudioFileReader for WavFileReader<R> {
    fn run(&mut self, processor: &mut dyn AudioProcessor) -> Result<()> {
        let spec = self.reader.spec();
        let channels = usize::from(spec.channels).max(1);
        let total_frames = u64::from(self.reader.duration());

        processor.init(spec.sample_rate, usize::from(spec.channels), total_frames, BUFFER_SIZE)?;

        if !processor.should_continue() {
            return Ok(());
        }

        let mut progress = ProgressReporter::new();
        progress.update(0, total_frames);

        let block_len = (BUFFER_SIZE / channels).max(1) * channels;
        let mut block: Vec<i16> = Vec::with_capacity(block_len);
        let mut frames_done: u64 = 0;
        let mut samples = pcm16_samples(&mut self.reader)?;

        loop {
            block.clear();
            for sample in samples.by_ref().take(block_len) {
                block.push(sample?);
            }

            let frames = block.len() / channels;
            if frames > 0 {
                processor.process(&block[..frames * channels], frames)?;
                frames_done += frames as u64;
                progress.update(frames_done, total_frames);
            }

            if block.len() < block_len {
                break;
            }
        }

        processor.done();
        Ok(())
    }
}
