use super::options::{AmplitudeScale, Options, Zoom};
use anyhow::{bail, Context};
use audiowaveform::amplitude::{amplitude_scale, scale_amplitude};
use audiowaveform::reader::{AudioFileReader, WavFileReader};
use audiowaveform::{
    Bits, DurationCalculator, FileFormat, ScaleFactor, WaveformBuffer, WaveformGenerator,
    WaveformRescaler,
};
use std::path::Path;

/// Pick the scale factor from the command line. `duration` is only called
/// for `--zoom auto`.
fn scale_factor<F>(options: &Options, duration: F) -> anyhow::Result<ScaleFactor>
where
    F: FnOnce() -> anyhow::Result<f64>,
{
    if (options.zoom.is_some() || options.pixels_per_second.is_some()) && options.end.is_some() {
        bail!("Specify either end time or zoom level, but not both");
    }

    if options.zoom.is_some() && options.pixels_per_second.is_some() {
        bail!("Specify either zoom or pixels per second, but not both");
    }

    if let Some(end) = options.end {
        return Ok(ScaleFactor::duration(options.start, end, options.width)?);
    }

    if let Some(pixels_per_second) = options.pixels_per_second {
        return Ok(ScaleFactor::pixels_per_second(pixels_per_second)?);
    }

    match options.zoom.unwrap_or_default() {
        Zoom::SamplesPerPixel(samples_per_pixel) => {
            Ok(ScaleFactor::samples_per_pixel(samples_per_pixel))
        }
        Zoom::Auto => {
            let duration = duration()?;
            log::info!("Duration: {:.3} seconds", duration);
            Ok(ScaleFactor::duration(0.0, duration, options.width)?)
        }
    }
}

fn wav_duration(path: &Path) -> anyhow::Result<f64> {
    let mut reader = WavFileReader::open(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let mut calculator = DurationCalculator::new();
    reader.run(&mut calculator)?;
    Ok(calculator.duration())
}

fn apply_amplitude_scale(buffer: &mut WaveformBuffer, scale: AmplitudeScale) -> anyhow::Result<()> {
    let factor = match scale {
        AmplitudeScale::Fixed(factor) => factor,
        AmplitudeScale::Auto if buffer.is_empty() => return Ok(()),
        AmplitudeScale::Auto => amplitude_scale(buffer, 0, buffer.size())?,
    };

    if factor != 1.0 {
        log::info!("Amplitude scale: {}", factor);
        scale_amplitude(buffer, factor);
    }

    Ok(())
}

fn save(buffer: &WaveformBuffer, path: &Path, format: FileFormat, bits: Bits) -> anyhow::Result<()> {
    match format {
        FileFormat::Dat => buffer.save(path, bits),
        FileFormat::Json => buffer.save_as_json(path, bits),
        FileFormat::Txt => buffer.save_as_text(path, bits),
        FileFormat::Wav => bail!("Can't write waveform data as {}", format),
    }
    .with_context(|| format!("Failed to write file: {}", path.display()))
}

fn load(path: &Path, format: FileFormat) -> anyhow::Result<WaveformBuffer> {
    match format {
        FileFormat::Dat => WaveformBuffer::load(path),
        FileFormat::Json => WaveformBuffer::load_json(path),
        FileFormat::Wav | FileFormat::Txt => bail!("Can't read waveform data from {}", format),
    }
    .with_context(|| format!("Failed to read file: {}", path.display()))
}

fn generate_waveform_data(options: &Options, output_format: FileFormat) -> anyhow::Result<()> {
    let input = options.input_filename.as_path();
    let scale = scale_factor(options, || wav_duration(input))?;

    let mut reader = WavFileReader::open(input)
        .with_context(|| format!("Failed to read file: {}", input.display()))?;
    let mut generator = WaveformGenerator::new(scale, options.split_channels);
    reader.run(&mut generator)?;

    let mut buffer = generator.into_buffer();
    apply_amplitude_scale(&mut buffer, options.amplitude_scale)?;

    let bits = options.bits.unwrap_or(Bits::Sixteen);
    save(&buffer, &options.output_filename, output_format, bits)
}

fn convert_waveform_data(
    options: &Options,
    input_format: FileFormat,
    output_format: FileFormat,
) -> anyhow::Result<()> {
    let input = load(&options.input_filename, input_format)?;
    let bits = options.bits.unwrap_or(input.bits());

    let mut buffer = if options.has_scale_option() {
        let scale = scale_factor(options, || Ok(input.duration_seconds()))?;
        let samples_per_pixel = scale.get_samples_per_pixel(input.sample_rate());
        let input_samples_per_pixel = input.samples_per_pixel();

        if samples_per_pixel > input_samples_per_pixel {
            WaveformRescaler::rescale(&input, samples_per_pixel)?
        } else if samples_per_pixel == input_samples_per_pixel {
            input
        } else {
            bail!("Invalid zoom, minimum: {}", input_samples_per_pixel);
        }
    } else {
        input
    };

    apply_amplitude_scale(&mut buffer, options.amplitude_scale)?;
    save(&buffer, &options.output_filename, output_format, bits)
}

/// Run the conversion selected by the input and output file types
pub fn run(options: &Options) -> anyhow::Result<()> {
    let input_format = match options.input_format {
        Some(format) => format,
        None => FileFormat::from_path(&options.input_filename)?,
    };
    let output_format = match options.output_format {
        Some(format) => format,
        None => FileFormat::from_path(&options.output_filename)?,
    };

    match (input_format, output_format) {
        (FileFormat::Wav, FileFormat::Dat | FileFormat::Json | FileFormat::Txt) => {
            generate_waveform_data(options, output_format)
        }
        (FileFormat::Dat | FileFormat::Json, FileFormat::Dat | FileFormat::Json | FileFormat::Txt) => {
            convert_waveform_data(options, input_format, output_format)
        }
        _ => bail!(
            "Can't generate {} from {}",
            options.output_filename.display(),
            options.input_filename.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn options(args: &[&str]) -> Options {
        let mut argv = vec!["audiowaveform"];
        argv.extend_from_slice(args);
        Options::try_parse_from(argv).unwrap()
    }

    fn write_wav(path: &Path, frames: usize) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample(((i % 200) as i16 - 100) * 10).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_scale_factor_conflicts() {
        let opts = options(&["-i", "a.wav", "-o", "b.dat", "-z", "512", "-e", "2"]);
        assert!(scale_factor(&opts, || Ok(1.0)).is_err());

        let opts = options(&["-i", "a.wav", "-o", "b.dat", "-z", "512", "--pixels-per-second", "10"]);
        assert!(scale_factor(&opts, || Ok(1.0)).is_err());
    }

    #[test]
    fn test_scale_factor_selection() {
        let opts = options(&["-i", "a.wav", "-o", "b.dat"]);
        assert_eq!(scale_factor(&opts, || Ok(1.0)).unwrap().get_samples_per_pixel(8_000), 256);

        let opts = options(&["-i", "a.wav", "-o", "b.dat", "-s", "1", "-e", "3", "-w", "100"]);
        assert_eq!(scale_factor(&opts, || Ok(1.0)).unwrap().get_samples_per_pixel(8_000), 160);

        let opts = options(&["-i", "a.wav", "-o", "b.dat", "--pixels-per-second", "50"]);
        assert_eq!(scale_factor(&opts, || Ok(1.0)).unwrap().get_samples_per_pixel(8_000), 160);

        let opts = options(&["-i", "a.wav", "-o", "b.dat", "-z", "auto", "-w", "400"]);
        assert_eq!(scale_factor(&opts, || Ok(2.0)).unwrap().get_samples_per_pixel(8_000), 40);
    }

    #[test]
    fn test_generate_then_rescale_json() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("in.wav");
        let dat = dir.path().join("out.dat");
        let json = dir.path().join("out.json");
        write_wav(&wav, 8_000);

        let opts = options(&["-i", wav.to_str().unwrap(), "-o", dat.to_str().unwrap(), "-z", "100"]);
        run(&opts).unwrap();

        let buffer = WaveformBuffer::load(&dat).unwrap();
        assert_eq!(buffer.samples_per_pixel(), 100);
        assert_eq!(buffer.size(), 80);

        let opts = options(&["-i", dat.to_str().unwrap(), "-o", json.to_str().unwrap(), "-z", "400", "-b", "8"]);
        run(&opts).unwrap();

        let rescaled = WaveformBuffer::load_json(&json).unwrap();
        assert_eq!(rescaled.samples_per_pixel(), 400);
        assert_eq!(rescaled.size(), 20);
        assert_eq!(rescaled.bits(), Bits::Eight);
    }

    #[test]
    fn test_finer_zoom_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("in.wav");
        let dat = dir.path().join("out.dat");
        let txt = dir.path().join("out.txt");
        write_wav(&wav, 1_000);

        run(&options(&["-i", wav.to_str().unwrap(), "-o", dat.to_str().unwrap(), "-z", "256"])).unwrap();

        let err = run(&options(&["-i", dat.to_str().unwrap(), "-o", txt.to_str().unwrap(), "-z", "128"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid zoom, minimum: 256");
        assert!(!txt.exists());
    }

    #[test]
    fn test_unsupported_combination() {
        let err = run(&options(&["-i", "a.txt", "-o", "b.dat"])).unwrap_err();
        assert_eq!(err.to_string(), "Can't generate b.dat from a.txt");
    }

    #[test]
    fn test_auto_amplitude_scale_reaches_full_scale() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("in.wav");
        let dat = dir.path().join("out.dat");
        write_wav(&wav, 2_000);

        run(&options(&[
            "-i",
            wav.to_str().unwrap(),
            "-o",
            dat.to_str().unwrap(),
            "--amplitude-scale",
            "auto",
        ]))
        .unwrap();

        // the negative peak (-1000) limits the factor
        let buffer = WaveformBuffer::load(&dat).unwrap();
        let low = (0..buffer.size())
            .map(|i| buffer.min_sample(0, i))
            .min()
            .unwrap();
        assert!(low <= -32766);
    }
}
