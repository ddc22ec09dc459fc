//! Text (CSV) output: one line per pixel, `min,max` per channel, no header.

use super::output::write_atomically;
use super::{Bits, WaveformBuffer};
use crate::Result;
use std::io::Write;
use std::path::Path;

impl WaveformBuffer {
    /// Save as a text file
    pub fn save_as_text<P: AsRef<Path>>(&self, path: P, bits: Bits) -> Result<()> {
        let path = path.as_ref();
        log::info!("Writing output file: {}", path.display());

        write_atomically(path, |writer| self.write_text(writer, bits))
    }

    /// Write the text format to any writer
    pub fn write_text<W: Write>(&self, writer: W, bits: Bits) -> Result<()> {
        let divisor = bits.divisor();
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        let mut record = Vec::with_capacity(self.channels * 2);

        for index in 0..self.size() {
            record.clear();
            for channel in 0..self.channels {
                record.push((self.min_sample(channel, index) / divisor).to_string());
                record.push((self.max_sample(channel, index) / divisor).to_string());
            }
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }
}
