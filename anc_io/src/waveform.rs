use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use micro_anc::Sample;

use crate::error::WavResult;

/// Writes one `"{index} {amplitude}"` line per sample, for plotting with
/// external tools such as gnuplot.
pub fn write_waveform<P: AsRef<Path>>(path: P, samples: &[Sample]) -> WavResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_waveform_to(&mut writer, samples)?;
    writer.flush()?;
    Ok(())
}

pub fn write_waveform_to<W: Write>(writer: &mut W, samples: &[Sample]) -> std::io::Result<()> {
    for (index, amplitude) in samples.iter().enumerate() {
        writeln!(writer, "{} {}", index, amplitude)?;
    }
    Ok(())
}
