use crate::{
    constants::MISSING_ALT,
    core::dispatcher::DosageRow,
    error::DosageError,
    utils::util::{format_dosage, Result},
};
use flate2::{write::GzEncoder, Compression};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

enum Sink {
    Plain(Box<dyn Write>),
    Gzip(GzEncoder<BufWriter<File>>),
}

/// Tab-separated dosage table, one line per record.
pub struct DosageWriter {
    sink: Sink,
    n_rows: usize,
}

impl DosageWriter {
    /// Opens `output` for writing, standard output when `None`. Paths ending in `.gz` are gzip
    /// compressed.
    pub fn new(output: Option<&str>) -> Result<Self> {
        let sink = match output {
            None => Sink::Plain(Box::new(BufWriter::new(io::stdout().lock()))),
            Some(path) => {
                let file = File::create(path).map_err(|source| DosageError::OutputOpen {
                    path: Path::new(path).to_path_buf(),
                    source,
                })?;
                if path.ends_with(".gz") {
                    log::debug!("Writing gzip compressed output to {}", path);
                    Sink::Gzip(GzEncoder::new(BufWriter::new(file), Compression::default()))
                } else {
                    log::debug!("Writing output to {}", path);
                    Sink::Plain(Box::new(BufWriter::new(file)))
                }
            }
        };
        Ok(DosageWriter { sink, n_rows: 0 })
    }

    fn out(&mut self) -> &mut dyn Write {
        match &mut self.sink {
            Sink::Plain(writer) => &mut **writer,
            Sink::Gzip(writer) => writer,
        }
    }

    pub fn write_header<S: AsRef<str>>(&mut self, samples: &[S]) -> Result<()> {
        let line = header_line(samples);
        writeln!(self.out(), "{line}")?;
        Ok(())
    }

    pub fn write_row(&mut self, row: &DosageRow) -> Result<()> {
        let line = row_line(row);
        writeln!(self.out(), "{line}")?;
        self.n_rows += 1;
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Flushes buffered output and terminates the gzip stream.
    pub fn finish(self) -> Result<()> {
        match self.sink {
            Sink::Plain(mut writer) => writer.flush()?,
            Sink::Gzip(writer) => writer.finish()?.flush()?,
        }
        Ok(())
    }
}

pub fn header_line<S: AsRef<str>>(samples: &[S]) -> String {
    let mut line = String::from("#[1]CHROM\t[2]POS\t[3]REF\t[4]ALT");
    for (i, sample) in samples.iter().enumerate() {
        line.push_str(&format!("\t[{}]{}", i + 5, sample.as_ref()));
    }
    line
}

pub fn row_line(row: &DosageRow) -> String {
    let site = &row.site;
    let mut line = format!(
        "{}\t{}\t{}\t{}",
        site.contig,
        site.pos,
        site.ref_allele,
        site.alt_allele.as_deref().unwrap_or(MISSING_ALT)
    );
    for &dosage in row.dosages {
        line.push('\t');
        line.push_str(&format_dosage(dosage));
    }
    line
}
