use crate::{
    constants::STDIN_PATH,
    core::field::{
        DeclaredType, FieldBuffer, FieldError, NumericKind, Schema, VariantRecord, VariantSite,
    },
    error::DosageError,
    utils::util::{lossy_text, Result},
};
use rust_htslib::{
    bcf::{
        self,
        header::{HeaderRecord, HeaderView},
        Read,
    },
    errors::Error as HtsError,
};
use std::path::Path;

pub struct VcfReader {
    pub reader: bcf::Reader,
    pub current_record: bcf::Record,
    pub n_records: usize,
}

fn is_stdin(input: Option<&Path>) -> bool {
    input.map_or(true, |path| path == Path::new(STDIN_PATH))
}

impl VcfReader {
    /// Opens a VCF, VCF.gz or BCF file, or standard input when `input` is `None` or `-`.
    pub fn new(input: Option<&Path>, threads: usize) -> Result<Self> {
        let mut reader = match input {
            Some(path) if !is_stdin(input) => {
                log::trace!("Start loading VCF {:?}", path);
                bcf::Reader::from_path(path).map_err(|e| {
                    crate::dosage_error!("Failed to open VCF file {}: {}", path.display(), e)
                })?
            }
            _ => {
                log::trace!("Start loading VCF from standard input");
                bcf::Reader::from_stdin().map_err(|e| {
                    crate::dosage_error!("Failed to open VCF from standard input: {}", e)
                })?
            }
        };

        if threads > 1 {
            reader.set_threads(threads).map_err(|e| {
                crate::dosage_error!("Failed to set {} decompression threads: {}", threads, e)
            })?;
            log::trace!("Using {} decompression threads", threads);
        }

        log::debug!("{} samples in input", reader.header().sample_count());
        let current_record = reader.empty_record();
        Ok(VcfReader {
            reader,
            current_record,
            n_records: 0,
        })
    }

    pub fn header(&self) -> &HeaderView {
        self.reader.header()
    }

    pub fn advance(&mut self) -> Result<bool> {
        match self.reader.read(&mut self.current_record) {
            Some(Ok(())) => {
                self.n_records += 1;
                Ok(true)
            }
            Some(Err(e)) => Err(crate::dosage_error!(
                "Error reading record {} from VCF: {e}",
                self.n_records + 1
            )),
            None => Ok(false),
        }
    }
}

fn parse_header_tag_type(type_name: Option<&str>) -> DeclaredType {
    match type_name {
        Some("Integer") => DeclaredType::Integer,
        Some("Float") => DeclaredType::Float,
        Some(other) => DeclaredType::Other(other.to_string()),
        None => DeclaredType::Other("undefined".to_string()),
    }
}

impl Schema for HeaderView {
    fn field_type(&self, tag: &[u8]) -> DeclaredType {
        for record in self.header_records() {
            let HeaderRecord::Format { values, .. } = record else {
                continue;
            };
            if values.get("ID").map(String::as_bytes) == Some(tag) {
                return parse_header_tag_type(values.get("Type").map(String::as_str));
            }
        }
        DeclaredType::NotDeclared
    }

    fn sample_names(&self) -> Vec<String> {
        self.samples()
            .into_iter()
            .map(lossy_text)
            .collect()
    }
}

fn field_error(tag: &[u8], error: HtsError) -> FieldError {
    let tag = lossy_text(tag);
    match error {
        HtsError::BcfUndefinedTag { .. } | HtsError::BcfMissingTag { .. } => {
            FieldError::Absent { tag }
        }
        other => FieldError::Decode {
            tag,
            message: other.to_string(),
        },
    }
}

impl VariantRecord for bcf::Record {
    fn site(&self) -> Result<VariantSite> {
        let pos = self.pos() + 1;
        let rid = self.rid().ok_or_else(|| DosageError::MissingContig {
            context: format!("position {pos}"),
        })?;
        let contig = std::str::from_utf8(self.header().rid2name(rid)?)?.to_string();
        let alleles = self.alleles();
        Ok(VariantSite {
            contig,
            pos,
            ref_allele: alleles.first().map(|a| lossy_text(a)).unwrap_or_default(),
            alt_allele: alleles.get(1).map(|a| lossy_text(a)),
        })
    }

    fn allele_count(&self) -> usize {
        bcf::Record::allele_count(self) as usize
    }

    fn sample_count(&self) -> usize {
        bcf::Record::sample_count(self) as usize
    }

    fn format_values(
        &self,
        tag: &[u8],
        kind: NumericKind,
        buffer: &mut FieldBuffer,
    ) -> std::result::Result<usize, FieldError> {
        let format = self.format(tag);
        let width = match kind {
            NumericKind::Integer => format.integer().map(|values| buffer.load::<i32>(&values)),
            NumericKind::Float => format.float().map(|values| buffer.load::<f32>(&values)),
        };
        width.map_err(|e| field_error(tag, e))
    }

    fn genotypes(&self, buffer: &mut FieldBuffer) -> std::result::Result<usize, FieldError> {
        self.format(b"GT")
            .integer()
            .map(|values| buffer.load::<i32>(&values))
            .map_err(|e| field_error(b"GT", e))
    }
}
