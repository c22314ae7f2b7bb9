use super::field::{
    DeclaredType, FieldBuffer, FieldError, NumericKind, Schema, VariantRecord, VariantSite,
};
use crate::utils::util::Result;
use std::{cell::Cell, collections::HashMap};

/// Encodes one GT allele the way BCF stores it.
pub fn gt(allele: i32, phased: bool) -> i32 {
    ((allele + 1) << 1) | i32::from(phased)
}

#[derive(Debug, Clone, Default)]
pub struct MockSchema {
    fields: HashMap<Vec<u8>, DeclaredType>,
    samples: Vec<String>,
}

impl MockSchema {
    pub fn new(samples: &[&str]) -> Self {
        MockSchema {
            fields: HashMap::new(),
            samples: samples.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_field(mut self, tag: &str, declared: DeclaredType) -> Self {
        self.fields.insert(tag.as_bytes().to_vec(), declared);
        self
    }
}

impl Schema for MockSchema {
    fn field_type(&self, tag: &[u8]) -> DeclaredType {
        self.fields
            .get(tag)
            .cloned()
            .unwrap_or(DeclaredType::NotDeclared)
    }

    fn sample_names(&self) -> Vec<String> {
        self.samples.clone()
    }
}

#[derive(Debug, Clone)]
pub enum MockField {
    Integer(Vec<Vec<i32>>),
    Float(Vec<Vec<f32>>),
}

/// In-memory record, biallelic `chr1:100 A>T` unless told otherwise.
#[derive(Debug, Clone)]
pub struct MockRecord {
    pub site: VariantSite,
    pub n_allele: usize,
    pub n_sample: usize,
    fields: HashMap<Vec<u8>, MockField>,
    genotypes: Option<Vec<Vec<i32>>>,
    decode_calls: Cell<usize>,
}

impl MockRecord {
    pub fn new(n_sample: usize) -> Self {
        MockRecord {
            site: VariantSite {
                contig: "chr1".to_string(),
                pos: 100,
                ref_allele: "A".to_string(),
                alt_allele: Some("T".to_string()),
            },
            n_allele: 2,
            n_sample,
            fields: HashMap::new(),
            genotypes: None,
            decode_calls: Cell::new(0),
        }
    }

    pub fn monomorphic(mut self) -> Self {
        self.n_allele = 1;
        self.site.alt_allele = None;
        self
    }

    pub fn with_integers(mut self, tag: &str, values: Vec<Vec<i32>>) -> Self {
        self.fields
            .insert(tag.as_bytes().to_vec(), MockField::Integer(values));
        self
    }

    pub fn with_floats(mut self, tag: &str, values: Vec<Vec<f32>>) -> Self {
        self.fields
            .insert(tag.as_bytes().to_vec(), MockField::Float(values));
        self
    }

    pub fn with_genotypes(mut self, values: Vec<Vec<i32>>) -> Self {
        self.genotypes = Some(values);
        self
    }

    pub fn decode_calls(&self) -> usize {
        self.decode_calls.get()
    }

    fn slices<T>(values: &[Vec<T>]) -> Vec<&[T]> {
        values.iter().map(Vec::as_slice).collect()
    }
}

impl VariantRecord for MockRecord {
    fn site(&self) -> Result<VariantSite> {
        Ok(self.site.clone())
    }

    fn allele_count(&self) -> usize {
        self.n_allele
    }

    fn sample_count(&self) -> usize {
        self.n_sample
    }

    fn format_values(
        &self,
        tag: &[u8],
        kind: NumericKind,
        buffer: &mut FieldBuffer,
    ) -> std::result::Result<usize, FieldError> {
        self.decode_calls.set(self.decode_calls.get() + 1);
        let tag_name = String::from_utf8_lossy(tag).into_owned();
        match (self.fields.get(tag), kind) {
            (None, _) => Err(FieldError::Absent { tag: tag_name }),
            (Some(MockField::Integer(values)), NumericKind::Integer) => {
                Ok(buffer.load(&Self::slices(values)))
            }
            (Some(MockField::Float(values)), NumericKind::Float) => {
                Ok(buffer.load(&Self::slices(values)))
            }
            (Some(_), kind) => Err(FieldError::Decode {
                tag: tag_name,
                message: format!("not stored as {kind:?}"),
            }),
        }
    }

    fn genotypes(&self, buffer: &mut FieldBuffer) -> std::result::Result<usize, FieldError> {
        self.decode_calls.set(self.decode_calls.get() + 1);
        match &self.genotypes {
            Some(values) => Ok(buffer.load(&Self::slices(values))),
            None => Err(FieldError::Absent {
                tag: "GT".to_string(),
            }),
        }
    }
}
