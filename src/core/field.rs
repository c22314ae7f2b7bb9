//! Access contract between the dosage engine and whatever stores the variant records.
//!
//! The engine never touches a record directly. It asks a [`Schema`] which FORMAT fields are
//! declared, and asks a [`VariantRecord`] to decode one field at a time into a [`FieldBuffer`]
//! that the caller owns and reuses from record to record.

use crate::utils::util::{
    Result, MISSING_FLOAT, MISSING_INTEGER, VECTOR_END_FLOAT, VECTOR_END_INTEGER,
};
use num_traits::AsPrimitive;
use std::iter;
use thiserror::Error;

/// Storage type a numeric FORMAT field is decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

/// Type of a FORMAT field as declared in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Integer,
    Float,
    Other(String),
    NotDeclared,
}

/// Why a field could not be read from one particular record.
///
/// Neither case is fatal: the dispatcher moves on to the next configured method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("FORMAT/{tag} is absent from the record")]
    Absent { tag: String },
    #[error("FORMAT/{tag} could not be decoded: {message}")]
    Decode { tag: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSite {
    pub contig: String,
    /// 1-based
    pub pos: i64,
    pub ref_allele: String,
    pub alt_allele: Option<String>,
}

pub trait Schema {
    fn field_type(&self, tag: &[u8]) -> DeclaredType;

    fn sample_names(&self) -> Vec<String>;
}

pub trait VariantRecord {
    fn site(&self) -> Result<VariantSite>;

    fn allele_count(&self) -> usize;

    fn sample_count(&self) -> usize;

    /// Decodes FORMAT/`tag` as `kind` into `buffer` and returns the number of values per sample.
    fn format_values(
        &self,
        tag: &[u8],
        kind: NumericKind,
        buffer: &mut FieldBuffer,
    ) -> std::result::Result<usize, FieldError>;

    /// Decodes the encoded GT alleles into `buffer` and returns the number of alleles per sample.
    fn genotypes(&self, buffer: &mut FieldBuffer) -> std::result::Result<usize, FieldError>;
}

/// A numeric FORMAT representation with its two in-band sentinels.
pub trait FieldValue: Copy + AsPrimitive<f64> {
    const VECTOR_END: Self;

    fn is_missing(self) -> bool;

    fn is_vector_end(self) -> bool;

    fn slots(buffer: &FieldBuffer) -> &[Self];

    fn slots_mut(buffer: &mut FieldBuffer) -> &mut Vec<Self>;
}

impl FieldValue for i32 {
    const VECTOR_END: Self = VECTOR_END_INTEGER;

    fn is_missing(self) -> bool {
        self == MISSING_INTEGER
    }

    fn is_vector_end(self) -> bool {
        self == VECTOR_END_INTEGER
    }

    fn slots(buffer: &FieldBuffer) -> &[Self] {
        &buffer.integers
    }

    fn slots_mut(buffer: &mut FieldBuffer) -> &mut Vec<Self> {
        &mut buffer.integers
    }
}

// Both float sentinels are NaN payloads, so they are matched on bits.
impl FieldValue for f32 {
    const VECTOR_END: Self = VECTOR_END_FLOAT;

    fn is_missing(self) -> bool {
        self.to_bits() == MISSING_FLOAT.to_bits()
    }

    fn is_vector_end(self) -> bool {
        self.to_bits() == VECTOR_END_FLOAT.to_bits()
    }

    fn slots(buffer: &FieldBuffer) -> &[Self] {
        &buffer.floats
    }

    fn slots_mut(buffer: &mut FieldBuffer) -> &mut Vec<Self> {
        &mut buffer.floats
    }
}

/// Reusable decode region: one fixed-width row of values per sample, laid out back to back.
///
/// Every [`FieldBuffer::load`] overwrites the previous content entirely; the allocation is kept
/// so capacity only grows over a run.
#[derive(Debug, Default)]
pub struct FieldBuffer {
    integers: Vec<i32>,
    floats: Vec<f32>,
}

impl FieldBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads per-sample values, padding short samples with the vector-end sentinel up to the
    /// widest sample. Returns that width.
    pub fn load<T: FieldValue>(&mut self, samples: &[&[T]]) -> usize {
        let width = samples.iter().map(|values| values.len()).max().unwrap_or(0);
        let slots = T::slots_mut(self);
        slots.clear();
        for values in samples {
            slots.extend_from_slice(values);
            slots.extend(iter::repeat(T::VECTOR_END).take(width - values.len()));
        }
        width
    }

    pub fn values<T: FieldValue>(&self) -> &[T] {
        T::slots(self)
    }

    pub fn capacity(&self) -> usize {
        self.integers.capacity() + self.floats.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_pads_short_samples_with_vector_end() {
        let mut buffer = FieldBuffer::new();
        let width = buffer.load::<i32>(&[&[1, 2], &[3], &[]]);
        assert_eq!(width, 2);
        assert_eq!(
            buffer.values::<i32>(),
            &[1, 2, 3, VECTOR_END_INTEGER, VECTOR_END_INTEGER, VECTOR_END_INTEGER]
        );
    }

    #[test]
    fn test_load_overwrites_previous_content() {
        let mut buffer = FieldBuffer::new();
        buffer.load::<f32>(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let capacity = buffer.capacity();

        let width = buffer.load::<f32>(&[&[7.0], &[8.0]]);
        assert_eq!(width, 1);
        assert_eq!(buffer.values::<f32>(), &[7.0, 8.0]);
        assert!(buffer.capacity() >= capacity);
    }

    #[test]
    fn test_load_without_samples_has_zero_width() {
        let mut buffer = FieldBuffer::new();
        assert_eq!(buffer.load::<i32>(&[]), 0);
        assert!(buffer.values::<i32>().is_empty());
    }

    #[test]
    fn test_integer_and_float_slots_are_independent() {
        let mut buffer = FieldBuffer::new();
        buffer.load::<i32>(&[&[10, 20]]);
        buffer.load::<f32>(&[&[0.5]]);
        assert_eq!(buffer.values::<i32>(), &[10, 20]);
        assert_eq!(buffer.values::<f32>(), &[0.5]);
    }

    #[test]
    fn test_float_sentinels_are_matched_on_bits() {
        assert!(MISSING_FLOAT.is_missing());
        assert!(!MISSING_FLOAT.is_vector_end());
        assert!(VECTOR_END_FLOAT.is_vector_end());
        assert!(!VECTOR_END_FLOAT.is_missing());
        assert!(!f32::NAN.is_missing());
        assert!(!0.0f32.is_missing());
    }

    #[test]
    fn test_integer_sentinels() {
        assert!(MISSING_INTEGER.is_missing());
        assert!(VECTOR_END_INTEGER.is_vector_end());
        assert!(!0i32.is_missing());
        assert!(!(-1i32).is_vector_end());
    }
}
