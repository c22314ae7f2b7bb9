use super::field::{FieldBuffer, FieldError, FieldValue, NumericKind, VariantRecord};
use crate::{
    constants::{N_DIPLOID_GENOTYPES, PHRED_SCALE, UNDETERMINED_DOSAGE},
    utils::util::{MISSING_GENOTYPE, MISSING_INTEGER, VECTOR_END_INTEGER},
};
use std::fmt;

/// One way of turning a FORMAT field into per-sample dosages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DosageMethod {
    /// FORMAT/PL, phred-scaled genotype likelihoods.
    Phred(NumericKind),
    /// FORMAT/GL, natural-log genotype likelihoods.
    LogLikelihood(NumericKind),
    /// FORMAT/GT, called alleles.
    GenotypeCall,
}

impl DosageMethod {
    pub fn tag(&self) -> &'static str {
        match self {
            DosageMethod::Phred(_) => "PL",
            DosageMethod::LogLikelihood(_) => "GL",
            DosageMethod::GenotypeCall => "GT",
        }
    }

    /// Fills `dosages` with one value per sample of `record`.
    ///
    /// Fails only when the source field cannot be read from this record at all; samples whose
    /// values are all missing get [`UNDETERMINED_DOSAGE`] instead. On failure the content of
    /// `dosages` is unspecified.
    pub fn compute<R: VariantRecord + ?Sized>(
        &self,
        record: &R,
        buffer: &mut FieldBuffer,
        dosages: &mut Vec<f32>,
    ) -> Result<(), FieldError> {
        dosages.clear();
        let n_samples = record.sample_count();
        match *self {
            DosageMethod::Phred(kind) => {
                let width = record.format_values(self.tag().as_bytes(), kind, buffer)?;
                let phred = |value: f64| (PHRED_SCALE * value).exp();
                match kind {
                    NumericKind::Integer => likelihood_dosages::<i32>(
                        buffer.values(),
                        width,
                        n_samples,
                        phred,
                        dosages,
                    ),
                    NumericKind::Float => likelihood_dosages::<f32>(
                        buffer.values(),
                        width,
                        n_samples,
                        phred,
                        dosages,
                    ),
                }
            }
            DosageMethod::LogLikelihood(kind) => {
                let width = record.format_values(self.tag().as_bytes(), kind, buffer)?;
                match kind {
                    NumericKind::Integer => likelihood_dosages::<i32>(
                        buffer.values(),
                        width,
                        n_samples,
                        f64::exp,
                        dosages,
                    ),
                    NumericKind::Float => likelihood_dosages::<f32>(
                        buffer.values(),
                        width,
                        n_samples,
                        f64::exp,
                        dosages,
                    ),
                }
            }
            DosageMethod::GenotypeCall => {
                let width = record.genotypes(buffer)?;
                dosages.extend(
                    sample_rows(buffer.values::<i32>(), width, n_samples).map(genotype_dosage),
                );
            }
        }
        Ok(())
    }
}

impl fmt::Display for DosageMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DosageMethod::Phred(kind) | DosageMethod::LogLikelihood(kind) => {
                write!(f, "{} ({:?})", self.tag(), kind)
            }
            DosageMethod::GenotypeCall => write!(f, "{}", self.tag()),
        }
    }
}

/// Splits a fixed-width buffer into one row per sample. Rows missing from a short buffer come
/// back empty.
fn sample_rows<T>(values: &[T], width: usize, n_samples: usize) -> impl Iterator<Item = &[T]> {
    (0..n_samples).map(move |sample| {
        values
            .get(sample * width..(sample + 1) * width)
            .unwrap_or(&[])
    })
}

fn likelihood_dosages<T: FieldValue>(
    values: &[T],
    width: usize,
    n_samples: usize,
    transform: impl Fn(f64) -> f64,
    dosages: &mut Vec<f32>,
) {
    dosages.extend(
        sample_rows(values, width, n_samples).map(|row| likelihood_dosage(row, &transform)),
    );
}

/// Expected alt allele count from the 0/0, 0/1 and 1/1 likelihoods of one sample.
///
/// Only the first three values are used, so multiallelic or polyploid rows are read as if they
/// were biallelic diploid. Values after the first missing or vector-end sentinel count as zero.
pub fn likelihood_dosage<T: FieldValue>(row: &[T], transform: impl Fn(f64) -> f64) -> f32 {
    let mut likelihoods = [0f32; N_DIPLOID_GENOTYPES];
    for (likelihood, &value) in likelihoods.iter_mut().zip(row) {
        if value.is_missing() || value.is_vector_end() {
            break;
        }
        *likelihood = transform(value.as_()) as f32;
    }
    let sum: f32 = likelihoods.iter().sum();
    if sum == 0.0 {
        UNDETERMINED_DOSAGE
    } else {
        (likelihoods[1] + 2.0 * likelihoods[2]) / sum
    }
}

fn is_genotype_stop(encoded: i32) -> bool {
    encoded == MISSING_INTEGER || encoded == VECTOR_END_INTEGER || encoded == MISSING_GENOTYPE
}

pub fn genotype_allele_index(encoded: i32) -> i32 {
    (encoded >> 1) - 1
}

/// Number of non-reference alleles called for one sample. Every alt allele counts as one,
/// whichever alt it is.
pub fn genotype_dosage(row: &[i32]) -> f32 {
    let (n_called, n_alt) = row
        .iter()
        .copied()
        .take_while(|&encoded| !is_genotype_stop(encoded))
        .fold((0usize, 0usize), |(n_called, n_alt), encoded| {
            let is_alt = genotype_allele_index(encoded) != 0;
            (n_called + 1, n_alt + usize::from(is_alt))
        });
    if n_called == 0 {
        UNDETERMINED_DOSAGE
    } else {
        n_alt as f32
    }
}
