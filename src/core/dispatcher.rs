use super::{
    field::{FieldBuffer, VariantRecord, VariantSite},
    registry::MethodRegistry,
};
use crate::{
    constants::{MONOMORPHIC_DOSAGE, UNDETERMINED_DOSAGE},
    utils::util::Result,
};
use std::{collections::BTreeMap, fmt};

/// Where the dosages of one row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DosageSource {
    Monomorphic,
    Method(&'static str),
    Unresolved,
}

impl fmt::Display for DosageSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DosageSource::Monomorphic => write!(f, "monomorphic"),
            DosageSource::Method(tag) => write!(f, "{tag}"),
            DosageSource::Unresolved => write!(f, "unresolved"),
        }
    }
}

#[derive(Debug)]
pub struct DosageRow<'a> {
    pub site: VariantSite,
    pub dosages: &'a [f32],
    pub source: DosageSource,
}

/// Number of rows produced by each source over a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub records: usize,
    pub by_source: BTreeMap<DosageSource, usize>,
}

impl DispatchSummary {
    fn record(&mut self, source: DosageSource) {
        self.records += 1;
        *self.by_source.entry(source).or_insert(0) += 1;
    }

    pub fn log(&self) {
        log::info!("Processed {} records", self.records);
        for (source, count) in &self.by_source {
            log::info!("  {:<12} {}", source.to_string(), count);
        }
    }
}

/// Per-record dosage computation with fallback over the registered methods.
///
/// Owns the decode buffer and the output row, both reused from record to record. One instance
/// per processing context.
#[derive(Debug)]
pub struct Dispatcher {
    registry: MethodRegistry,
    buffer: FieldBuffer,
    dosages: Vec<f32>,
    summary: DispatchSummary,
}

impl Dispatcher {
    pub fn new(registry: MethodRegistry) -> Self {
        Dispatcher {
            registry,
            buffer: FieldBuffer::new(),
            dosages: Vec::new(),
            summary: DispatchSummary::default(),
        }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn summary(&self) -> &DispatchSummary {
        &self.summary
    }

    pub fn process<R: VariantRecord + ?Sized>(&mut self, record: &R) -> Result<DosageRow<'_>> {
        let site = record.site()?;
        let n_samples = record.sample_count();
        let source = if record.allele_count() <= 1 {
            self.fill(n_samples, MONOMORPHIC_DOSAGE);
            DosageSource::Monomorphic
        } else {
            self.first_success(record, n_samples)
        };
        self.summary.record(source);
        Ok(DosageRow {
            site,
            dosages: &self.dosages,
            source,
        })
    }

    fn first_success<R: VariantRecord + ?Sized>(
        &mut self,
        record: &R,
        n_samples: usize,
    ) -> DosageSource {
        for method in self.registry.methods() {
            match method.compute(record, &mut self.buffer, &mut self.dosages) {
                Ok(()) => return DosageSource::Method(method.tag()),
                Err(e) => log::trace!("{e}, trying next method"),
            }
        }
        self.fill(n_samples, UNDETERMINED_DOSAGE);
        DosageSource::Unresolved
    }

    fn fill(&mut self, n_samples: usize, value: f32) {
        self.dosages.clear();
        self.dosages.resize(n_samples, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        field::{DeclaredType, NumericKind},
        method::DosageMethod,
        test_utils::{gt, MockRecord, MockSchema},
    };
    use crate::utils::util::MISSING_INTEGER;

    fn dispatcher(tags: &[&str]) -> Dispatcher {
        let schema = MockSchema::new(&["s1", "s2"])
            .with_field("PL", DeclaredType::Integer)
            .with_field("GL", DeclaredType::Float);
        Dispatcher::new(MethodRegistry::resolve(&schema, tags).unwrap())
    }

    fn het_genotypes() -> Vec<Vec<i32>> {
        vec![
            vec![gt(0, false), gt(1, false)],
            vec![gt(1, false), gt(1, false)],
        ]
    }

    #[test]
    fn test_monomorphic_record_is_all_zero() {
        let mut dispatcher = dispatcher(&["PL", "GL", "GT"]);
        let record = MockRecord::new(2)
            .monomorphic()
            .with_integers("PL", vec![vec![90, 0, 0], vec![90, 0, 0]]);
        let row = dispatcher.process(&record).unwrap();
        assert_eq!(row.dosages, &[0.0, 0.0]);
        assert_eq!(row.source, DosageSource::Monomorphic);
        assert_eq!(record.decode_calls(), 0);
    }

    #[test]
    fn test_monomorphic_record_with_empty_registry() {
        let registry = MethodRegistry::resolve(&MockSchema::new(&[]), &[] as &[&str]).unwrap();
        let mut dispatcher = Dispatcher::new(registry);
        let record = MockRecord::new(3).monomorphic();
        let row = dispatcher.process(&record).unwrap();
        assert_eq!(row.dosages, &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_first_method_wins() {
        let mut dispatcher = dispatcher(&["PL", "GL", "GT"]);
        let record = MockRecord::new(2)
            .with_integers("PL", vec![vec![0, 0, 0], vec![MISSING_INTEGER]])
            .with_floats("GL", vec![vec![0.0, -9.0, -9.0], vec![0.0, -9.0, -9.0]])
            .with_genotypes(het_genotypes());
        let row = dispatcher.process(&record).unwrap();
        assert_eq!(row.dosages, &[1.0, -1.0]);
        assert_eq!(row.source, DosageSource::Method("PL"));
        assert_eq!(record.decode_calls(), 1);
    }

    #[test]
    fn test_falls_back_to_gl() {
        let mut dispatcher = dispatcher(&["PL", "GL", "GT"]);
        let record = MockRecord::new(2)
            .with_floats("GL", vec![vec![0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0]])
            .with_genotypes(het_genotypes());
        let row = dispatcher.process(&record).unwrap();
        assert_eq!(row.dosages, &[1.0, 1.0]);
        assert_eq!(row.source, DosageSource::Method("GL"));
    }

    #[test]
    fn test_falls_back_to_gt() {
        let mut dispatcher = dispatcher(&["PL", "GL", "GT"]);
        let record = MockRecord::new(2).with_genotypes(het_genotypes());
        let row = dispatcher.process(&record).unwrap();
        assert_eq!(row.dosages, &[1.0, 2.0]);
        assert_eq!(row.source, DosageSource::Method("GT"));
        assert_eq!(record.decode_calls(), 3);
    }

    #[test]
    fn test_nothing_resolves() {
        let mut dispatcher = dispatcher(&["PL", "GL", "GT"]);
        let record = MockRecord::new(2);
        let row = dispatcher.process(&record).unwrap();
        assert_eq!(row.dosages, &[-1.0, -1.0]);
        assert_eq!(row.source, DosageSource::Unresolved);
    }

    #[test]
    fn test_type_mismatch_falls_back() {
        let mut dispatcher = dispatcher(&["PL", "GT"]);
        let record = MockRecord::new(2)
            .with_floats("PL", vec![vec![0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0]])
            .with_genotypes(het_genotypes());
        let row = dispatcher.process(&record).unwrap();
        assert_eq!(row.source, DosageSource::Method("GT"));
    }

    #[test]
    fn test_failed_method_leaves_no_partial_values() {
        let mut dispatcher = dispatcher(&["GL", "GT"]);
        let good = MockRecord::new(2)
            .with_floats("GL", vec![vec![0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0]]);
        assert_eq!(dispatcher.process(&good).unwrap().dosages, &[1.0, 1.0]);

        let bad = MockRecord::new(2);
        assert_eq!(dispatcher.process(&bad).unwrap().dosages, &[-1.0, -1.0]);
    }

    #[test]
    fn test_repeated_dispatch_is_stable() {
        let mut dispatcher = dispatcher(&["PL", "GL", "GT"]);
        let record = MockRecord::new(2)
            .with_integers("PL", vec![vec![0, 10, 20], vec![20, 10, MISSING_INTEGER]]);
        let first = dispatcher.process(&record).unwrap().dosages.to_vec();
        let second = dispatcher.process(&record).unwrap().dosages.to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_narrow_record_after_wide_record() {
        let mut dispatcher = dispatcher(&["PL"]);
        let wide = MockRecord::new(2).with_integers(
            "PL",
            vec![vec![0, 0, 0, 0, 0, 0], vec![0, 0, 0, 0, 0, 0]],
        );
        dispatcher.process(&wide).unwrap();

        // Single value per sample: only the 0/0 slot is filled
        let narrow = MockRecord::new(2).with_integers("PL", vec![vec![0], vec![MISSING_INTEGER]]);
        let row = dispatcher.process(&narrow).unwrap();
        assert_eq!(row.dosages, &[0.0, -1.0]);
    }

    #[test]
    fn test_zero_samples() {
        let mut dispatcher = dispatcher(&["PL", "GL", "GT"]);
        let record = MockRecord::new(0).with_genotypes(vec![]);
        let row = dispatcher.process(&record).unwrap();
        assert!(row.dosages.is_empty());
    }

    #[test]
    fn test_summary_counts_sources() {
        let mut dispatcher = dispatcher(&["PL", "GT"]);
        dispatcher
            .process(&MockRecord::new(1).with_integers("PL", vec![vec![0, 0, 0]]))
            .unwrap();
        dispatcher
            .process(&MockRecord::new(1).with_integers("PL", vec![vec![0, 0, 0]]))
            .unwrap();
        dispatcher.process(&MockRecord::new(1).monomorphic()).unwrap();
        dispatcher.process(&MockRecord::new(1)).unwrap();

        let summary = dispatcher.summary();
        assert_eq!(summary.records, 4);
        assert_eq!(summary.by_source.get(&DosageSource::Method("PL")), Some(&2));
        assert_eq!(summary.by_source.get(&DosageSource::Monomorphic), Some(&1));
        assert_eq!(summary.by_source.get(&DosageSource::Unresolved), Some(&1));
        assert_eq!(summary.by_source.get(&DosageSource::Method("GT")), None);
    }

    #[test]
    fn test_registry_is_exposed() {
        let dispatcher = dispatcher(&["GT", "PL"]);
        assert_eq!(
            dispatcher.registry().methods(),
            &[
                DosageMethod::GenotypeCall,
                DosageMethod::Phred(NumericKind::Integer)
            ]
        );
    }
}
