use super::{
    field::{DeclaredType, NumericKind, Schema},
    method::DosageMethod,
};
use crate::{error::DosageError, utils::util::Result};

/// Ordered list of dosage methods to try on every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRegistry {
    methods: Vec<DosageMethod>,
}

impl MethodRegistry {
    /// Resolves the requested tags against the FORMAT declarations of `schema`, keeping the
    /// requested order.
    ///
    /// PL and GL are dropped when the header does not declare them, and rejected when it
    /// declares them as anything but Integer or Float. GT is always kept since records carry
    /// genotypes structurally. Any other tag is an error.
    pub fn resolve<S, T>(schema: &S, tags: &[T]) -> Result<Self>
    where
        S: Schema + ?Sized,
        T: AsRef<str>,
    {
        let mut methods = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.as_ref();
            let method = match tag {
                "PL" => numeric_kind(schema, tag)?.map(DosageMethod::Phred),
                "GL" => numeric_kind(schema, tag)?.map(DosageMethod::LogLikelihood),
                "GT" => Some(DosageMethod::GenotypeCall),
                _ => {
                    return Err(DosageError::UnknownTag {
                        tag: tag.to_string(),
                    })
                }
            };
            match method {
                Some(method) => {
                    log::debug!("Registered dosage method {}", method);
                    methods.push(method);
                }
                None => log::debug!("FORMAT/{} is not declared in the header, skipping", tag),
            }
        }
        Ok(MethodRegistry { methods })
    }

    pub fn methods(&self) -> &[DosageMethod] {
        &self.methods
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.methods.iter().map(DosageMethod::tag).collect()
    }
}

fn numeric_kind<S: Schema + ?Sized>(schema: &S, tag: &str) -> Result<Option<NumericKind>> {
    match schema.field_type(tag.as_bytes()) {
        DeclaredType::Integer => Ok(Some(NumericKind::Integer)),
        DeclaredType::Float => Ok(Some(NumericKind::Float)),
        DeclaredType::NotDeclared => Ok(None),
        DeclaredType::Other(found) => Err(DosageError::UnsupportedFieldType {
            tag: tag.to_string(),
            found,
        }),
    }
}
