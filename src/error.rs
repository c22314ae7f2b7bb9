use std::{path::PathBuf, str::Utf8Error};
use thiserror::Error;

pub type DosageResult<T> = std::result::Result<T, DosageError>;

#[derive(Debug, Error)]
pub enum DosageError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Htslib(#[from] rust_htslib::errors::Error),
    #[error(transparent)]
    Utf8(#[from] Utf8Error),
    #[error("No handler for tag \"{tag}\"")]
    UnknownTag { tag: String },
    #[error("Expected numeric type of FORMAT/{tag}, found {found}")]
    UnsupportedFieldType { tag: String, found: String },
    #[error("Record at {context} has no contig in the header")]
    MissingContig { context: String },
    #[error("Failed to open output {}: {source}", path.display())]
    OutputOpen {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl DosageError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[macro_export]
macro_rules! dosage_error {
    ($($arg:tt)*) => {
        $crate::error::DosageError::message(format!($($arg)*))
    };
}
