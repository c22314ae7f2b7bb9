use crate::error::DosageResult;
use log;
use std::{fmt::Display, sync::Once};

pub type Result<T> = DosageResult<T>;

pub const MISSING_INTEGER: i32 = i32::MIN;
pub const VECTOR_END_INTEGER: i32 = i32::MIN + 1;
pub const MISSING_FLOAT: f32 = f32::from_bits(0x7F80_0001);
pub const VECTOR_END_FLOAT: f32 = f32::from_bits(0x7F80_0002);
/// Encoded genotype allele for an unphased `.` call.
pub const MISSING_GENOTYPE: i32 = 0;

#[allow(unused)]
static INIT_LOG: Once = Once::new();

#[allow(unused)]
pub fn init_logger() {
    INIT_LOG.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Trace)
            .is_test(true)
            .init();
    });
}

pub fn handle_error_and_exit(err: impl Display) -> ! {
    log::error!("{err}");
    std::process::exit(1);
}

pub fn format_dosage(value: f32) -> String {
    format!("{value:.1}")
}

pub fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dosage_uses_one_decimal() {
        assert_eq!(format_dosage(0.0), "0.0");
        assert_eq!(format_dosage(1.0), "1.0");
        assert_eq!(format_dosage(2.0), "2.0");
        assert_eq!(format_dosage(-1.0), "-1.0");
        assert_eq!(format_dosage(0.001), "0.0");
        assert_eq!(format_dosage(1.96), "2.0");
    }

    #[test]
    fn test_float_sentinels_are_distinct_nans() {
        assert!(MISSING_FLOAT.is_nan());
        assert!(VECTOR_END_FLOAT.is_nan());
        assert_ne!(MISSING_FLOAT.to_bits(), VECTOR_END_FLOAT.to_bits());
        assert_ne!(MISSING_FLOAT.to_bits(), f32::NAN.to_bits());
    }

    #[test]
    fn test_lossy_text_replaces_invalid_utf8() {
        assert_eq!(lossy_text(b"chr1"), "chr1");
        assert_eq!(lossy_text(&[b'A', 0xff]), "A\u{fffd}");
    }
}
