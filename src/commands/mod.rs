pub mod dosage;

pub use dosage::dosage;
