pub const DEFAULT_TAGS: [&str; 3] = ["PL", "GL", "GT"];
pub const DEFAULT_THREADS: usize = 1;
pub const STDIN_PATH: &str = "-";

// Likelihood fields are read as diploid biallelic: 0/0, 0/1, 1/1
pub const N_DIPLOID_GENOTYPES: usize = 3;
pub const PHRED_SCALE: f64 = -0.1;

pub const UNDETERMINED_DOSAGE: f32 = -1.0;
pub const MONOMORPHIC_DOSAGE: f32 = 0.0;
pub const MISSING_ALT: &str = ".";
