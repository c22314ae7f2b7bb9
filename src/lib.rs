pub mod cli;
pub mod commands;
pub mod error;

pub mod core {
    pub mod dispatcher;
    pub mod field;
    pub mod method;
    pub mod registry;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

pub mod io {
    pub mod table_writer;
    pub mod vcf_reader;
}

pub mod utils {
    pub mod util;
}

pub mod constants;

pub use constants::*;
