use crate::constants::*;
use anyhow::{anyhow, Result};
use chrono::Datelike;
use clap::{ArgAction, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

/// Full version string including the crate version and git description.
///
/// # Examples
/// * `0.1.0-1ba958a-dirty` - while on a dirty branch
/// * `0.1.0-1ba958a` - with a fresh commit
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    let git_describe = env!("VERGEN_GIT_DESCRIBE");
    if git_describe.is_empty() {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        format!("{}-{}", env!("CARGO_PKG_VERSION"), git_describe)
    }
});

#[derive(Parser, Debug)]
#[command(name="gtdosage",
          version=&**FULL_VERSION,
          about="Per-sample genotype dosages from PL, GL or GT",
          long_about = None,
          after_help = format!("Copyright (C) 2004-{}     This program comes with ABSOLUTELY NO WARRANTY.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute dosages for every record and sample
    Compute(DosageArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Compute(_) => "compute",
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DosageArgs {
    /// Input VCF, VCF.gz or BCF, `-` for standard input [default: standard input]
    #[arg(value_name = "VCF", value_parser = check_input_exists)]
    pub input: Option<PathBuf>,

    /// FORMAT tags to compute dosages from, tried in the given order
    #[arg(
        short = 't',
        long = "tags",
        value_name = "TAG",
        value_delimiter = ',',
        default_values_t = DEFAULT_TAGS.map(String::from)
    )]
    pub tags: Vec<String>,

    /// Write output to a file, gzip compressed for a `.gz` suffix [default: standard output]
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        value_parser = check_prefix_path
    )]
    pub output: Option<String>,

    /// Number of decompression threads for the input
    #[arg(
        short = '@',
        value_name = "THREADS",
        default_value_t = DEFAULT_THREADS,
        value_parser = threads_in_range
    )]
    pub num_threads: usize,

    /// Print only the header line and exit
    #[arg(long = "print-header", help_heading = "Advanced")]
    pub print_header: bool,
}

/// Initializes the verbosity level for logging based on the count of `-v` flags.
pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse::<usize>()
        .map_err(|_| anyhow!("`{}` is not a valid thread number", s))?;
    if thread == 0 {
        return Err(anyhow!("Number of threads must be >= 1"));
    }
    Ok(thread)
}

/// Accepts `-` for standard input, otherwise the path must exist.
fn check_input_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if s != STDIN_PATH && !path.exists() {
        return Err(anyhow!("File does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(anyhow!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}
