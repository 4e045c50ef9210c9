//! Command line interface

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for `pixhash` binary
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct PixhashArgs {
    /// Image files to hash.
    /// With several files, each hash is also compared to the previous one.
    #[clap(required = true)]
    pub image_filepaths: Vec<PathBuf>,
    /// Output format
    #[clap(short, long, default_value_t = OutputFormat::Full)]
    pub format: OutputFormat,
    /// Level of logging output
    #[clap(short, long, default_value_t = log::Level::Info)]
    pub verbosity: log::Level,
}

/// Hash output format
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Hexadecimal and binary hashes plus consecutive pair distances
    Full,
    /// One hexadecimal hash and path per line
    Hex,
    /// One binary hash and path per line
    Binary,
    /// One JSON object per line
    Json,
}
