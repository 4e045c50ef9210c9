//! pixhash main binary

use anyhow::Context as _;
use clap::Parser as _;
use pixhash::{FileHash, RunStatus, cl, hash_files, perceptual_hash::PerceptualHash};

/// Report line for JSON output
#[derive(serde::Serialize)]
struct JsonRecord<'a> {
    /// Source image path
    file: &'a std::path::Path,
    /// Image hash
    hash: PerceptualHash,
    /// Hamming distance to the previous input, absent for the first
    distance: Option<u32>,
}

/// Print hashes in the requested format, comparing consecutive pairs
fn print_hashes(hashes: &[FileHash], format: cl::OutputFormat) {
    let mut last: Option<&FileHash> = None;
    for file_hash in hashes {
        let distance = last.map(|prev| prev.hash.distance(&file_hash.hash));
        match format {
            cl::OutputFormat::Full => {
                if let (Some(prev), Some(distance)) = (last, distance) {
                    let diff = prev.hash.to_bits() ^ file_hash.hash.to_bits();
                    println!("                   - 0b{diff:064b} : (distance = {distance})");
                }
                println!(
                    "0x{:x} - 0b{:064b} : {}",
                    file_hash.hash,
                    file_hash.hash,
                    file_hash.path.display()
                );
            }
            cl::OutputFormat::Hex => {
                println!("0x{:x} : {}", file_hash.hash, file_hash.path.display());
            }
            cl::OutputFormat::Binary => {
                println!("0b{:064b} : {}", file_hash.hash, file_hash.path.display());
            }
            cl::OutputFormat::Json => {
                let record = JsonRecord {
                    file: &file_hash.path,
                    hash: file_hash.hash,
                    distance,
                };
                match serde_json::to_string(&record) {
                    Ok(line) => println!("{line}"),
                    Err(err) => log::error!("Failed to serialize {file_hash}: {err}"),
                }
            }
        }
        last = Some(file_hash);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<RunStatus> {
    // Parse CL args
    let cl_args = cl::PixhashArgs::parse();

    // Init logger
    simple_logger::init_with_level(cl_args.verbosity).context("Failed to setup logger")?;

    // Hash and report
    let (hashes, status) = hash_files(cl_args.image_filepaths).await;
    print_hashes(&hashes, cl_args.format);
    Ok(status)
}
