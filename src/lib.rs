//! Internal API exposed for `pixhash` binary

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    process::{ExitCode, Termination},
    sync::Arc,
};

use anyhow::Context as _;
use itertools::Itertools as _;

use crate::perceptual_hash::{Hasher, PerceptualHash};

pub mod cl;
mod dct;
pub mod grid;
pub mod perceptual_hash;
mod zigzag;

/// Hash of a single input file
pub struct FileHash {
    /// Source image path
    pub path: PathBuf,
    /// Computed hash
    pub hash: PerceptualHash,
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.hash, self.path.display())
    }
}

/// Status of a successful batch hash operation
pub enum RunStatus {
    /// All inputs were hashed
    Complete,
    /// Some inputs could not be hashed
    Partial,
}

impl Termination for RunStatus {
    fn report(self) -> ExitCode {
        match self {
            RunStatus::Complete => ExitCode::SUCCESS,
            RunStatus::Partial => ExitCode::FAILURE,
        }
    }
}

/// Read, decode and hash a single image file
pub fn hash_file(hasher: &Hasher, path: &Path) -> anyhow::Result<PerceptualHash> {
    let buf = fs::read(path).with_context(|| format!("Failed to read {path:?}"))?;
    let img = image::load_from_memory(&buf)
        .with_context(|| format!("Failed to decode image {path:?}"))?;
    Ok(hasher.hash_image(&img)?)
}

/// Hash image files concurrently, keeping results in input order.
/// Files that cannot be hashed are logged and skipped.
pub async fn hash_files(paths: Vec<PathBuf>) -> (Vec<FileHash>, RunStatus) {
    let hasher = Arc::new(Hasher::new());
    let tasks = paths.into_iter().map(|path| {
        let hasher = Arc::clone(&hasher);
        tokio::task::spawn_blocking(move || {
            let res = hash_file(&hasher, &path);
            (path, res)
        })
    });

    let mut hashes = Vec::new();
    let mut failures = false;
    for task in futures::future::join_all(tasks).await {
        match task {
            Ok((path, Ok(hash))) => hashes.push(FileHash { path, hash }),
            Ok((path, Err(err))) => {
                log::error!("Failed to hash {path:?}: {err:#}");
                failures = true;
            }
            Err(err) => {
                log::error!("Hashing task failed: {err}");
                failures = true;
            }
        }
    }

    log::debug!(
        "Hashed {} images:\n{}",
        hashes.len(),
        hashes.iter().join("\n")
    );

    let status = if failures {
        RunStatus::Partial
    } else {
        RunStatus::Complete
    };
    (hashes, status)
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Luma};

    use super::*;

    fn test_image() -> ImageBuffer<Luma<u8>, Vec<u8>> {
        ImageBuffer::from_fn(64, 64, |x, y| {
            Luma([u8::try_from((x * 3 + y * 2) % 256).unwrap()])
        })
    }

    #[test]
    fn same_pixels_in_different_files_hash_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path1 = dir.path().join("a.png");
        let path2 = dir.path().join("b.png");
        let img = test_image();
        img.save(&path1).unwrap();
        img.save(&path2).unwrap();

        let hasher = Hasher::new();
        let hash1 = hash_file(&hasher, &path1).unwrap();
        let hash2 = hash_file(&hasher, &path2).unwrap();
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.distance(&hash2), 0);
    }

    #[tokio::test]
    async fn batch_keeps_input_order_and_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path1 = dir.path().join("a.png");
        let path2 = dir.path().join("b.png");
        test_image().save(&path1).unwrap();
        image::DynamicImage::from(test_image())
            .rotate90()
            .to_luma8()
            .save(&path2)
            .unwrap();
        let missing = dir.path().join("missing.png");

        let (hashes, status) = hash_files(vec![path1.clone(), missing, path2.clone()]).await;
        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes[0].path, path1);
        assert_eq!(hashes[1].path, path2);
        assert!(matches!(status, RunStatus::Partial));
    }

    #[tokio::test]
    async fn batch_of_valid_files_completes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        test_image().save(&path).unwrap();

        let (hashes, status) = hash_files(vec![path]).await;
        assert_eq!(hashes.len(), 1);
        assert!(matches!(status, RunStatus::Complete));
    }
}
