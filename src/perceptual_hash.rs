//! Perceptual hash

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{dct::Basis, grid::LumaGrid, zigzag};

/// Grid side and DCT transform length of the default configuration
pub const GRID_SIZE: usize = 32;
/// Retained low-frequency DCT bin count of the default configuration
pub const LOW_FREQ_BINS: usize = 11;
/// Hash width in bits, fixed regardless of host word size
pub const HASH_BITS: usize = 64;

// The default configuration must yield enough zigzag coefficients for the
// hash plus the dropped DC term
const _: () = assert!(LOW_FREQ_BINS * (LOW_FREQ_BINS + 1) / 2 > HASH_BITS);

/// Hamming distance up to which two hashes are considered the same image
const MAX_HAMMING_DELTA: u32 = 10;

/// Hashing pipeline error
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// Configuration retains too few coefficients for a full-width hash
    #[error("{bins} low-frequency bins yield {available} coefficients, hash needs {required}")]
    NotEnoughCoefficients {
        /// Configured low-frequency bin count
        bins: usize,
        /// Zigzag coefficient count the configuration yields
        available: usize,
        /// Minimum coefficient count for a full-width hash
        required: usize,
    },
    /// Configuration retains more bins than the transform outputs
    #[error("Cannot retain {bins} bins from a length {len} transform")]
    BinsExceedLength {
        /// Configured low-frequency bin count
        bins: usize,
        /// Configured transform length
        len: usize,
    },
    /// Grid side does not match the configured transform length
    #[error("Grid is {actual}x{actual}, hasher expects {expected}x{expected}")]
    GridSize {
        /// Side of the rejected grid
        actual: usize,
        /// Side the hasher was configured for
        expected: usize,
    },
    /// Raw pixel buffer does not fill the grid
    #[error("{len} pixels do not fill a {size}x{size} grid")]
    PixelCount {
        /// Length of the rejected pixel buffer
        len: usize,
        /// Requested grid side
        size: usize,
    },
}

/// Hasher configuration
#[derive(Clone, Copy, Debug)]
pub struct HashConfig {
    /// Grid side and DCT transform length
    pub grid_size: usize,
    /// Retained low-frequency DCT bin count
    pub low_freq_bins: usize,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            low_freq_bins: LOW_FREQ_BINS,
        }
    }
}

/// Image perceptual hasher, owning the derived DCT basis.
/// Immutable once built and safe to share across threads.
pub struct Hasher {
    /// Truncated DCT basis
    basis: Basis,
}

impl Hasher {
    /// Create a hasher with the default 32x32 grid and 11 retained bins
    #[must_use]
    pub fn new() -> Self {
        Self {
            basis: Basis::new(GRID_SIZE, LOW_FREQ_BINS),
        }
    }

    /// Create a hasher with a custom configuration.
    /// Configurations that cannot produce a full-width hash are rejected
    /// here, never per call.
    pub fn with_config(config: HashConfig) -> Result<Self, HashError> {
        if config.low_freq_bins > config.grid_size {
            return Err(HashError::BinsExceedLength {
                bins: config.low_freq_bins,
                len: config.grid_size,
            });
        }
        let available = config.low_freq_bins * (config.low_freq_bins + 1) / 2;
        if available <= HASH_BITS {
            return Err(HashError::NotEnoughCoefficients {
                bins: config.low_freq_bins,
                available,
                required: HASH_BITS + 1,
            });
        }
        Ok(Self {
            basis: Basis::new(config.grid_size, config.low_freq_bins),
        })
    }

    /// Grid side this hasher accepts
    #[must_use]
    pub fn grid_size(&self) -> usize {
        self.basis.transform_len()
    }

    /// Compute the hash of an intensity grid
    pub fn hash(&self, grid: &LumaGrid) -> Result<PerceptualHash, HashError> {
        if grid.size() != self.grid_size() {
            return Err(HashError::GridSize {
                actual: grid.size(),
                expected: self.grid_size(),
            });
        }
        let coeffs = self.basis.transform(grid);
        let sequence = zigzag::scan(&coeffs);
        Ok(PerceptualHash(threshold_pack(&sequence)))
    }

    /// Grayscale-reduce and resize a decoded image to the hasher grid, then
    /// hash it
    pub fn hash_image(&self, img: &image::DynamicImage) -> Result<PerceptualHash, HashError> {
        self.hash(&LumaGrid::from_image(img, self.grid_size()))
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Binarize the coefficient sequence against its reference mean and pack the
/// bits MSB first.
/// The sequence's leading DC term is dropped; the mean covers hash positions
/// 1..=63 only, while position 0 is still thresholded against it. That
/// asymmetry is kept to stay bit compatible with existing hash corpora.
fn threshold_pack(sequence: &[f64]) -> u64 {
    debug_assert!(sequence.len() > HASH_BITS);
    #[expect(clippy::cast_precision_loss)]
    let mean = sequence.iter().skip(2).take(HASH_BITS - 1).sum::<f64>() / (HASH_BITS - 1) as f64;
    let mut bits = 0;
    for (i, coeff) in sequence.iter().skip(1).take(HASH_BITS).enumerate() {
        if *coeff > mean {
            bits |= 1 << (HASH_BITS - 1 - i);
        }
    }
    bits
}

/// Image perceptual hash: a 64-bit frequency-domain fingerprint where
/// visually similar images give a small Hamming distance
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PerceptualHash(u64);

impl PerceptualHash {
    /// Hamming distance to another hash, in `0..=64`
    #[must_use]
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Return true if both hashes seem to refer to a similar image
    #[must_use]
    pub fn is_similar(&self, other: &Self) -> bool {
        self.distance(other) <= MAX_HAMMING_DELTA
    }

    /// Raw hash bits, most significant bit first
    #[must_use]
    pub fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuild a hash from raw bits
    #[must_use]
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Binary for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

impl Serialize for PerceptualHash {
    /// Serialize as a hex string, a 64-bit value does not survive a JSON
    /// number round trip
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&format_args!("{self:#x}"))
    }
}
