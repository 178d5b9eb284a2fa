//! Incremental multi-algorithm hashing for downloaded artifacts.
//!
//! Provides the hashing side of a single-pass download: every chunk read off
//! the wire is fanned out to one accumulator per requested algorithm, so an
//! artifact of any size is digested with O(chunk) memory and without a second
//! read pass.
//!
//! # Example
//!
//! ```
//! use vdiforge_verify::{HashAlgorithm, MultiHasher};
//!
//! let mut hasher = MultiHasher::new([HashAlgorithm::Sha1, HashAlgorithm::Sha512]);
//! hasher.update(b"hello ");
//! hasher.update(b"world");
//! let digests = hasher.finalize();
//! assert_eq!(digests[&HashAlgorithm::Sha1].len(), 40);
//! ```

pub use self::error::{Result, VerifyError};
pub use self::hasher::{DigestHasher, Hasher, Sha1Hasher, Sha512Hasher};
pub use self::multi::{DigestMap, MultiHasher, hex_digest_eq};

mod error;
mod hasher;
mod multi;

use std::fmt;
use std::str::FromStr;

/// Digest algorithms recognized in release manifests.
///
/// A closed set: adding a variant means wiring up a new accumulator in
/// [`HashAlgorithm::hasher`] and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha512,
}

impl HashAlgorithm {
    /// All supported algorithms.
    pub const ALL: &[HashAlgorithm] = &[HashAlgorithm::Sha1, HashAlgorithm::Sha512];

    /// Digest length in bytes.
    pub fn digest_length(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Manifest token for this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Fresh accumulator for this algorithm.
    pub fn hasher(&self) -> Box<dyn Hasher> {
        match self {
            HashAlgorithm::Sha1 => Box::new(Sha1Hasher::new()),
            HashAlgorithm::Sha512 => Box::new(Sha512Hasher::new()),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SHA1" => Ok(HashAlgorithm::Sha1),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            other => Err(VerifyError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_round_trips_through_str() {
        for alg in HashAlgorithm::ALL {
            assert_eq!(alg.as_str().parse::<HashAlgorithm>().unwrap(), *alg);
        }
    }

    #[test]
    fn algorithm_parse_is_case_insensitive() {
        assert_eq!("sha512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        assert!(matches!(
            "MD5".parse::<HashAlgorithm>(),
            Err(VerifyError::UnsupportedAlgorithm(_))
        ));
    }
}
