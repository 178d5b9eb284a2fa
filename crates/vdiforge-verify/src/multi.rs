use std::collections::BTreeMap;

use crate::{HashAlgorithm, Hasher};

/// Hex digests keyed by algorithm, as produced by [`MultiHasher::finalize`].
pub type DigestMap = BTreeMap<HashAlgorithm, String>;

/// Fan-out over one accumulator per algorithm.
///
/// A chunk passed to [`update`](MultiHasher::update) is fed to every
/// accumulator before the call returns, which is the per-chunk barrier the
/// streaming download relies on: the caller may drop or reuse the buffer
/// immediately after.
pub struct MultiHasher {
    entries: Vec<(HashAlgorithm, Box<dyn Hasher>)>,
}

impl MultiHasher {
    pub fn new(algorithms: impl IntoIterator<Item = HashAlgorithm>) -> Self {
        Self {
            entries: algorithms
                .into_iter()
                .map(|alg| (alg, alg.hasher()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        for (_, hasher) in &mut self.entries {
            hasher.update(chunk);
        }
    }

    /// Finish all accumulators, yielding lower-hex digests per algorithm.
    pub fn finalize(self) -> DigestMap {
        self.entries
            .into_iter()
            .map(|(alg, hasher)| (alg, hex::encode(hasher.finalize())))
            .collect()
    }
}

/// Hex digest equality, case-insensitive.
///
/// Manifest hex case is not guaranteed; computed digests are lower-case.
pub fn hex_digest_eq(expected: &str, actual: &str) -> bool {
    expected.eq_ignore_ascii_case(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sha1Hasher, Sha512Hasher};

    #[test]
    fn fan_out_matches_single_algorithm_hashing() {
        let data = b"the same bytes through every accumulator";
        let mut multi = MultiHasher::new([HashAlgorithm::Sha1, HashAlgorithm::Sha512]);
        multi.update(data);
        let digests = multi.finalize();

        assert_eq!(digests[&HashAlgorithm::Sha1], hex::encode(Sha1Hasher::digest(data)));
        assert_eq!(digests[&HashAlgorithm::Sha512], hex::encode(Sha512Hasher::digest(data)));
    }

    #[test]
    fn digests_are_chunk_size_independent() {
        let data: Vec<u8> = (0u32..4096).map(|i| (i % 251) as u8).collect();

        let mut whole = MultiHasher::new([HashAlgorithm::Sha1, HashAlgorithm::Sha512]);
        whole.update(&data);
        let whole = whole.finalize();

        for chunk_size in [1, 7, 64, 1000, 4096] {
            let mut chunked = MultiHasher::new([HashAlgorithm::Sha1, HashAlgorithm::Sha512]);
            for chunk in data.chunks(chunk_size) {
                chunked.update(chunk);
            }
            assert_eq!(chunked.finalize(), whole, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn empty_input_still_yields_digests() {
        let digests = MultiHasher::new([HashAlgorithm::Sha1]).finalize();
        // SHA1 of the empty string.
        assert_eq!(digests[&HashAlgorithm::Sha1], "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn hex_comparison_ignores_case() {
        assert!(hex_digest_eq("ABC123", "abc123"));
        assert!(!hex_digest_eq("abc123", "abc124"));
    }
}
