use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use vdiforge_verify::HashAlgorithm;

use crate::error::{ManifestError, Result};

/// One record per line pair:
///
/// ```text
/// SHA512 HASH
/// <hex digest>  <filename>
/// ```
///
/// Algorithm tokens outside the supported set never match, so unknown
/// algorithms are skipped rather than rejected.
static RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<method>SHA1|SHA512) HASH\r?\n(?P<hash>[[:xdigit:]]+)\s+(?P<file>\S+)")
        .expect("record pattern is valid")
});

/// Expected digests for a single file, keyed by algorithm.
///
/// Built once per pipeline run from the verified manifest body; immutable
/// afterwards. Absence of an algorithm means "cannot verify under that
/// algorithm", never "verified".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSet {
    entries: BTreeMap<HashAlgorithm, String>,
}

impl DigestSet {
    pub fn get(&self, algorithm: HashAlgorithm) -> Option<&str> {
        self.entries.get(&algorithm).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn algorithms(&self) -> impl Iterator<Item = HashAlgorithm> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HashAlgorithm, &str)> + '_ {
        self.entries.iter().map(|(alg, hex)| (*alg, hex.as_str()))
    }
}

/// Extract the expected digests for `target` from manifest plaintext.
///
/// Filename matching is exact string equality; no path normalization. Hex
/// case is preserved from the source (comparison happens case-insensitively
/// later). Two records that disagree for the same algorithm+filename are a
/// verification error; identical repeats are tolerated.
pub fn parse_digests(manifest: &str, target: &str) -> Result<DigestSet> {
    let mut set = DigestSet::default();

    for record in RECORD.captures_iter(manifest) {
        if &record["file"] != target {
            continue;
        }
        // The pattern only matches supported tokens, so this cannot miss.
        let Ok(algorithm) = record["method"].parse::<HashAlgorithm>() else {
            continue;
        };
        let hash = &record["hash"];

        match set.entries.get(&algorithm) {
            Some(existing) if !existing.eq_ignore_ascii_case(hash) => {
                return Err(ManifestError::ConflictingDigests {
                    algorithm,
                    filename: target.to_string(),
                });
            }
            Some(_) => {}
            None => {
                set.entries.insert(algorithm, hash.to_string());
            }
        }
    }

    tracing::debug!(target: "vdiforge_manifest", file = target, algorithms = set.len(), "parsed digest records");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = "coreos_production_image.bin.bz2";

    fn manifest(records: &[(&str, &str, &str)]) -> String {
        let mut out = String::from("# DIGESTS\n");
        for (method, hash, file) in records {
            out.push_str(&format!("{method} HASH\n{hash}  {file}\n"));
        }
        out
    }

    #[test]
    fn extracts_both_algorithms_for_target() {
        let text = manifest(&[
            ("SHA1", "aaaa1111", IMAGE),
            ("SHA512", "BBBB2222", IMAGE),
        ]);
        let set = parse_digests(&text, IMAGE).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(HashAlgorithm::Sha1), Some("aaaa1111"));
        // Case preserved from source.
        assert_eq!(set.get(HashAlgorithm::Sha512), Some("BBBB2222"));
    }

    #[test]
    fn records_for_other_files_are_discarded() {
        let text = manifest(&[
            ("SHA1", "aaaa1111", "some_other_file.bin.bz2"),
            ("SHA512", "bbbb2222", IMAGE),
        ]);
        let set = parse_digests(&text, IMAGE).unwrap();

        assert_eq!(set.get(HashAlgorithm::Sha1), None);
        assert_eq!(set.get(HashAlgorithm::Sha512), Some("bbbb2222"));
    }

    #[test]
    fn no_records_for_target_yields_empty_set() {
        let text = manifest(&[("SHA1", "aaaa1111", "unrelated.img")]);
        let set = parse_digests(&text, IMAGE).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn filename_match_is_exact_not_prefix() {
        let text = manifest(&[("SHA1", "aaaa1111", "coreos_production_image.bin.bz2.sig")]);
        assert!(parse_digests(&text, IMAGE).unwrap().is_empty());
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let text = format!("SHA512 HASH\r\ncafe0123  {IMAGE}\r\n");
        let set = parse_digests(&text, IMAGE).unwrap();
        assert_eq!(set.get(HashAlgorithm::Sha512), Some("cafe0123"));
    }

    #[test]
    fn unknown_algorithm_tokens_are_skipped() {
        let text = format!("MD5 HASH\ndeadbeef  {IMAGE}\nSHA1 HASH\naaaa1111  {IMAGE}\n");
        let set = parse_digests(&text, IMAGE).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(HashAlgorithm::Sha1), Some("aaaa1111"));
    }

    #[test]
    fn conflicting_duplicate_records_are_an_error() {
        let text = manifest(&[("SHA1", "aaaa1111", IMAGE), ("SHA1", "cccc3333", IMAGE)]);
        assert!(matches!(
            parse_digests(&text, IMAGE),
            Err(ManifestError::ConflictingDigests {
                algorithm: HashAlgorithm::Sha1,
                ..
            })
        ));
    }

    #[test]
    fn identical_duplicate_records_are_tolerated() {
        let text = manifest(&[("SHA1", "aaaa1111", IMAGE), ("SHA1", "AAAA1111", IMAGE)]);
        let set = parse_digests(&text, IMAGE).unwrap();
        assert_eq!(set.get(HashAlgorithm::Sha1), Some("aaaa1111"));
    }
}
