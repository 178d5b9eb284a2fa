//! The trust-verification pipeline.
//!
//! Linear, non-retrying progression:
//!
//! ```text
//! Init -> ManifestFetched -> SignatureChecked -> DigestsExtracted
//!      -> ArtifactHashed -> Compared -> Trusted | Untrusted
//! ```
//!
//! Each step either moves forward or fails the whole run with an error
//! naming the failing step. Nothing downstream (decompression, conversion)
//! may run unless [`Pipeline::run`] returns `Ok`.

use std::fmt;
use std::path::PathBuf;

use vdiforge_fetch::{FetchError, Fetcher, HttpClient, ProgressFn};
use vdiforge_manifest::{DigestSet, Keyring, ManifestError, parse_digests};
use vdiforge_verify::{DigestMap, HashAlgorithm, hex_digest_eq};

/// Everything one pipeline run needs, fixed at construction. No ambient
/// globals: tests supply their own keyring, key id and URLs.
pub struct PipelineConfig {
    pub manifest_url: String,
    pub artifact_url: String,
    /// Exact filename the manifest must list digests for.
    pub artifact_name: String,
    /// Where the verified download lands.
    pub artifact_path: PathBuf,
    pub keyring: Keyring,
    pub trusted_key_id: u64,
}

/// Pipeline step identities, carried by every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FetchManifest,
    VerifySignature,
    ExtractDigests,
    FetchArtifact,
    CompareDigests,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::FetchManifest => "fetch manifest",
            Step::VerifySignature => "verify signature",
            Step::ExtractDigests => "extract digests",
            Step::FetchArtifact => "fetch artifact",
            Step::CompareDigests => "compare digests",
        };
        f.write_str(name)
    }
}

/// Fatal pipeline outcomes. Every variant blocks trust; there is no partial
/// success and no retry.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("endpoint unreachable: {url}: {source}")]
    NetworkUnavailable {
        url: String,
        step: Step,
        #[source]
        source: FetchError,
    },

    #[error("manifest malformed: {0}")]
    ManifestMalformed(#[source] ManifestError),

    #[error("manifest signature invalid: {0}")]
    SignatureInvalid(#[source] ManifestError),

    #[error("manifest signed by untrusted key {signer:016X} (trusted key is {trusted:016X})")]
    KeyUntrusted { signer: u64, trusted: u64 },

    #[error("manifest lists no digest for {filename}")]
    DigestMissing { filename: String },

    #[error("{algorithm} digest mismatch for {filename}: manifest has {expected}, computed {computed}")]
    DigestMismatch {
        algorithm: HashAlgorithm,
        filename: String,
        expected: String,
        computed: String,
    },
}

impl PipelineError {
    /// The step this failure terminated in.
    pub fn step(&self) -> Step {
        match self {
            PipelineError::NetworkUnavailable { step, .. } => *step,
            PipelineError::ManifestMalformed(_) | PipelineError::SignatureInvalid(_) => {
                Step::VerifySignature
            }
            PipelineError::KeyUntrusted { .. } => Step::VerifySignature,
            PipelineError::DigestMissing { .. } => Step::ExtractDigests,
            PipelineError::DigestMismatch { .. } => Step::CompareDigests,
        }
    }
}

/// One per-algorithm comparison that was both expected and computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestCheck {
    pub algorithm: HashAlgorithm,
    pub expected: String,
    pub computed: String,
}

/// Terminal record of a trusted run: signature facts plus every digest
/// comparison that was performed. Produced once, only when all checks pass.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub signer_key_id: u64,
    pub bytes_downloaded: u64,
    pub checks: Vec<DigestCheck>,
}

pub struct Pipeline<C: HttpClient> {
    fetcher: Fetcher<C>,
    config: PipelineConfig,
}

impl<C: HttpClient> Pipeline<C> {
    pub fn new(client: C, config: PipelineConfig) -> Self {
        Self {
            fetcher: Fetcher::new(client),
            config,
        }
    }

    /// Drive the pipeline to its terminal state.
    ///
    /// Fetches stay sequential: the artifact is not touched until the
    /// manifest signature and digest records have been accepted, so an
    /// untrusted manifest costs no artifact download.
    pub async fn run(
        &self,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<VerificationReport, PipelineError> {
        let manifest_text = self.fetch_manifest().await?;
        let manifest = self.verify_signature(&manifest_text)?;
        tracing::info!(
            signer = format_args!("{:016X}", manifest.signer_key_id),
            "manifest signature valid and signer trusted"
        );

        let expected = self.extract_digests(&manifest.body)?;
        tracing::info!(
            file = %self.config.artifact_name,
            algorithms = expected.len(),
            "expected digests extracted"
        );

        let (computed, bytes_downloaded) = self.fetch_artifact(&expected, on_progress).await?;
        let checks = self.compare(&expected, &computed)?;
        for check in &checks {
            tracing::info!(algorithm = %check.algorithm, "digest matches manifest");
        }

        Ok(VerificationReport {
            signer_key_id: manifest.signer_key_id,
            bytes_downloaded,
            checks,
        })
    }

    async fn fetch_manifest(&self) -> Result<String, PipelineError> {
        // Reachability preflight on the artifact before any download work.
        self.fetcher
            .head(&self.config.artifact_url)
            .await
            .map_err(|source| PipelineError::NetworkUnavailable {
                url: self.config.artifact_url.clone(),
                step: Step::FetchManifest,
                source,
            })?;

        self.fetcher
            .fetch_text(&self.config.manifest_url)
            .await
            .map_err(|source| PipelineError::NetworkUnavailable {
                url: self.config.manifest_url.clone(),
                step: Step::FetchManifest,
                source,
            })
    }

    fn verify_signature(
        &self,
        manifest_text: &str,
    ) -> Result<vdiforge_manifest::VerifiedManifest, PipelineError> {
        self.config
            .keyring
            .verify_clearsigned(manifest_text, self.config.trusted_key_id)
            .map_err(|err| match err {
                ManifestError::UntrustedKey { signer, trusted } => {
                    PipelineError::KeyUntrusted { signer, trusted }
                }
                ManifestError::Malformed(_) => PipelineError::ManifestMalformed(err),
                other => PipelineError::SignatureInvalid(other),
            })
    }

    fn extract_digests(&self, body: &str) -> Result<DigestSet, PipelineError> {
        let set = parse_digests(body, &self.config.artifact_name)
            .map_err(PipelineError::ManifestMalformed)?;
        // An absent expected digest is "cannot verify", never "verified":
        // with nothing to compare against the artifact must not be trusted.
        if set.is_empty() {
            return Err(PipelineError::DigestMissing {
                filename: self.config.artifact_name.clone(),
            });
        }
        Ok(set)
    }

    async fn fetch_artifact(
        &self,
        expected: &DigestSet,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<(DigestMap, u64), PipelineError> {
        let algorithms: Vec<HashAlgorithm> = expected.algorithms().collect();
        let report = self
            .fetcher
            .download(
                &self.config.artifact_url,
                &self.config.artifact_path,
                &algorithms,
                on_progress,
            )
            .await
            .map_err(|source| PipelineError::NetworkUnavailable {
                url: self.config.artifact_url.clone(),
                step: Step::FetchArtifact,
                source,
            })?;
        Ok((report.digests, report.bytes_downloaded))
    }

    /// Trusted only if every algorithm both expected and computed matches;
    /// an expected digest that was never computed is a gap, not a pass.
    fn compare(
        &self,
        expected: &DigestSet,
        computed: &DigestMap,
    ) -> Result<Vec<DigestCheck>, PipelineError> {
        let mut checks = Vec::with_capacity(expected.len());
        for (algorithm, expected_hex) in expected.iter() {
            let computed_hex =
                computed
                    .get(&algorithm)
                    .ok_or_else(|| PipelineError::DigestMissing {
                        filename: self.config.artifact_name.clone(),
                    })?;
            if !hex_digest_eq(expected_hex, computed_hex) {
                return Err(PipelineError::DigestMismatch {
                    algorithm,
                    filename: self.config.artifact_name.clone(),
                    expected: expected_hex.to_string(),
                    computed: computed_hex.clone(),
                });
            }
            checks.push(DigestCheck {
                algorithm,
                expected: expected_hex.to_string(),
                computed: computed_hex.clone(),
            });
        }
        Ok(checks)
    }
}
