use vdiforge_verify::HashAlgorithm;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid public key material: {0}")]
    InvalidKey(#[source] pgp::errors::Error),

    #[error("keyring contains no keys")]
    EmptyKeyring,

    #[error("not a clearsigned document: {0}")]
    Malformed(#[source] pgp::errors::Error),

    #[error("signature verification failed against every keyring key")]
    SignatureInvalid,

    #[error("signed by untrusted key {signer:016X}, trusted key is {trusted:016X}")]
    UntrustedKey { signer: u64, trusted: u64 },

    #[error("trusted key id must be 16 hex characters, got {0:?}")]
    InvalidKeyId(String),

    #[error("conflicting {algorithm} digests for {filename}")]
    ConflictingDigests {
        algorithm: HashAlgorithm,
        filename: String,
    },
}

pub type Result<T> = std::result::Result<T, ManifestError>;
