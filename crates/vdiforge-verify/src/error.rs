#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
