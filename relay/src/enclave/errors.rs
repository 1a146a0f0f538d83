#[derive(Debug, thiserror::Error)]
pub enum EnclaveError {
    #[error("failed to generate key material: {0}")]
    KeyGeneration(String),
    #[error("failed to wrap private key: {0}")]
    Wrap(String),
    #[error("failed to unwrap key blob: {0}")]
    Unwrap(String),
}
