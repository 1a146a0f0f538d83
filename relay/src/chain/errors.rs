#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("transient RPC error: {0}")]
    Transient(String),
    #[error("transaction reverted or not mined: {0}")]
    Fatal(String),
    #[error("failed to build provider: {0}")]
    Provider(String),
    #[error("failed to recover signer from signature: {0}")]
    InvalidSignature(String),
}
