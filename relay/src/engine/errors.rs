use crate::chain::ChainClientError;
use crate::enclave::EnclaveError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start deposit matcher: {0}")]
    Matcher(#[from] MatcherError),
    #[error("failed to start batch processor: {0}")]
    Processor(#[from] ProcessorError),
}

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("chain client error: {0}")]
    ChainClient(#[from] ChainClientError),
    #[error("internal actor error: {0}")]
    InternalError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("chain client error: {0}")]
    ChainClient(#[from] ChainClientError),
    #[error("internal actor error: {0}")]
    InternalError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum JitterError {
    /// `spec.md` §4.3: a `normalizedAmount` that rounds to zero must fail
    /// the session rather than dispatch a dust transfer.
    #[error("normalized amount rounded to zero for expectedAmount={0}")]
    DustAmount(u128),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no session for token")]
    NotFound,
    #[error("session is not in the expected state for this transition")]
    InvalidState,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("session not found")]
    NotFound,
    #[error("invalid state for this operation")]
    InvalidState,
    #[error("key enclave error: {0}")]
    Enclave(#[from] EnclaveError),
    #[error("chain client error: {0}")]
    ChainClient(#[from] ChainClientError),
}
