pub mod abi;
pub mod client;
pub mod errors;

pub use client::{recover_signer, EthClient};
pub use errors::ChainClientError;
