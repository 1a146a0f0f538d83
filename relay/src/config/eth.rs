use ethers::types::Address;
use reqwest::Url;
use secp256k1::SecretKey;

use super::errors::ConfigError;

/// Chain-facing configuration: RPC endpoint, escrow contract address, and
/// the operator's signing key. `operator_private_key` is intentionally
/// optional — see `spec.md` §6: absent or invalid means the process mints an
/// ephemeral key for its own lifetime (handled by the chain client, not
/// here, since only the client knows how to log the derived address).
#[derive(Clone, Debug)]
pub struct EthConfig {
    pub rpc_url: Url,
    pub escrow_contract_address: Address,
    pub operator_private_key: Option<SecretKey>,
}

impl EthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_url = std::env::var("CHAIN_RPC")
            .map_err(|_| ConfigError::Invalid {
                field: "CHAIN_RPC",
                reason: "not set".to_string(),
            })?
            .parse::<Url>()
            .map_err(|e| ConfigError::Invalid {
                field: "CHAIN_RPC",
                reason: e.to_string(),
            })?;

        let escrow_contract_address = std::env::var("ESCROW_CONTRACT_ADDRESS")
            .map_err(|_| ConfigError::Invalid {
                field: "ESCROW_CONTRACT_ADDRESS",
                reason: "not set".to_string(),
            })?
            .trim_start_matches("0x")
            .parse::<Address>()
            .map_err(|e| ConfigError::Invalid {
                field: "ESCROW_CONTRACT_ADDRESS",
                reason: format!("{e:?}"),
            })?;

        let operator_private_key = match std::env::var("OPERATOR_PRIVATE_KEY") {
            Ok(raw) => parse_secret_key(&raw),
            Err(_) => None,
        };

        Ok(Self {
            rpc_url,
            escrow_contract_address,
            operator_private_key,
        })
    }
}

fn parse_secret_key(raw: &str) -> Option<SecretKey> {
    let bytes = hex::decode(raw.trim_start_matches("0x")).ok()?;
    SecretKey::from_slice(&bytes).ok()
}
