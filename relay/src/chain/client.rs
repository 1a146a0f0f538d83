use std::str::FromStr;
use std::sync::Arc;

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Signature, H256, U256};
use tracing::{info, warn};

use crate::config::EthConfig;
use crate::types::DepositEvent;

use super::abi::EscrowPool;
use super::errors::ChainClientError;

type SignerProvider = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Abstracts the transport to a single EVM-compatible RPC endpoint
/// (`spec.md` §4.6, C4): deposit-log subscription, replay-protected
/// withdrawal submission, and gas pre-funding.
pub struct EthClient {
    inner: Arc<SignerProvider>,
    escrow: EscrowPool<SignerProvider>,
    pub operator_address: Address,
}

impl EthClient {
    pub async fn new(config: &EthConfig) -> Result<Self, ChainClientError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ChainClientError::Provider(e.to_string()))?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| ChainClientError::Transient(e.to_string()))?
            .as_u64();

        let wallet = match config.operator_private_key {
            Some(key) => LocalWallet::from_bytes(key.secret_bytes().as_slice())
                .map_err(|e| ChainClientError::Provider(e.to_string()))?,
            None => {
                let ephemeral = LocalWallet::new(&mut rand::thread_rng());
                warn!(
                    "OPERATOR_PRIVATE_KEY absent or invalid; generated ephemeral operator key, address={:#x}",
                    ephemeral.address()
                );
                ephemeral
            }
        }
        .with_chain_id(chain_id);

        let operator_address = wallet.address();
        info!(operator = %format!("{operator_address:#x}"), "chain client configured");

        let inner = Arc::new(SignerMiddleware::new(provider, wallet));
        let escrow = EscrowPool::new(config.escrow_contract_address, inner.clone());

        Ok(Self {
            inner,
            escrow,
            operator_address,
        })
    }

    pub async fn get_block_number(&self) -> Result<u64, ChainClientError> {
        self.inner
            .get_block_number()
            .await
            .map(|n| n.as_u64())
            .map_err(|e| ChainClientError::Transient(e.to_string()))
    }

    /// Fetches `Deposited` logs emitted by the escrow contract in
    /// `[from_block, to_block]`, inclusive, in chain order.
    pub async fn get_deposited_logs(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<DepositEvent>, ChainClientError> {
        let events = self
            .escrow
            .deposited_filter()
            .from_block(from_block)
            .to_block(to_block)
            .query_with_meta()
            .await
            .map_err(|e| ChainClientError::Transient(e.to_string()))?;

        Ok(events
            .into_iter()
            .map(|(event, meta)| DepositEvent {
                from: event.from,
                amount: event.amount.as_u128(),
                deposit_id: event.deposit_id.as_u64(),
                tx_hash: format!("{:#x}", meta.transaction_hash),
            })
            .collect())
    }

    /// Submits `operatorWithdraw(to, amount, depositId, jobId)` and awaits a
    /// confirmation receipt. A non-success receipt is reported as
    /// `ChainClientError::Fatal`, never swallowed (`spec.md` §4.6).
    pub async fn submit_withdrawal(
        &self,
        to: Address,
        amount: u128,
        deposit_id: u64,
        job_id32: H256,
    ) -> Result<String, ChainClientError> {
        let call = self
            .escrow
            .operator_withdraw(to, U256::from(amount), U256::from(deposit_id), job_id32.0);

        let pending = call
            .send()
            .await
            .map_err(|e| ChainClientError::Transient(e.to_string()))?;

        let receipt = pending
            .await
            .map_err(|e| ChainClientError::Transient(e.to_string()))?
            .ok_or_else(|| ChainClientError::Transient("no receipt returned".to_string()))?;

        match receipt.status.map(|s| s.as_u64()) {
            Some(1) => Ok(format!("{:#x}", receipt.transaction_hash)),
            _ => Err(ChainClientError::Fatal(format!(
                "operatorWithdraw reverted: tx={:#x}",
                receipt.transaction_hash
            ))),
        }
    }

    /// Sends a small fixed amount of the native gas token to `to`. Failure is
    /// always surfaced to the caller; callers that treat this as best-effort
    /// (the request API, per `spec.md` §4.1) are responsible for swallowing
    /// the error themselves.
    pub async fn submit_gas_funding(&self, to: Address, amount_wei: u128) -> Result<String, ChainClientError> {
        let tx = ethers::types::TransactionRequest::new()
            .to(to)
            .value(U256::from(amount_wei));

        let pending = self
            .inner
            .send_transaction(tx, None)
            .await
            .map_err(|e| ChainClientError::Transient(e.to_string()))?;

        let receipt = pending
            .await
            .map_err(|e| ChainClientError::Transient(e.to_string()))?
            .ok_or_else(|| ChainClientError::Transient("no receipt returned".to_string()))?;

        match receipt.status.map(|s| s.as_u64()) {
            Some(1) => Ok(format!("{:#x}", receipt.transaction_hash)),
            _ => Err(ChainClientError::Fatal(format!(
                "gas pre-fund reverted: tx={:#x}",
                receipt.transaction_hash
            ))),
        }
    }
}

/// Recovers the signer address from an EIP-191 personal-sign signature over
/// `message` (`spec.md` §4.1, step 1).
pub fn recover_signer(message: &str, signature_hex: &str) -> Result<Address, ChainClientError> {
    let signature = Signature::from_str(signature_hex.trim_start_matches("0x"))
        .map_err(|e| ChainClientError::InvalidSignature(e.to_string()))?;
    signature
        .recover(message)
        .map_err(|e| ChainClientError::InvalidSignature(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use ethers::signers::LocalWallet;

    #[tokio::test]
    async fn recovers_the_address_that_signed_the_message() {
        let wallet = LocalWallet::new(&mut rand::thread_rng());
        let message = "unlinker request 1700000000000 0xabc";
        let signature = wallet.sign_message(message).await.unwrap();
        let recovered = recover_signer(message, &signature.to_string()).unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[tokio::test]
    async fn rejects_a_signature_over_a_different_message() {
        let wallet = LocalWallet::new(&mut rand::thread_rng());
        let signature = wallet.sign_message("original").await.unwrap();
        let recovered = recover_signer("tampered", &signature.to_string()).unwrap();
        assert_ne!(recovered, wallet.address());
    }
}
