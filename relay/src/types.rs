use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// Opaque public handle for a session. Never used as a database key directly
/// by callers — always looked up through the session store.
pub type SessionToken = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    AwaitingDeposit,
    DepositDetected,
    WithdrawalQueued,
    Completed,
    Failed,
}

/// One user's one privacy-preserving transfer from a funding address to a
/// fresh trading address. Identity fields are set at creation and never
/// rewritten; only `status` and the nullable tx-correlation fields advance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: u64,
    pub session_token: SessionToken,
    pub user_address: Address,
    pub expected_amount: u128,
    pub status: SessionStatus,
    pub new_address: Address,
    #[serde(skip_serializing)]
    pub encrypted_key_for_user: String,
    pub attestation_report: String,
    pub deposit_tx_hash: Option<String>,
    pub deposit_id: Option<u64>,
    pub withdraw_tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn tolerance(&self) -> u128 {
        std::cmp::max(1, self.expected_amount / 10_000)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

/// A scheduled, jittered, not-yet-executed withdrawal from the escrow pool.
/// Back-references a session by token only — the job never owns the session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawalJob {
    pub id: u64,
    pub session_token: SessionToken,
    pub new_address: Address,
    pub normalized_amount: u128,
    pub deposit_id: u64,
    pub execute_after: DateTime<Utc>,
    pub status: JobStatus,
}

/// A `Deposited` log as delivered by the chain client. Ingested, not owned:
/// the matcher only ever reads it to drive session-state changes.
#[derive(Clone, Debug)]
pub struct DepositEvent {
    pub from: Address,
    pub amount: u128,
    pub deposit_id: u64,
    pub tx_hash: String,
}
