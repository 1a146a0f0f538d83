//! Session store (`spec.md` §3, §9, C3). A single owning module exposing
//! typed operations with serialization internal to the module; lookup stays
//! O(n) over active sessions, per the teacher's own durability note, "until
//! the expected active count warrants an index on userAddress."

use chrono::Utc;
use ethers::types::Address;
use rand::RngCore;
use tokio::sync::Mutex;

use super::errors::SessionError;
use crate::types::{DepositEvent, Session, SessionStatus, SessionToken};

struct Table {
    sessions: Vec<Session>,
    next_id: u64,
}

pub struct SessionStore {
    table: Mutex<Table>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                sessions: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// `spec.md` §4.1 step 4: persist a fresh session in `awaiting_deposit`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_address: Address,
        expected_amount: u128,
        new_address: Address,
        encrypted_key_for_user: String,
        attestation_report: String,
    ) -> Session {
        let mut table = self.table.lock().await;
        let id = table.next_id;
        table.next_id += 1;
        let now = Utc::now();
        let session = Session {
            id,
            session_token: generate_session_token(),
            user_address,
            expected_amount,
            status: SessionStatus::AwaitingDeposit,
            new_address,
            encrypted_key_for_user,
            attestation_report,
            deposit_tx_hash: None,
            deposit_id: None,
            withdraw_tx_hash: None,
            created_at: now,
            updated_at: now,
        };
        table.sessions.push(session.clone());
        session
    }

    /// `spec.md` §4.1 status endpoint contract — read-only.
    pub async fn get(&self, token: &str) -> Result<Session, SessionError> {
        let table = self.table.lock().await;
        table
            .sessions
            .iter()
            .find(|s| s.session_token == token)
            .cloned()
            .ok_or(SessionError::NotFound)
    }

    /// `spec.md` §4.2: scan for `awaiting_deposit` sessions whose
    /// `(userAddress, expectedAmount)` fall within tolerance of `event`, and
    /// atomically advance every match to `deposit_detected`. Event replay
    /// (`spec.md` §4.2 "Event replay") is idempotent because the
    /// `awaiting_deposit` guard excludes sessions already past that state.
    pub async fn match_deposit(&self, event: &DepositEvent) -> Vec<Session> {
        let mut table = self.table.lock().await;
        let now = Utc::now();
        let mut matched = Vec::new();
        for session in table.sessions.iter_mut() {
            if session.status != SessionStatus::AwaitingDeposit {
                continue;
            }
            if session.user_address != event.from {
                continue;
            }
            let diff = event.amount.abs_diff(session.expected_amount);
            if diff > session.tolerance() {
                continue;
            }
            session.status = SessionStatus::DepositDetected;
            session.deposit_tx_hash = Some(event.tx_hash.clone());
            session.deposit_id = Some(event.deposit_id);
            session.updated_at = now;
            matched.push(session.clone());
        }
        matched
    }

    /// Called by the matcher once a withdrawal job has been created for a
    /// `deposit_detected` session.
    pub async fn advance_to_queued(&self, token: &str) -> Result<Session, SessionError> {
        self.transition(token, SessionStatus::DepositDetected, SessionStatus::WithdrawalQueued)
            .await
    }

    /// Called by the batch processor once `operatorWithdraw` is confirmed.
    pub async fn advance_to_completed(
        &self,
        token: &str,
        withdraw_tx_hash: String,
    ) -> Result<Session, SessionError> {
        let mut table = self.table.lock().await;
        let session = table
            .sessions
            .iter_mut()
            .find(|s| s.session_token == token)
            .ok_or(SessionError::NotFound)?;
        if session.status != SessionStatus::WithdrawalQueued {
            return Err(SessionError::InvalidState);
        }
        session.status = SessionStatus::Completed;
        session.withdraw_tx_hash = Some(withdraw_tx_hash);
        session.updated_at = Utc::now();
        Ok(session.clone())
    }

    /// Called when the jitter engine rejects a session (dust amount), per
    /// `spec.md` §4.3.
    pub async fn advance_to_failed(&self, token: &str) -> Result<Session, SessionError> {
        let mut table = self.table.lock().await;
        let session = table
            .sessions
            .iter_mut()
            .find(|s| s.session_token == token)
            .ok_or(SessionError::NotFound)?;
        if matches!(session.status, SessionStatus::Completed | SessionStatus::Failed) {
            return Err(SessionError::InvalidState);
        }
        session.status = SessionStatus::Failed;
        session.updated_at = Utc::now();
        Ok(session.clone())
    }

    async fn transition(
        &self,
        token: &str,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Session, SessionError> {
        let mut table = self.table.lock().await;
        let session = table
            .sessions
            .iter_mut()
            .find(|s| s.session_token == token)
            .ok_or(SessionError::NotFound)?;
        if session.status != from {
            return Err(SessionError::InvalidState);
        }
        session.status = to;
        session.updated_at = Utc::now();
        Ok(session.clone())
    }
}

fn generate_session_token() -> SessionToken {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_slice(&[byte; 20])
    }

    #[tokio::test]
    async fn matches_a_deposit_within_tolerance_and_not_outside_it() {
        let store = SessionStore::new();
        let session = store
            .create(addr(1), 10_000_000_000, addr(2), "blob".into(), "attest".into())
            .await;

        // tolerance = max(1, 10_000_000_000 / 10_000) = 1_000_000
        let within = DepositEvent {
            from: addr(1),
            amount: 10_000_999_999,
            deposit_id: 1,
            tx_hash: "0x1".into(),
        };
        let matched = store.match_deposit(&within).await;
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].session_token, session.session_token);

        let second = store
            .create(addr(1), 10_000_000_000, addr(3), "blob".into(), "attest".into())
            .await;
        let outside = DepositEvent {
            from: addr(1),
            amount: 10_001_000_001,
            deposit_id: 2,
            tx_hash: "0x2".into(),
        };
        let matched = store.match_deposit(&outside).await;
        assert!(matched.is_empty());
        let still_awaiting = store.get(&second.session_token).await.unwrap();
        assert_eq!(still_awaiting.status, SessionStatus::AwaitingDeposit);
    }

    #[tokio::test]
    async fn replaying_the_same_event_is_idempotent() {
        let store = SessionStore::new();
        let session = store
            .create(addr(1), 2_000_000, addr(2), "blob".into(), "attest".into())
            .await;
        let event = DepositEvent {
            from: addr(1),
            amount: 2_000_000,
            deposit_id: 7,
            tx_hash: "0x1".into(),
        };
        let first = store.match_deposit(&event).await;
        assert_eq!(first.len(), 1);
        let second = store.match_deposit(&event).await;
        assert!(second.is_empty());
        let final_state = store.get(&session.session_token).await.unwrap();
        assert_eq!(final_state.status, SessionStatus::DepositDetected);
    }

    #[tokio::test]
    async fn unknown_depositor_mutates_nothing() {
        let store = SessionStore::new();
        store
            .create(addr(1), 2_000_000, addr(2), "blob".into(), "attest".into())
            .await;
        let event = DepositEvent {
            from: addr(9),
            amount: 2_000_000,
            deposit_id: 8,
            tx_hash: "0x1".into(),
        };
        let matched = store.match_deposit(&event).await;
        assert!(matched.is_empty());
    }
}
