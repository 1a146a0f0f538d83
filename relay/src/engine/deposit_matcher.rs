//! Deposit matcher (`spec.md` §4.2, C5). Polls the chain client for
//! `Deposited` logs and correlates them against awaiting sessions. Modeled
//! as a `spawned_concurrency` `GenServer`, the same idiom the teacher uses
//! for its own L1 log watcher: a self-rescheduling cast loop plus a `Health`
//! call for introspection.

use std::cmp::min;
use std::sync::Arc;

use serde::Serialize;
use spawned_concurrency::tasks::{
    send_after, CallResponse, CastResponse, GenServer, GenServerHandle, InitResult, Success,
};
use tracing::{debug, error, info, warn};

use super::errors::MatcherError;
use super::job_queue::JobQueue;
use super::job_table::JobTable;
use super::jitter;
use super::session_store::SessionStore;
use super::utils::random_duration;
use crate::chain::EthClient;
use crate::config::RelaySettings;
use crate::types::DepositEvent;

const POLL_INTERVAL_MS: u64 = 4_000;
const MAX_BLOCK_STEP: u64 = 2_000;

#[derive(Clone)]
pub enum CallMessage {
    Health,
}

#[derive(Clone)]
pub enum InMessage {
    WatchDeposits,
}

#[derive(Clone)]
pub enum OutMessage {
    Health(MatcherHealth),
}

#[derive(Clone, Serialize)]
pub struct MatcherHealth {
    pub last_block_fetched: u64,
}

pub struct DepositMatcher {
    chain: Arc<EthClient>,
    sessions: Arc<SessionStore>,
    job_table: Arc<JobTable>,
    job_queue: Arc<JobQueue>,
    settings: RelaySettings,
    last_block_fetched: u64,
}

impl DepositMatcher {
    pub fn new(
        chain: Arc<EthClient>,
        sessions: Arc<SessionStore>,
        job_table: Arc<JobTable>,
        job_queue: Arc<JobQueue>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            chain,
            sessions,
            job_table,
            job_queue,
            settings,
            last_block_fetched: 0,
        }
    }

    pub fn spawn(
        chain: Arc<EthClient>,
        sessions: Arc<SessionStore>,
        job_table: Arc<JobTable>,
        job_queue: Arc<JobQueue>,
        settings: RelaySettings,
    ) -> GenServerHandle<Self> {
        Self::new(chain, sessions, job_table, job_queue, settings).start()
    }

    async fn watch(&mut self) {
        if let Err(err) = self.poll_once().await {
            error!("deposit matcher error: {err}");
        }
    }

    async fn poll_once(&mut self) -> Result<(), MatcherError> {
        let current = self.chain.get_block_number().await?;
        if self.last_block_fetched == 0 {
            self.last_block_fetched = current.saturating_sub(1);
        }
        if self.last_block_fetched >= current {
            return Ok(());
        }
        let to_block = min(self.last_block_fetched + MAX_BLOCK_STEP, current);
        debug!(
            "scanning deposits from block {} to {}",
            self.last_block_fetched + 1,
            to_block
        );
        let logs = self
            .chain
            .get_deposited_logs(self.last_block_fetched + 1, to_block)
            .await?;
        self.last_block_fetched = to_block;

        for event in &logs {
            self.process_event(event).await;
        }
        Ok(())
    }

    /// `spec.md` §4.2 steps 2-5: scan, tolerance-match, advance, schedule.
    async fn process_event(&mut self, event: &DepositEvent) {
        let matched = self.sessions.match_deposit(event).await;
        if matched.is_empty() {
            debug!(from = %format!("{:#x}", event.from), "deposit matched no session");
            return;
        }
        // Tie-breaking: multiple matches on one event all advance, each
        // triggering its own job (`spec.md` §4.2 "Tie-breaking").
        for session in matched {
            info!(
                token = %session.session_token,
                amount = event.amount,
                "deposit matched session, computing jitter"
            );
            match jitter::compute(session.expected_amount, self.settings.max_delay_secs) {
                Ok(outcome) => {
                    let job = self
                        .job_table
                        .create(
                            session.session_token.clone(),
                            session.new_address,
                            outcome.normalized_amount,
                            event.deposit_id,
                            outcome.execute_after,
                        )
                        .await;
                    self.job_queue.push(job.id).await;
                    if let Err(err) = self.sessions.advance_to_queued(&session.session_token).await
                    {
                        error!(token = %session.session_token, "failed to advance session to withdrawal_queued: {err}");
                    }
                }
                Err(err) => {
                    warn!(token = %session.session_token, "jitter rejected session: {err}");
                    if let Err(advance_err) =
                        self.sessions.advance_to_failed(&session.session_token).await
                    {
                        error!(token = %session.session_token, "failed to mark session failed: {advance_err}");
                    }
                }
            }
        }
    }

    async fn health(&self) -> CallResponse<Self> {
        CallResponse::Reply(OutMessage::Health(MatcherHealth {
            last_block_fetched: self.last_block_fetched,
        }))
    }
}

impl GenServer for DepositMatcher {
    type CallMsg = CallMessage;
    type CastMsg = InMessage;
    type OutMsg = OutMessage;
    type Error = MatcherError;

    async fn init(self, handle: &GenServerHandle<Self>) -> Result<InitResult<Self>, Self::Error> {
        handle
            .clone()
            .cast(Self::CastMsg::WatchDeposits)
            .await
            .map_err(|e| MatcherError::InternalError(e.to_string()))?;
        Ok(Success(self))
    }

    async fn handle_cast(
        &mut self,
        message: Self::CastMsg,
        handle: &GenServerHandle<Self>,
    ) -> CastResponse {
        match message {
            Self::CastMsg::WatchDeposits => {
                self.watch().await;
                send_after(
                    random_duration(POLL_INTERVAL_MS),
                    handle.clone(),
                    Self::CastMsg::WatchDeposits,
                );
                CastResponse::NoReply
            }
        }
    }

    async fn handle_call(
        &mut self,
        message: Self::CallMsg,
        _handle: &GenServerHandle<Self>,
    ) -> CallResponse<Self> {
        match message {
            CallMessage::Health => self.health().await,
        }
    }
}
