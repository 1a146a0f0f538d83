//! Batch processor (`spec.md` §4.4, C8). A periodic, single-flight tick:
//! scan eligible jobs, shuffle them, submit withdrawals sequentially. Modeled
//! as a `spawned_concurrency` `GenServer` the same way the teacher's
//! `L1Committer` runs its own periodic submission loop — because a cast
//! handler runs to completion before the next tick is scheduled, two ticks
//! can never be in flight at once, which is exactly the "guard held for the
//! duration of a tick" discipline `spec.md` §9 calls for.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use spawned_concurrency::tasks::{
    send_after, CallResponse, CastResponse, GenServer, GenServerHandle, InitResult, Success,
};
use tracing::{error, info, warn};

use super::errors::ProcessorError;
use super::job_queue::JobQueue;
use super::job_table::JobTable;
use super::session_store::SessionStore;
use super::utils::{job_id32, random_retry_backoff_secs, shuffle};
use crate::chain::EthClient;
use crate::types::{JobStatus, WithdrawalJob};

#[derive(Clone)]
pub enum CallMessage {
    Health,
}

#[derive(Clone)]
pub enum InMessage {
    Tick,
}

#[derive(Clone)]
pub enum OutMessage {
    Health(ProcessorHealth),
}

#[derive(Clone, Serialize)]
pub struct ProcessorHealth {
    pub pending_jobs: usize,
}

pub struct BatchProcessor {
    chain: Arc<EthClient>,
    sessions: Arc<SessionStore>,
    job_table: Arc<JobTable>,
    job_queue: Arc<JobQueue>,
    tick_period_secs: u64,
    last_pending_count: usize,
}

impl BatchProcessor {
    pub fn new(
        chain: Arc<EthClient>,
        sessions: Arc<SessionStore>,
        job_table: Arc<JobTable>,
        job_queue: Arc<JobQueue>,
        tick_period_secs: u64,
    ) -> Self {
        Self {
            chain,
            sessions,
            job_table,
            job_queue,
            tick_period_secs,
            last_pending_count: 0,
        }
    }

    pub fn spawn(
        chain: Arc<EthClient>,
        sessions: Arc<SessionStore>,
        job_table: Arc<JobTable>,
        job_queue: Arc<JobQueue>,
        tick_period_secs: u64,
    ) -> GenServerHandle<Self> {
        Self::new(chain, sessions, job_table, job_queue, tick_period_secs).start()
    }

    /// `spec.md` §4.4 steps 1-4.
    async fn run_tick(&mut self) {
        let ids = self.job_queue.scan().await;
        let now = Utc::now();

        let mut eligible = Vec::new();
        for id in ids {
            let Some(job) = self.job_table.get(id).await else {
                continue;
            };
            if job.status != JobStatus::Pending {
                continue;
            }
            if job.execute_after > now {
                continue;
            }
            eligible.push(job);
        }
        self.last_pending_count = eligible.len();
        if eligible.is_empty() {
            return;
        }

        // Shuffle is essential: it decouples withdrawal order from
        // session-creation order within a tick (`spec.md` §4.4 step 3).
        shuffle(&mut eligible);

        // No parallel submission — the operator has a single nonce stream,
        // so jobs execute sequentially within a tick by construction.
        for job in eligible {
            self.submit_one(job).await;
        }
    }

    async fn submit_one(&mut self, job: WithdrawalJob) {
        let job_id = job_id32(job.id);
        match self
            .chain
            .submit_withdrawal(job.new_address, job.normalized_amount, job.deposit_id, job_id)
            .await
        {
            Ok(tx_hash) => {
                info!(job = job.id, tx_hash = %tx_hash, "withdrawal confirmed");
                self.job_table.complete(job.id).await;
                self.job_queue.remove(job.id).await;
                if let Err(err) = self
                    .sessions
                    .advance_to_completed(&job.session_token, tx_hash)
                    .await
                {
                    error!(token = %job.session_token, "failed to advance session to completed: {err}");
                }
            }
            Err(err) => {
                warn!(job = job.id, "withdrawal submission failed, rescheduling: {err}");
                let backoff = random_retry_backoff_secs();
                let execute_after = Utc::now() + chrono::Duration::seconds(backoff);
                self.job_table.reschedule(job.id, execute_after).await;
            }
        }
    }

    async fn health(&self) -> CallResponse<Self> {
        CallResponse::Reply(OutMessage::Health(ProcessorHealth {
            pending_jobs: self.last_pending_count,
        }))
    }
}

impl GenServer for BatchProcessor {
    type CallMsg = CallMessage;
    type CastMsg = InMessage;
    type OutMsg = OutMessage;
    type Error = ProcessorError;

    async fn init(self, handle: &GenServerHandle<Self>) -> Result<InitResult<Self>, Self::Error> {
        handle
            .clone()
            .cast(Self::CastMsg::Tick)
            .await
            .map_err(|e| ProcessorError::InternalError(e.to_string()))?;
        Ok(Success(self))
    }

    async fn handle_cast(
        &mut self,
        message: Self::CastMsg,
        handle: &GenServerHandle<Self>,
    ) -> CastResponse {
        match message {
            Self::CastMsg::Tick => {
                self.run_tick().await;
                send_after(
                    std::time::Duration::from_secs(self.tick_period_secs),
                    handle.clone(),
                    Self::CastMsg::Tick,
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
