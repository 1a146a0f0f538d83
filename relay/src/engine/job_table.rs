//! Job table: the `WithdrawalJob` records themselves (`spec.md` §3). Kept
//! separate from the job queue (§4.5) exactly as `spec.md` §9 describes the
//! reference design's volatile pairing — the queue is the ordered id list,
//! this is the record store the processor intersects it against.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ethers::types::Address;
use tokio::sync::Mutex;

use crate::types::{JobStatus, WithdrawalJob};

struct Table {
    jobs: HashMap<u64, WithdrawalJob>,
    next_id: u64,
}

pub struct JobTable {
    table: Mutex<Table>,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                jobs: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Exactly one job is created per successful deposit-match
    /// (`spec.md` §3 invariant).
    pub async fn create(
        &self,
        session_token: String,
        new_address: Address,
        normalized_amount: u128,
        deposit_id: u64,
        execute_after: DateTime<Utc>,
    ) -> WithdrawalJob {
        let mut table = self.table.lock().await;
        let id = table.next_id;
        table.next_id += 1;
        let job = WithdrawalJob {
            id,
            session_token,
            new_address,
            normalized_amount,
            deposit_id,
            execute_after,
            status: JobStatus::Pending,
        };
        table.jobs.insert(id, job.clone());
        job
    }

    pub async fn get(&self, id: u64) -> Option<WithdrawalJob> {
        self.table.lock().await.jobs.get(&id).cloned()
    }

    /// `spec.md` §4.4: on failure the job stays `pending` with a new
    /// `executeAfter`; it is never removed except on success.
    pub async fn reschedule(&self, id: u64, execute_after: DateTime<Utc>) {
        let mut table = self.table.lock().await;
        if let Some(job) = table.jobs.get_mut(&id) {
            job.execute_after = execute_after;
        }
    }

    /// Removes the job from the table on success (`spec.md` §4.4).
    pub async fn complete(&self, id: u64) -> Option<WithdrawalJob> {
        let mut table = self.table.lock().await;
        table.jobs.remove(&id).map(|mut job| {
            job.status = JobStatus::Completed;
            job
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completing_a_job_removes_it_from_the_table() {
        let table = JobTable::new();
        let job = table
            .create("tok".into(), Address::zero(), 100, 1, Utc::now())
            .await;
        assert!(table.get(job.id).await.is_some());
        table.complete(job.id).await;
        assert!(table.get(job.id).await.is_none());
    }
}
