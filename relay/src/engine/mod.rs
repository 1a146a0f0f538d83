pub mod batch_processor;
pub mod deposit_matcher;
pub mod errors;
pub mod jitter;
pub mod job_queue;
pub mod job_table;
pub mod session_store;
pub mod utils;

use std::sync::Arc;

use spawned_concurrency::tasks::GenServerHandle;

use crate::chain::EthClient;
use crate::config::relay::TICK_PERIOD_SECS;
use crate::config::RelaySettings;

pub use errors::EngineError;
pub use job_queue::JobQueue;
pub use job_table::JobTable;
pub use session_store::SessionStore;

/// Everything the withdrawal engine shares with the HTTP surface (C9).
pub struct Engine {
    pub sessions: Arc<SessionStore>,
    pub job_table: Arc<JobTable>,
    pub job_queue: Arc<JobQueue>,
    pub chain: Arc<EthClient>,
}

/// Wires up the session store, job queue/table, and spawns the deposit
/// matcher and batch processor actors, mirroring the teacher's `start_l2`
/// supervisor that spawns `L1Watcher`/`L1Committer` side by side.
pub async fn start_engine(
    chain: Arc<EthClient>,
    settings: RelaySettings,
) -> Result<(Engine, GenServerHandle<deposit_matcher::DepositMatcher>, GenServerHandle<batch_processor::BatchProcessor>), EngineError> {
    let sessions = Arc::new(SessionStore::new());
    let job_table = Arc::new(JobTable::new());
    let job_queue = Arc::new(JobQueue::new());

    let matcher_handle = deposit_matcher::DepositMatcher::spawn(
        chain.clone(),
        sessions.clone(),
        job_table.clone(),
        job_queue.clone(),
        settings,
    );

    let processor_handle = batch_processor::BatchProcessor::spawn(
        chain.clone(),
        sessions.clone(),
        job_table.clone(),
        job_queue.clone(),
        TICK_PERIOD_SECS,
    );

    Ok((
        Engine {
            sessions,
            job_table,
            job_queue,
            chain,
        },
        matcher_handle,
        processor_handle,
    ))
}
