//! End-to-end exercise of the matcher -> jitter -> job-queue -> processor
//! path (`spec.md` §8), without a live chain client: drives the same
//! `SessionStore`/`JobTable`/`JobQueue`/`jitter` building blocks the
//! `DepositMatcher`/`BatchProcessor` actors use internally.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use ethers::types::Address;
use relay::engine::{jitter, JobQueue, JobTable, SessionStore};
use relay::types::{DepositEvent, JobStatus, SessionStatus};

fn addr(byte: u8) -> Address {
    Address::from_slice(&[byte; 20])
}

#[tokio::test]
async fn a_matched_deposit_produces_exactly_one_pending_job() {
    let sessions = SessionStore::new();
    let job_table = JobTable::new();
    let job_queue = JobQueue::new();

    let session = sessions
        .create(addr(1), 5_000_000, addr(2), "blob".into(), "attest".into())
        .await;

    let event = DepositEvent {
        from: addr(1),
        amount: 5_000_000,
        deposit_id: 11,
        tx_hash: "0xabc".into(),
    };
    let matched = sessions.match_deposit(&event).await;
    assert_eq!(matched.len(), 1);

    let outcome = jitter::compute(matched[0].expected_amount, 10).expect("jitter");
    let job = job_table
        .create(
            session.session_token.clone(),
            session.new_address,
            outcome.normalized_amount,
            event.deposit_id,
            outcome.execute_after,
        )
        .await;
    job_queue.push(job.id).await;

    sessions
        .advance_to_queued(&session.session_token)
        .await
        .expect("advance to queued");

    let queued_ids = job_queue.scan().await;
    assert_eq!(queued_ids, vec![job.id]);

    let stored_job = job_table.get(job.id).await.expect("job exists");
    assert_eq!(stored_job.status, JobStatus::Pending);
    assert_ne!(stored_job.normalized_amount, 0);

    let final_session = sessions.get(&session.session_token).await.expect("session exists");
    assert_eq!(final_session.status, SessionStatus::WithdrawalQueued);
}

#[tokio::test]
async fn completing_a_job_removes_it_from_both_queue_and_table() {
    let job_table = JobTable::new();
    let job_queue = JobQueue::new();

    let job = job_table
        .create("tok".into(), addr(3), 42, 1, chrono::Utc::now())
        .await;
    job_queue.push(job.id).await;

    job_table.complete(job.id).await;
    job_queue.remove(job.id).await;

    assert!(job_table.get(job.id).await.is_none());
    assert!(job_queue.scan().await.is_empty());
}

#[tokio::test]
async fn a_dust_sized_expected_amount_never_produces_a_job() {
    // expectedAmount = 1 with a -30ppm draw would round to 0 under naive
    // truncation; `jitter::compute` must floor at 1, never dispatch at 0
    // (`spec.md` §4.3 edge case).
    for _ in 0..50 {
        let outcome = jitter::compute(1, 10).expect("jitter never rejects E=1");
        assert!(outcome.normalized_amount >= 1);
    }
}
