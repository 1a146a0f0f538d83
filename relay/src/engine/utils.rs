use std::time::Duration;

use ethers::types::H256;
use rand::Rng;

/// Adds a small random jitter to a base sleep/poll interval, the way the
/// teacher's watchers avoid every periodic task waking in lockstep.
pub fn random_duration(base_ms: u64) -> Duration {
    let noise_ms: u64 = rand::thread_rng().gen_range(0..400);
    Duration::from_millis(base_ms + noise_ms)
}

/// Uniformly samples a retry backoff in `[30, 120]` seconds, per `spec.md`
/// §4.4 ("On failure: ... set executeAfter = now + random(30, 120) s").
pub fn random_retry_backoff_secs() -> i64 {
    rand::thread_rng().gen_range(30..=120)
}

/// Deterministic bytes32 correlation id presented on-chain for a given
/// internal job id (`spec.md` §4.6, §9 "Deterministic bytes32 job id").
/// Retries reuse this same hash so the contract's replay guard actually
/// protects the operator from double-submission.
pub fn job_id32(job_id: u64) -> H256 {
    H256::from(ethers::utils::keccak256(job_id.to_be_bytes()))
}

/// Fisher-Yates shuffle, `spec.md` §4.4 step 3 — decouples withdrawal order
/// from session-creation order within a tick.
pub fn shuffle<T>(items: &mut [T]) {
    let mut rng = rand::thread_rng();
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn job_id32_is_stable_across_calls() {
        assert_eq!(job_id32(42), job_id32(42));
        assert_ne!(job_id32(42), job_id32(43));
    }
}
