//! Amount-and-delay jitter policy (`spec.md` §4.3, C6). Disrupts naive
//! exact-amount joins across the deposit/withdrawal event streams; it does
//! not provide cryptographic mixing (see `spec.md` §9).

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;

use super::errors::JitterError;
use crate::config::relay::MIN_NORMALIZED_AMOUNT;

const PPM_MIN: i64 = -30;
const PPM_MAX: i64 = 40;

pub struct JitterOutcome {
    pub normalized_amount: u128,
    pub execute_after: DateTime<Utc>,
}

/// Given `expectedAmount = E`, samples `ppm` uniformly in `[-30, 40]` and
/// computes `normalizedAmount = E + (E * ppm) / 1_000_000` using integer
/// arithmetic truncated toward zero — no floating-point ever enters the
/// monetary path. Samples `delaySeconds` uniformly in `[1, max_delay_secs]`.
pub fn compute(expected_amount: u128, max_delay_secs: u64) -> Result<JitterOutcome, JitterError> {
    let ppm = rand::thread_rng().gen_range(PPM_MIN..=PPM_MAX);
    let delta = (expected_amount as i128 * ppm as i128) / 1_000_000;
    let normalized = expected_amount as i128 + delta;

    if normalized < MIN_NORMALIZED_AMOUNT as i128 {
        return Err(JitterError::DustAmount(expected_amount));
    }

    let delay_secs = rand::thread_rng().gen_range(1..=max_delay_secs.max(1)) as i64;
    let execute_after = Utc::now() + ChronoDuration::seconds(delay_secs);

    Ok(JitterOutcome {
        normalized_amount: normalized as u128,
        execute_after,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn normalized_amount_stays_within_the_ppm_band() {
        for _ in 0..200 {
            let outcome = compute(2_000_000, 10).unwrap();
            let lower = 2_000_000 - 2_000_000 * 30 / 1_000_000;
            let upper = 2_000_000 + 2_000_000 * 40 / 1_000_000;
            assert!(outcome.normalized_amount >= lower);
            assert!(outcome.normalized_amount <= upper);
        }
    }

    #[test]
    fn delay_window_respects_the_configured_maximum() {
        for _ in 0..200 {
            let outcome = compute(2_000_000, 10).unwrap();
            let now = Utc::now();
            let delta = outcome.execute_after - now;
            assert!(delta.num_seconds() >= 0);
            assert!(delta.num_seconds() <= 10);
        }
    }

    #[test]
    fn an_expected_amount_of_one_never_rounds_to_dust() {
        // With E=1, any negative ppm truncates the delta to 0, so
        // normalized == 1 always, never 0.
        for _ in 0..200 {
            let outcome = compute(1, 10).unwrap();
            assert_eq!(outcome.normalized_amount, 1);
        }
    }
}
