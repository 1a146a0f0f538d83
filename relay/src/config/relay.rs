use super::errors::ConfigError;

/// Gas pre-fund amount sent to every freshly generated address, in wei.
/// Reference: 0.01 native units. Compiled-in per `spec.md` §6 ("a compiled-in
/// constant"), not environment-configurable.
pub const GAS_PREFUND_WEI: u128 = 10_000_000_000_000_000;

/// Batch processor tick period, `spec.md` §4.4 ("reference: every 10 seconds").
pub const TICK_PERIOD_SECS: u64 = 10;

/// Jitter delay window, `spec.md` §4.3: `[1, 10]` seconds by default, widenable
/// to `[1, 60]` under this single named knob.
const DEFAULT_MAX_DELAY_SECS: u64 = 10;

/// `spec.md` §4.3 edge case guard: a `normalizedAmount` that rounds to zero
/// must fail the session instead of dispatching a dust transfer.
pub const MIN_NORMALIZED_AMOUNT: u128 = 1;

#[derive(Clone, Debug)]
pub struct RelaySettings {
    /// The single named configuration knob widening the jitter delay window
    /// from `[1, 10]`s to `[1, max_delay_secs]`s (`spec.md` §4.3).
    pub max_delay_secs: u64,
    /// Connection string for the job queue (`spec.md` §6, `QUEUE_URL`).
    /// Recognized but unused by the reference in-memory queue — see
    /// DESIGN.md for the durability decision.
    pub queue_url: Option<String>,
}

impl RelaySettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_delay_secs = match std::env::var("RELAY_MAX_DELAY_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                field: "RELAY_MAX_DELAY_SECS",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_MAX_DELAY_SECS,
        };
        if max_delay_secs < 1 {
            return Err(ConfigError::Invalid {
                field: "RELAY_MAX_DELAY_SECS",
                reason: "must be >= 1".to_string(),
            });
        }
        let queue_url = std::env::var("QUEUE_URL").ok();
        Ok(Self {
            max_delay_secs,
            queue_url,
        })
    }
}
