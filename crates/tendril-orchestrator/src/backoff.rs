//! Respawn backoff (§4.3): base 20 s, doubling per consecutive failure,
//! capped at 5 min, abandoned after 20 consecutive failures. Same
//! `base * 2^(attempt-1)` shape as `hip3-ws::connection::ConnectionManager`'s
//! reconnect backoff, generalized from a socket reconnect to a child-process
//! respawn.

use std::time::Duration;

pub const RESPAWN_BASE_MS: u64 = 20_000;
pub const RESPAWN_MAX_MS: u64 = 5 * 60_000;
pub const MAX_CONSECUTIVE_FAILURES: u32 = 20;

/// Delay before the next respawn attempt, given `fail_count` consecutive
/// failures observed so far (1 = first failure). Returns `None` once the
/// worker should be abandoned.
pub fn next_delay(fail_count: u32) -> Option<Duration> {
    if fail_count >= MAX_CONSECUTIVE_FAILURES {
        return None;
    }
    let exponent = fail_count.saturating_sub(1).min(10);
    let delay_ms = RESPAWN_BASE_MS.saturating_mul(1u64 << exponent).min(RESPAWN_MAX_MS);
    Some(Duration::from_millis(delay_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_three_failures_double() {
        assert_eq!(next_delay(1), Some(Duration::from_millis(20_000)));
        assert_eq!(next_delay(2), Some(Duration::from_millis(40_000)));
        assert_eq!(next_delay(3), Some(Duration::from_millis(80_000)));
    }

    #[test]
    fn test_caps_at_five_minutes() {
        let delay = next_delay(15).unwrap();
        assert_eq!(delay, Duration::from_millis(RESPAWN_MAX_MS));
    }

    #[test]
    fn test_gives_up_after_twenty_failures() {
        assert!(next_delay(20).is_none());
        assert!(next_delay(21).is_none());
    }
}
