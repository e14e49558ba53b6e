//! Freshness budget parsing and the staleness decision.
//!
//! # Invariants
//!
//! - **Empty history is stale**: with no snapshot at all there is nothing
//!   that could be fresh.
//! - **Strict boundary**: a snapshot exactly as old as the budget is still
//!   fresh; staleness requires `elapsed > budget`.
//! - **Zero budget is always stale** (any positive age exceeds it).
//! - **Pure**: the caller supplies "now"; no IO, no clock reads here.

use fwd_api::Snapshot;
use std::fmt;

/// A freshness string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshnessParseError {
    /// The first character that is neither a digit nor a unit letter.
    UnexpectedChar(char),
    /// The duration does not fit in a `u64` of seconds.
    Overflow,
}

impl fmt::Display for FreshnessParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreshnessParseError::UnexpectedChar(c) => write!(
                f,
                "freshness string is invalid: unexpected character '{c}' (expected digits and s/m/h/d units)"
            ),
            FreshnessParseError::Overflow => {
                write!(f, "freshness string is invalid: duration overflows")
            }
        }
    }
}

impl std::error::Error for FreshnessParseError {}

/// Parse a compact duration string into seconds.
///
/// The grammar is a sequence of `(digits, unit)` pairs with unit one of
/// `s`, `m`, `h`, `d` (case-insensitive): `"10m"` is 600, `"1h30m"` is
/// 5400. The digit accumulator resets after each unit, so every pair
/// contributes independently. An empty string is zero; trailing digits
/// without a unit contribute nothing. A total that does not fit in a
/// `u64` of seconds is an overflow error, never a wrap.
pub fn parse_freshness(s: &str) -> Result<u64, FreshnessParseError> {
    let mut total: u64 = 0;
    let mut current: u64 = 0;

    for c in s.chars() {
        if let Some(digit) = c.to_digit(10) {
            current = current
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit)))
                .ok_or(FreshnessParseError::Overflow)?;
            continue;
        }
        let unit_seconds = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 60 * 60 * 24,
            _ => return Err(FreshnessParseError::UnexpectedChar(c)),
        };
        total = current
            .checked_mul(unit_seconds)
            .and_then(|v| total.checked_add(v))
            .ok_or(FreshnessParseError::Overflow)?;
        current = 0;
    }

    Ok(total)
}

/// The maximum-creation-time snapshot, if any. Server ordering is not
/// assumed.
pub fn latest_snapshot(snapshots: &[Snapshot]) -> Option<&Snapshot> {
    snapshots.iter().max_by_key(|s| s.creation_time_ms)
}

/// Outcome of the freshness decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The latest snapshot is within budget; no acquisition needed.
    Fresh {
        /// The snapshot satisfying the budget.
        latest: Snapshot,
    },
    /// A new snapshot must be acquired.
    Stale {
        /// The latest known snapshot before refresh, used afterwards to
        /// detect that no new snapshot actually appeared.
        prior_latest: Option<Snapshot>,
    },
}

/// Decide whether the latest of `snapshots` is within `budget_secs` of
/// `now_ms`.
pub fn freshness(snapshots: &[Snapshot], budget_secs: u64, now_ms: i64) -> Freshness {
    let latest = match latest_snapshot(snapshots) {
        Some(latest) => latest.clone(),
        None => return Freshness::Stale { prior_latest: None },
    };

    let elapsed_ms = now_ms.saturating_sub(latest.creation_time_ms);
    let budget_ms = (budget_secs as i64).saturating_mul(1000);

    if elapsed_ms > budget_ms {
        Freshness::Stale {
            prior_latest: Some(latest),
        }
    } else {
        Freshness::Fresh { latest }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(id: i64, created_ms: i64) -> Snapshot {
        Snapshot {
            id,
            creation_time_ms: created_ms,
        }
    }

    #[test]
    fn parse_simple_durations() {
        assert_eq!(parse_freshness("10m").unwrap(), 600);
        assert_eq!(parse_freshness("20s").unwrap(), 20);
        assert_eq!(parse_freshness("2h").unwrap(), 7200);
        assert_eq!(parse_freshness("1d").unwrap(), 86_400);
    }

    #[test]
    fn parse_compound_durations_pair_by_pair() {
        assert_eq!(parse_freshness("1h30m").unwrap(), 5400);
        assert_eq!(parse_freshness("1d1h30m").unwrap(), 91_800);
        assert_eq!(parse_freshness("1h10m").unwrap(), 4200);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(parse_freshness("1H30M").unwrap(), 5400);
        assert_eq!(parse_freshness("1D").unwrap(), 86_400);
    }

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(parse_freshness("").unwrap(), 0);
    }

    #[test]
    fn trailing_digits_without_unit_contribute_nothing() {
        assert_eq!(parse_freshness("1h30").unwrap(), 3600);
    }

    #[test]
    fn unexpected_character_fails_and_is_named() {
        let err = parse_freshness("10x").unwrap_err();
        assert_eq!(err, FreshnessParseError::UnexpectedChar('x'));
        assert!(err.to_string().contains('x'));
    }

    #[test]
    fn overflowing_digit_run_is_an_error_not_a_panic() {
        let err = parse_freshness("99999999999999999999s").unwrap_err();
        assert_eq!(err, FreshnessParseError::Overflow);
    }

    #[test]
    fn overflowing_unit_multiply_is_an_error_not_a_panic() {
        // Fits in u64 as a digit run, overflows when scaled to seconds.
        let err = parse_freshness("999999999999999999d").unwrap_err();
        assert_eq!(err, FreshnessParseError::Overflow);
    }

    #[test]
    fn empty_history_is_always_stale() {
        assert_eq!(
            freshness(&[], 86_400, 1_000_000),
            Freshness::Stale { prior_latest: None }
        );
    }

    #[test]
    fn age_equal_to_budget_is_fresh() {
        let snaps = vec![snap(1, 1_000_000)];
        // elapsed exactly 600s with a 600s budget.
        let decision = freshness(&snaps, 600, 1_000_000 + 600_000);
        assert_eq!(decision, Freshness::Fresh { latest: snap(1, 1_000_000) });
    }

    #[test]
    fn one_second_past_budget_is_stale() {
        let snaps = vec![snap(1, 1_000_000)];
        let decision = freshness(&snaps, 600, 1_000_000 + 601_000);
        assert_eq!(
            decision,
            Freshness::Stale { prior_latest: Some(snap(1, 1_000_000)) }
        );
    }

    #[test]
    fn zero_budget_is_stale_for_any_positive_age() {
        let snaps = vec![snap(1, 1_000_000)];
        let decision = freshness(&snaps, 0, 1_000_001);
        assert!(matches!(decision, Freshness::Stale { .. }));
    }

    #[test]
    fn latest_is_max_creation_time_not_list_order() {
        let snaps = vec![snap(3, 500), snap(1, 2000), snap(2, 1000)];
        assert_eq!(latest_snapshot(&snaps).unwrap().id, 1);

        // The newest-by-time element decides freshness even when the
        // server lists an older snapshot first.
        let decision = freshness(&snaps, 10, 2000);
        assert_eq!(decision, Freshness::Fresh { latest: snap(1, 2000) });
    }
}
