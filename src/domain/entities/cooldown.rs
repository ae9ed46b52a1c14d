//! Provider backoff records.

use chrono::{DateTime, Duration, Utc};

/// Cooldown applied after the first failure.
pub const INITIAL_COOLDOWN_HOURS: i32 = 1;

/// Upper bound on the cooldown (7 days).
pub const MAX_COOLDOWN_HOURS: i32 = 24 * 7;

/// Backoff state for one (provider, compound key) pair.
///
/// Invariant: `earliest_next_request == last_requested + current_cooldown_hours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownRecord {
    /// Time of the failure that produced this record.
    pub last_requested: DateTime<Utc>,
    /// Current backoff window.
    pub current_cooldown_hours: i32,
    /// Provider may be retried at or after this instant.
    pub earliest_next_request: DateTime<Utc>,
}

impl CooldownRecord {
    /// Creates a record starting at `now` with the given window.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>, hours: i32) -> Self {
        Self {
            last_requested: now,
            current_cooldown_hours: hours,
            earliest_next_request: now + Duration::hours(i64::from(hours)),
        }
    }

    /// Returns true while `now` is before the retry instant.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.earliest_next_request
    }

    /// Computes the record produced by a failure at `now`.
    ///
    /// No record or an expired record starts a fresh 1h window. A failure
    /// under an active cooldown doubles the window, clamped to
    /// `[INITIAL_COOLDOWN_HOURS, MAX_COOLDOWN_HOURS]`.
    #[must_use]
    pub fn after_failure(previous: Option<&Self>, now: DateTime<Utc>) -> Self {
        let hours = match previous {
            Some(record) if record.is_active(now) => record
                .current_cooldown_hours
                .saturating_mul(2)
                .clamp(INITIAL_COOLDOWN_HOURS, MAX_COOLDOWN_HOURS),
            _ => INITIAL_COOLDOWN_HOURS,
        };
        Self::starting_at(now, hours)
    }
}
