//! Wall-clock timestamp with monotonic comparability.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};

/// A capture instant. Backed by UTC wall-clock time so that two
/// timestamps from the same camera compare in capture order; formatted
/// with the local offset for the face-recognition backend (§4.8 step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_utc(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    /// Elapsed time from `self` to `other`. Zero if `other` is not after
    /// `self` (clocks never run backwards across a comparison we care
    /// about here: TTL checks only ever compare against "now").
    pub fn elapsed_until(&self, other: Timestamp) -> Duration {
        let delta = other.0.signed_duration_since(self.0);
        delta.to_std().unwrap_or(Duration::ZERO)
    }

    /// ISO-8601 with the process's local UTC offset, as required by the
    /// face-recognition backend contract (§6.2).
    pub fn to_iso8601_local(&self) -> String {
        self.0.with_timezone(&Local).to_rfc3339()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ordering_follows_wall_clock() {
        let a = Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let b = Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 5).unwrap());
        assert!(a < b);
        assert_eq!(a.elapsed_until(b), Duration::from_secs(5));
    }

    #[test]
    fn elapsed_until_is_zero_when_not_after() {
        let a = Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 5).unwrap());
        let b = Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(a.elapsed_until(b), Duration::ZERO);
    }
}
