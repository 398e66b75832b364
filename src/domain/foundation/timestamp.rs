//! UTC timestamp value object.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A point in time, always UTC, serialized as RFC 3339.
///
/// Wrapping `DateTime<Utc>` keeps timezone handling out of the entities;
/// anything crossing this boundary is already normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Interprets `secs` as seconds since the unix epoch.
    pub fn from_unix_secs(secs: u64) -> Self {
        let dt = DateTime::from_timestamp(secs as i64, 0).expect("within chrono's datetime range");
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn as_unix_secs(&self) -> u64 {
        self.0.timestamp() as u64
    }

    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Signed distance from `other` to `self`, negative when `other` is
    /// the later of the two.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0 + Duration::seconds(secs as i64))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn now_sits_between_surrounding_clock_reads() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn comparisons_and_ordering_agree() {
        let earlier = Timestamp::from_unix_secs(1_000);
        let later = Timestamp::from_unix_secs(2_000);

        assert!(earlier.is_before(&later));
        assert!(later.is_after(&earlier));
        assert!(!later.is_before(&earlier));
        assert!(earlier < later);
    }

    #[test]
    fn unix_seconds_roundtrip() {
        // 2024-01-15T00:00:00Z
        let ts = Timestamp::from_unix_secs(1_705_276_800);

        assert_eq!(ts.as_unix_secs(), 1_705_276_800);
        assert_eq!(ts.as_datetime().year(), 2024);
        assert_eq!(ts.as_datetime().day(), 15);
    }

    #[test]
    fn plus_secs_moves_forward() {
        let ts = Timestamp::from_unix_secs(1_000);
        assert_eq!(ts.plus_secs(60).as_unix_secs(), 1_060);
    }

    #[test]
    fn duration_since_is_signed() {
        let a = Timestamp::from_unix_secs(1_000);
        let b = Timestamp::from_unix_secs(1_060);

        assert_eq!(b.duration_since(&a).num_seconds(), 60);
        assert_eq!(a.duration_since(&b).num_seconds(), -60);
    }

    #[test]
    fn serde_uses_rfc3339_strings() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();
        assert_eq!(ts.as_unix_secs(), 1_705_314_600);

        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.starts_with("\"2024-01-15T10:30:00"));
    }
}
