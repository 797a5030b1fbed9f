//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Age of this timestamp relative to `now`, in fractional days.
    ///
    /// Timestamps in the future have an age of zero.
    pub fn age_days_at(&self, now: &Timestamp) -> f64 {
        let millis = now.duration_since(self).num_milliseconds().max(0);
        millis as f64 / 86_400_000.0
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Creates a new timestamp by subtracting the specified number of days.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Creates a new timestamp offset by a std duration.
    pub fn plus(&self, duration: std::time::Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Self(self.0 + Duration::milliseconds(millis))
    }

    /// Calendar month (1-12) in UTC.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Creates a timestamp from Unix milliseconds.
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Parses the loose timestamp formats scrapers hand us.
    ///
    /// Accepts RFC 3339, `YYYY-MM-DD`, and numeric Unix time in seconds or
    /// milliseconds. Anything else yields `None`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|dt| Self(dt.and_utc()));
        }
        raw.parse::<i64>().ok().and_then(Self::from_unix_number)
    }

    /// Interprets a Unix number as seconds or milliseconds by magnitude.
    fn from_unix_number(value: i64) -> Option<Self> {
        if value.abs() >= 100_000_000_000 {
            Self::from_unix_millis(value)
        } else {
            Self::from_unix_millis(value.checked_mul(1000)?)
        }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

/// Deserializes an optional timestamp without failing on malformed input.
///
/// Strings go through [`Timestamp::parse_lenient`], numbers are treated as
/// Unix time. Unparseable values become `None` so that one bad record does
/// not sink a whole ingestion batch.
pub fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Timestamp::parse_lenient(&s),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(Timestamp::from_unix_number),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn parse_lenient_accepts_rfc3339() {
        let ts = Timestamp::parse_lenient("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(ts.as_datetime().year(), 2024);
        assert_eq!(ts.as_datetime().hour(), 10);
    }

    #[test]
    fn parse_lenient_accepts_plain_date() {
        let ts = Timestamp::parse_lenient("2024-03-02").unwrap();
        assert_eq!(ts.month(), 3);
    }

    #[test]
    fn parse_lenient_accepts_unix_seconds_and_millis() {
        let secs = Timestamp::parse_lenient("1705276800").unwrap();
        let millis = Timestamp::parse_lenient("1705276800000").unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn parse_lenient_rejects_garbage() {
        assert!(Timestamp::parse_lenient("yesterday-ish").is_none());
        assert!(Timestamp::parse_lenient("").is_none());
    }

    #[test]
    fn age_days_is_zero_for_future_timestamps() {
        let now = Timestamp::now();
        assert_eq!(now.add_days(3).age_days_at(&now), 0.0);
        assert!((now.minus_days(2).age_days_at(&now) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn plus_adds_std_duration() {
        let ts = Timestamp::from_unix_millis(1_000).unwrap();
        let later = ts.plus(std::time::Duration::from_secs(60));
        assert_eq!(later.as_unix_millis(), 61_000);
    }

    #[test]
    fn lenient_deserializer_maps_malformed_to_none() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
            at: Option<Timestamp>,
        }

        let ok: Holder = serde_json::from_str(r#"{"at": "2024-01-15T10:30:00Z"}"#).unwrap();
        assert!(ok.at.is_some());
        let numeric: Holder = serde_json::from_str(r#"{"at": 1705276800}"#).unwrap();
        assert!(numeric.at.is_some());
        let bad: Holder = serde_json::from_str(r#"{"at": "not a date"}"#).unwrap();
        assert!(bad.at.is_none());
        let missing: Holder = serde_json::from_str("{}").unwrap();
        assert!(missing.at.is_none());
    }

    #[test]
    fn timestamp_ordering_works() {
        let ts1 = Timestamp::from_unix_millis(1_000).unwrap();
        let ts2 = Timestamp::from_unix_millis(2_000).unwrap();
        assert!(ts1 < ts2);
        assert!(ts1.is_before(&ts2));
        assert!(ts2.is_after(&ts1));
    }
}
