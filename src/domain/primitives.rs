//! Domain primitives: TimeMs, Address, DateKey.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Get the underlying milliseconds value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// Error returned when a wallet address fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid wallet address: {0}")]
pub struct AddressParseError(pub String);

/// Wallet address (0x-prefixed, 40 hex digits).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Validate and construct an Address.
    ///
    /// # Errors
    /// Returns an error unless the input is `0x` followed by 40 hex digits.
    pub fn parse(input: &str) -> Result<Self, AddressParseError> {
        let hex_part = input
            .strip_prefix("0x")
            .ok_or_else(|| AddressParseError(input.to_string()))?;
        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressParseError(input.to_string()));
        }
        Ok(Address(input.to_string()))
    }

    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC calendar day in `YYYY-MM-DD` form, the daily-bucket key.
///
/// Ordering is chronological, so sorted buckets are sorted by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wrap a NaiveDate.
    pub fn new(date: NaiveDate) -> Self {
        DateKey(date)
    }

    /// Parse a strict `YYYY-MM-DD` string.
    ///
    /// # Errors
    /// Returns an error for any other shape, including non-zero-padded parts.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        // chrono accepts unpadded month/day; the API contract does not.
        if s.len() != 10 {
            return NaiveDate::parse_from_str("", "%Y-%m-%d").map(DateKey);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(DateKey)
    }

    /// The UTC calendar day containing the given timestamp.
    ///
    /// Returns None for timestamps outside chrono's representable range.
    pub fn from_ms(time: TimeMs) -> Option<Self> {
        chrono::DateTime::from_timestamp_millis(time.as_i64()).map(|dt| DateKey(dt.date_naive()))
    }

    /// The current UTC calendar day.
    pub fn today_utc() -> Self {
        DateKey(Utc::now().date_naive())
    }

    /// The next calendar day, if representable.
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(DateKey)
    }

    /// The day `days` before this one, if representable.
    pub fn minus_days(&self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(chrono::Days::new(days)).map(DateKey)
    }

    /// Number of days from self through `end` inclusive. Negative if `end < self`.
    pub fn days_through(&self, end: DateKey) -> i64 {
        (end.0 - self.0).num_days() + 1
    }

    /// Midnight UTC at the start of this day.
    pub fn start_of_day_ms(&self) -> TimeMs {
        TimeMs::new(self.0.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
    }

    /// The last millisecond of this day.
    pub fn end_of_day_ms(&self) -> TimeMs {
        TimeMs::new(self.start_of_day_ms().as_i64() + 86_400_000 - 1)
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_valid() {
        let addr = Address::parse("0x00000000000000000000000000000000000123ab").unwrap();
        assert_eq!(addr.as_str(), "0x00000000000000000000000000000000000123ab");
    }

    #[test]
    fn test_address_parse_rejects_bad_inputs() {
        assert!(Address::parse("123abc").is_err());
        assert!(Address::parse("0x123").is_err());
        assert!(Address::parse("0x00000000000000000000000000000000000123zz").is_err());
    }

    #[test]
    fn test_datekey_parse_and_display() {
        let key = DateKey::parse("2024-01-02").unwrap();
        assert_eq!(key.to_string(), "2024-01-02");
        assert!(DateKey::parse("2024-1-2").is_err());
        assert!(DateKey::parse("not-a-date").is_err());
    }

    #[test]
    fn test_datekey_from_ms_is_utc() {
        // 2024-01-02T23:59:59.999Z
        let key = DateKey::from_ms(TimeMs::new(1_704_239_999_999)).unwrap();
        assert_eq!(key.to_string(), "2024-01-02");
        // One millisecond later rolls the day over.
        let key = DateKey::from_ms(TimeMs::new(1_704_240_000_000)).unwrap();
        assert_eq!(key.to_string(), "2024-01-03");
    }

    #[test]
    fn test_datekey_succ_and_ordering() {
        let a = DateKey::parse("2024-01-31").unwrap();
        let b = a.succ().unwrap();
        assert_eq!(b.to_string(), "2024-02-01");
        assert!(a < b);
    }

    #[test]
    fn test_datekey_days_through() {
        let start = DateKey::parse("2024-01-01").unwrap();
        let end = DateKey::parse("2024-01-03").unwrap();
        assert_eq!(start.days_through(end), 3);
        assert_eq!(start.days_through(start), 1);
    }

    #[test]
    fn test_datekey_day_bounds() {
        let key = DateKey::parse("2024-01-02").unwrap();
        assert_eq!(key.start_of_day_ms().as_i64(), 1_704_153_600_000);
        assert_eq!(key.end_of_day_ms().as_i64(), 1_704_239_999_999);
    }

    #[test]
    fn test_datekey_serializes_as_string() {
        let key = DateKey::parse("2024-01-02").unwrap();
        assert_eq!(serde_json::to_value(key).unwrap(), "2024-01-02");
    }
}
