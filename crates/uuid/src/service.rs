//! Internal implementation of the identifier types.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3f";

/// Canonical draft UUID (32 lowercase hex characters, no hyphens).
///
/// Once constructed the contained UUID is guaranteed canonical, so path derivation via
/// [`ShardableUuid::sharded_dir`] is deterministic.
///
/// - [`ShardableUuid::new`] generates a fresh id for a new draft.
/// - [`ShardableUuid::parse`] validates an externally supplied id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShardableUuid(Uuid);

impl Default for ShardableUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardableUuid {
    /// Generates a new random (v4) UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a UUID string that must already be in canonical form.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }

        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid UUID '{}': {}", input, e)))
    }

    /// Returns the inner `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is exactly 32 characters of `0-9a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<uuid>/` where `s1`/`s2` are the first two hex pairs.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for ShardableUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for ShardableUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShardableUuid::parse(s)
    }
}

/// A millisecond timestamp plus a generator sequence number.
///
/// Format:
/// `YYYYMMDDTHHMMSS.mmmZ-<seq>`
///
/// Example:
/// `20261016T093015.120Z-3`
///
/// Ordering is by timestamp, then sequence number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimestampId {
    timestamp: DateTime<Utc>,
    seq: u64,
}

impl TimestampId {
    /// Returns the timestamp component (millisecond precision).
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the sequence component.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Ord for TimestampId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for TimestampId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimestampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Z-{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.seq
        )
    }
}

impl FromStr for TimestampId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts_str, seq_str) = s.split_once('-').ok_or_else(|| {
            UuidError::InvalidInput(format!("Invalid timestamp id format: '{}'", s))
        })?;

        let ts_no_z = ts_str.strip_suffix('Z').ok_or_else(|| {
            UuidError::InvalidInput(format!("Timestamp must end with 'Z': '{}'", ts_str))
        })?;

        let naive = NaiveDateTime::parse_from_str(ts_no_z, TIMESTAMP_FORMAT).map_err(|e| {
            UuidError::InvalidInput(format!("Invalid timestamp format '{}': {}", ts_str, e))
        })?;

        let seq = seq_str.parse::<u64>().map_err(|e| {
            UuidError::InvalidInput(format!("Invalid sequence number '{}': {}", seq_str, e))
        })?;

        Ok(Self {
            timestamp: DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc),
            seq,
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimestampId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimestampId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Produces strictly increasing [`TimestampId`]s.
///
/// Every id has a timestamp strictly greater than the previous one (bumped by 1 ms when the
/// clock has not advanced or has gone backwards) and a sequence number one higher than the
/// previous one. Resuming after the greatest persisted id keeps this true across restarts.
#[derive(Clone, Debug, Default)]
pub struct TimestampIdGenerator {
    last: Option<TimestampId>,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator whose next id sorts after `last`.
    pub fn resume_after(last: Option<TimestampId>) -> Self {
        Self { last }
    }

    /// Returns the most recently issued (or resumed-from) id.
    pub fn last(&self) -> Option<&TimestampId> {
        self.last.as_ref()
    }

    /// Issues the next id using the system clock.
    pub fn next_id(&mut self) -> TimestampId {
        self.next_at(Utc::now())
    }

    /// Issues the next id as if the clock read `now`.
    pub fn next_at(&mut self, now: DateTime<Utc>) -> TimestampId {
        let now = now.trunc_subsecs(3);

        let id = match &self.last {
            Some(prev) => TimestampId {
                timestamp: if now <= prev.timestamp {
                    prev.timestamp + Duration::milliseconds(1)
                } else {
                    now
                },
                seq: prev.seq.saturating_add(1),
            },
            None => TimestampId {
                timestamp: now,
                seq: 1,
            },
        };

        self.last = Some(id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_generates_canonical_uuid() {
        let uuid = ShardableUuid::new();
        assert!(ShardableUuid::is_canonical(&uuid.to_string()));
    }

    #[test]
    fn test_parse_rejects_hyphenated_uuid() {
        let result = ShardableUuid::parse("550e8400-e29b-41d4-a716-446655440000");
        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("32 lowercase hex characters"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_parse_rejects_uppercase_and_wrong_length() {
        assert!(ShardableUuid::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(ShardableUuid::parse("550e8400e29b41d4a71644665544000").is_err());
        assert!(ShardableUuid::parse("").is_err());
    }

    #[test]
    fn test_sharded_dir_structure() {
        let uuid = ShardableUuid::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(
            uuid.sharded_dir(Path::new("/drafts")),
            PathBuf::from("/drafts/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn test_timestamp_id_display_and_parse() {
        let id: TimestampId = "20261016T093015.120Z-3".parse().unwrap();
        assert_eq!(id.seq(), 3);
        assert_eq!(
            id.timestamp(),
            Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 15).unwrap() + Duration::milliseconds(120)
        );
        assert_eq!(id.to_string(), "20261016T093015.120Z-3");
    }

    #[test]
    fn test_timestamp_id_parse_errors() {
        let err = "20261016T093015.120Z".parse::<TimestampId>().expect_err("no seq");
        assert!(matches!(err, UuidError::InvalidInput(msg) if msg.contains("format")));

        let err = "20261016T093015.120-3".parse::<TimestampId>().expect_err("no Z");
        assert!(matches!(err, UuidError::InvalidInput(msg) if msg.contains("must end with 'Z'")));

        let err = "20261399T093015.120Z-3".parse::<TimestampId>().expect_err("bad date");
        assert!(matches!(err, UuidError::InvalidInput(msg) if msg.contains("Invalid timestamp")));

        let err = "20261016T093015.120Z-x".parse::<TimestampId>().expect_err("bad seq");
        assert!(matches!(err, UuidError::InvalidInput(msg) if msg.contains("sequence")));
    }

    #[test]
    fn test_generator_is_strictly_increasing_on_frozen_clock() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let mut generator = TimestampIdGenerator::new();

        let a = generator.next_at(now);
        let b = generator.next_at(now);
        let c = generator.next_at(now - Duration::seconds(30));

        assert!(a < b && b < c);
        assert_ne!(a.to_string(), b.to_string());
        assert_ne!(b.to_string(), c.to_string());
        assert_eq!(c.seq(), 3);
    }

    #[test]
    fn test_generator_truncates_to_milliseconds() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
            + Duration::microseconds(45_678);
        let mut generator = TimestampIdGenerator::new();
        let id = generator.next_at(now);

        let reparsed: TimestampId = id.to_string().parse().unwrap();
        assert_eq!(reparsed, id);
    }

    #[test]
    fn test_resume_after_sorts_after_previous() {
        let previous: TimestampId = "20991231T235959.999Z-41".parse().unwrap();
        let mut generator = TimestampIdGenerator::resume_after(Some(previous.clone()));

        let next = generator.next_id();
        assert!(next > previous);
        assert_eq!(next.seq(), 42);
        assert_eq!(generator.last(), Some(&next));
    }

    #[test]
    fn test_timestamp_id_serde_as_string() {
        let id: TimestampId = "20261016T093015.120Z-3".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"20261016T093015.120Z-3\"");
        let back: TimestampId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
