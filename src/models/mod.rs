//! Backend data-transfer records.
//!
//! These mirror the backend's JSON one-to-one. The client never mutates them
//! locally beyond building request payloads.

pub mod chat;
pub mod goal;
pub mod profile;
pub mod task;

pub use chat::{ChatHistory, ChatMessage, ChatRole, CoachChatRequest, CoachReply, HistoryMessage};
pub use goal::{Goal, GoalCreate, GoalType};
pub use profile::{Profile, ProfileUpsert};
pub use task::{TaskCreate, TaskItem};

/// Lenient timestamp decoding.
///
/// The backend emits RFC 3339 timestamps with an offset when it is backed by
/// its database, and naive ISO-8601 timestamps when it runs on its in-memory
/// fallback. Naive values are taken as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => s.serialize_str(&dt.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use chrono::{Datelike, Timelike};

        use super::*;

        #[test]
        fn parses_offset_timestamps() {
            let dt = parse("2025-08-13T15:56:29.123456+02:00").unwrap();
            assert_eq!(dt.hour(), 13);
        }

        #[test]
        fn parses_naive_timestamps_as_utc() {
            let dt = parse("2025-08-13T15:56:29.123456").unwrap();
            assert_eq!(dt.day(), 13);
            assert_eq!(dt.hour(), 15);

            let no_fraction = parse("2025-08-13T15:56:29").unwrap();
            assert_eq!(no_fraction.second(), 29);
        }

        #[test]
        fn rejects_garbage() {
            assert!(parse("yesterday").is_none());
        }
    }
}
