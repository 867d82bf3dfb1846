//! Millisecond-precision ISO-8601 UTC serialization for `DateTime<Utc>`
//! fields that cross the wire, since chrono's own serde impl preserves
//! whatever sub-second precision the value happens to carry.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

pub fn serialize_millis<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Wrapper {
        #[serde(serialize_with = "serialize_millis")]
        timestamp: DateTime<Utc>,
    }

    #[test]
    fn truncates_to_milliseconds() {
        let timestamp = "2024-01-01T00:00:00.123456789Z".parse().unwrap();
        let wrapper = Wrapper { timestamp };
        let json = serde_json::to_string(&wrapper).unwrap();
        assert_eq!(json, r#"{"timestamp":"2024-01-01T00:00:00.123Z"}"#);
    }
}
