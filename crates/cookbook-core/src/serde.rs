// Module name shadows the `serde` crate — use `::serde` for the external crate.
use ::serde::Serializer;
use chrono::{DateTime, SecondsFormat, Utc};

/// Serialize `DateTime<Utc>` as RFC 3339 with 3-digit fractional seconds.
pub fn to_rfc3339_ms<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::serde::Serialize;
    use chrono::TimeZone;

    #[derive(Serialize)]
    struct Wrapper {
        #[serde(serialize_with = "to_rfc3339_ms")]
        at: DateTime<Utc>,
    }

    #[test]
    fn should_serialize_datetime_as_rfc3339_with_millis() {
        let wrapper = Wrapper {
            at: Utc.with_ymd_and_hms(2026, 8, 25, 11, 9, 0).unwrap(),
        };
        let json = serde_json::to_string(&wrapper).unwrap();
        assert_eq!(json, r#"{"at":"2026-08-25T11:09:00.000Z"}"#);
    }

    #[test]
    fn should_truncate_sub_millisecond_precision() {
        let wrapper = Wrapper {
            at: Utc.timestamp_nanos(1_700_000_000_123_456_789),
        };
        let json = serde_json::to_string(&wrapper).unwrap();
        assert!(json.contains(".123Z"));
    }
}
