use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Milliseconds since the Unix epoch, the encoding Mattermost uses for every
/// `*_at` field.
///
/// The raw value is kept as-is so that values chrono cannot represent still
/// survive a round trip and can be rendered verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TimestampVisitor;

        impl de::Visitor<'_> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("integer milliseconds since the Unix epoch")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Timestamp(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Timestamp)
                    .map_err(|_| E::custom("millisecond timestamp out of range"))
            }

            #[allow(clippy::cast_possible_truncation)]
            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if !value.is_finite() {
                    return Err(E::custom("floating point timestamp is not finite"));
                }
                Ok(Timestamp(value.trunc() as i64))
            }
        }

        deserializer.deserialize_any(TimestampVisitor)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl Timestamp {
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// The instant in the local time zone, or `None` when out of range.
    #[must_use]
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.0).earliest()
    }

    /// Render as local wall-clock time, `YYYY-MM-DD HH:MM:SS` with a
    /// fractional part only when the millisecond component is non-zero.
    /// Values outside chrono's range render as the raw integer.
    #[must_use]
    pub fn to_local_string(&self) -> String {
        match self.to_local() {
            Some(dt) => dt.naive_local().to_string(),
            None => self.0.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Timestamp;
    use chrono::{Local, TimeZone};

    #[test]
    fn deserializes_from_integer_millis() {
        let ts: Timestamp =
            serde_json::from_str("1758887156123").expect("integer timestamps should parse");
        assert_eq!(ts.as_millis(), 1_758_887_156_123);
        assert!(ts.to_local_string().ends_with(".123"));
    }

    #[test]
    fn serializes_back_to_integer_millis() {
        let json = serde_json::to_string(&Timestamp::from_millis(1_600_000_000_000)).expect("serialize");
        assert_eq!(json, "1600000000000");
    }

    #[test]
    fn epoch_zero_renders_as_local_epoch() {
        let expected = Local
            .timestamp_opt(0, 0)
            .earliest()
            .expect("epoch is representable")
            .naive_local()
            .to_string();
        assert_eq!(Timestamp::from_millis(0).to_local_string(), expected);
    }

    #[test]
    fn fraction_only_when_millis_present() {
        let whole = Timestamp::from_millis(1_000).to_local_string();
        let fractional = Timestamp::from_millis(1_250).to_local_string();
        assert!(!whole.contains('.'), "{whole}");
        assert!(fractional.ends_with(".250"), "{fractional}");
    }

    #[test]
    fn out_of_range_renders_raw_value() {
        assert_eq!(Timestamp::from_millis(i64::MAX).to_local_string(), i64::MAX.to_string());
    }
}
