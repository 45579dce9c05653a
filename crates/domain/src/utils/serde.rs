//! Serialization helpers for configuration values

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize/deserialize a `Duration` as whole milliseconds
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use bookline_domain::utils::serde::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     timeout: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::{Deserialize, Deserializer, Duration, Serializer};

    /// Serialize a Duration as milliseconds (u64)
    ///
    /// # Errors
    /// Propagates serializer errors
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    /// Deserialize milliseconds (u64) into a Duration
    ///
    /// # Errors
    /// Returns error if the value is not an unsigned integer
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Timeouts {
        #[serde(with = "duration_millis")]
        popup: Duration,
    }

    #[test]
    fn test_duration_millis_reads_integer_millis() {
        let parsed: Timeouts = serde_json::from_str(r#"{"popup": 120000}"#).unwrap();
        assert_eq!(parsed.popup, Duration::from_secs(120));
    }

    #[test]
    fn test_duration_millis_writes_integer_millis() {
        let json = serde_json::to_string(&Timeouts { popup: Duration::from_millis(1500) }).unwrap();
        assert_eq!(json, r#"{"popup":1500}"#);
    }
}
