/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Core data types for the Oxbow SDK, shared by every service client.

pub mod retry;

use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Binary data. On the wire, blobs are base64 encoded strings.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Blob {
    inner: Vec<u8>,
}

impl Blob {
    pub fn new(inp: impl Into<Vec<u8>>) -> Self {
        Blob { inner: inp.into() }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl Serialize for Blob {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&base64::encode(&self.inner))
    }
}

struct BlobVisitor;

impl<'de> Visitor<'de> for BlobVisitor {
    type Value = Blob;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a base64 encoded string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        base64::decode(v)
            .map(Blob::new)
            .map_err(|_| serde::de::Error::invalid_value(serde::de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for Blob {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(BlobVisitor)
    }
}

/// A point in time, stored with nanosecond precision as an offset from the
/// Unix epoch. On the wire, timestamps are fractional epoch seconds.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct DateTime {
    seconds: i64,
    subsecond_nanos: u32,
}

impl DateTime {
    pub fn from_secs(epoch_seconds: i64) -> Self {
        DateTime {
            seconds: epoch_seconds,
            subsecond_nanos: 0,
        }
    }

    /// Construct a `DateTime` from whole epoch seconds plus a fraction in
    /// the range `[0, 1)`.
    pub fn from_fractional_secs(epoch_seconds: i64, fraction: f64) -> Self {
        let subsecond_nanos = (fraction * NANOS_PER_SECOND as f64) as u32;
        DateTime {
            seconds: epoch_seconds,
            subsecond_nanos,
        }
    }

    pub fn from_secs_f64(epoch_seconds: f64) -> Self {
        let seconds = epoch_seconds.floor();
        DateTime::from_fractional_secs(seconds as i64, epoch_seconds - seconds)
    }

    pub fn secs(&self) -> i64 {
        self.seconds
    }

    pub fn subsec_nanos(&self) -> u32 {
        self.subsecond_nanos
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.subsecond_nanos as f64 / NANOS_PER_SECOND as f64
    }
}

impl From<SystemTime> for DateTime {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(offset) => DateTime {
                seconds: offset.as_secs() as i64,
                subsecond_nanos: offset.subsec_nanos(),
            },
            Err(earlier) => {
                let offset = earlier.duration();
                if offset.subsec_nanos() == 0 {
                    DateTime {
                        seconds: -(offset.as_secs() as i64),
                        subsecond_nanos: 0,
                    }
                } else {
                    // carry the fractional part so that nanos stay in [0, 1s)
                    DateTime {
                        seconds: -(offset.as_secs() as i64) - 1,
                        subsecond_nanos: NANOS_PER_SECOND - offset.subsec_nanos(),
                    }
                }
            }
        }
    }
}

impl From<DateTime> for SystemTime {
    fn from(date_time: DateTime) -> Self {
        if date_time.seconds >= 0 {
            UNIX_EPOCH + Duration::new(date_time.seconds as u64, date_time.subsecond_nanos)
        } else {
            UNIX_EPOCH - Duration::new((-date_time.seconds) as u64, 0)
                + Duration::new(0, date_time.subsecond_nanos)
        }
    }
}

impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_secs_f64())
    }
}

struct DateTimeVisitor;

impl<'de> Visitor<'de> for DateTimeVisitor {
    type Value = DateTime;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("fractional seconds since the Unix epoch")
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DateTime::from_secs_f64(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DateTime::from_secs(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DateTime::from_secs(v as i64))
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_f64(DateTimeVisitor)
    }
}

/// Generic error data extracted from an error response.
///
/// Service clients fall back to this type when a response carries an error
/// code they have no modeled variant for.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Error {
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
}

impl Error {
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fmt = f.debug_struct("Error");
        if let Some(code) = &self.code {
            fmt.field("code", code);
        }
        if let Some(message) = &self.message {
            fmt.field("message", message);
        }
        if let Some(request_id) = &self.request_id {
            fmt.field("request_id", request_id);
        }
        fmt.finish()
    }
}

impl std::error::Error for Error {}

impl retry::ProvideErrorKind for Error {
    fn retryable_error_kind(&self) -> Option<retry::ErrorKind> {
        None
    }

    fn code(&self) -> Option<&str> {
        Error::code(self)
    }
}

#[cfg(test)]
mod test {
    use crate::{Blob, DateTime};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    #[test]
    fn blob_serializes_as_base64() {
        let blob = Blob::new("hello world");
        assert_eq!(
            serde_json::to_string(&blob).unwrap(),
            "\"aGVsbG8gd29ybGQ=\""
        );
    }

    #[test]
    fn blob_deserializes_from_base64() {
        let blob: Blob = serde_json::from_str("\"aGVsbG8gd29ybGQ=\"").unwrap();
        assert_eq!(blob.as_ref(), b"hello world");
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let result = serde_json::from_str::<Blob>("\"this is not base64!!\"");
        assert!(result.is_err());
    }

    #[test]
    fn date_time_from_fractional_seconds() {
        let date_time = DateTime::from_fractional_secs(1, 0.5);
        assert_eq!(date_time.secs(), 1);
        assert_eq!(date_time.subsec_nanos(), 500_000_000);
    }

    #[test]
    fn date_time_roundtrips_through_system_time() {
        let time = UNIX_EPOCH + Duration::new(1440938160, 123_000_000);
        let date_time = DateTime::from(time);
        assert_eq!(date_time.secs(), 1440938160);
        assert_eq!(date_time.subsec_nanos(), 123_000_000);
        assert_eq!(SystemTime::from(date_time), time);
    }

    #[test]
    fn pre_epoch_date_time() {
        let time = UNIX_EPOCH - Duration::new(1, 250_000_000);
        let date_time = DateTime::from(time);
        assert_eq!(date_time.secs(), -2);
        assert_eq!(date_time.subsec_nanos(), 750_000_000);
        assert_eq!(SystemTime::from(date_time), time);
    }

    #[test]
    fn date_time_wire_format_is_fractional() {
        let date_time = DateTime::from_fractional_secs(1440938160, 0.123);
        let serialized = serde_json::to_string(&date_time).unwrap();
        let parsed: DateTime = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed.secs(), 1440938160);
        // float roundtrip keeps millisecond precision
        assert!((parsed.subsec_nanos() as i64 - 123_000_000).abs() < 1_000);
    }
}
