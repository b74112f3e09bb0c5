/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! The two fixed UTC timestamp formats SigV4 uses: `YYYYMMDD` for scopes and
//! `YYYYMMDD'T'HHMMSS'Z'` for signing times.

use std::time::SystemTime;
use time::OffsetDateTime;

/// Format time as `YYYYMMDD'T'HHMMSS'Z'`.
pub(crate) fn format_date_time(time: SystemTime) -> String {
    let time = OffsetDateTime::from(time);
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
        time.year(),
        u8::from(time.month()),
        time.day(),
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// Format time as `YYYYMMDD`.
pub(crate) fn format_date(time: SystemTime) -> String {
    let time = OffsetDateTime::from(time);
    format!(
        "{:04}{:02}{:02}",
        time.year(),
        u8::from(time.month()),
        time.day()
    )
}

#[cfg(test)]
pub(crate) mod test {
    use super::{format_date, format_date_time};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    /// 2015-08-30T12:36:00Z, the timestamp used by the SigV4 test suite.
    pub(crate) fn test_suite_time() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1440938160)
    }

    #[test]
    fn date_time_format() {
        assert_eq!(format_date_time(test_suite_time()), "20150830T123600Z");
    }

    #[test]
    fn date_format() {
        assert_eq!(format_date(test_suite_time()), "20150830");
    }
}
