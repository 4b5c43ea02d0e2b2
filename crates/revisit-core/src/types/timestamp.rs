// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::types::date::Date;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Milliseconds since the epoch of `9999-12-31T23:59:59.999Z`. Later instants
/// would format with a signed five-digit year, which RFC 3339 can't parse.
const LATEST_MILLIS: i64 = 253_402_300_799_999;

/// A UTC timestamp with millisecond precision.
///
/// Timestamps are parsed from RFC 3339 strings with any offset and normalized
/// to UTC, so the date component is always the UTC calendar date. Instants
/// after year 9999 are clamped to [`Timestamp::latest`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(3).min(latest_instant()))
    }

    /// The latest timestamp that survives a round trip through its string
    /// form.
    pub fn latest() -> Self {
        Self(latest_instant())
    }

    /// The current timestamp.
    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// The UTC date component of this timestamp.
    pub fn date(self) -> Date {
        Date::new(self.0.date_naive())
    }

    /// This timestamp moved forward by a number of days. Saturates at
    /// [`Timestamp::latest`].
    pub fn plus_days(self, days: u32) -> Self {
        let shifted = self
            .0
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or_else(latest_instant);
        Self::new(shifted)
    }
}

fn latest_instant() -> DateTime<Utc> {
    DateTime::<Utc>::default() + Duration::milliseconds(LATEST_MILLIS)
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let dt = DateTime::parse_from_rfc3339(&value)
            .map_err(|_| ErrorReport::new(format!("Failed to parse timestamp: '{value}'.")))?;
        Ok(Timestamp::new(dt.with_timezone(&Utc)))
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> String {
        ts.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use chrono::TimeZone;

    use super::*;
    use crate::error::Fallible;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_timestamp_to_string() {
        let dt = Utc.with_ymd_and_hms(2023, 10, 5, 14, 30, 15).unwrap();
        assert_eq!(Timestamp::new(dt).to_string(), "2023-10-05T14:30:15.000Z");
    }

    #[test]
    fn test_truncates_to_milliseconds() {
        let dt = Utc.with_ymd_and_hms(2023, 10, 5, 14, 30, 15).unwrap()
            + Duration::nanoseconds(123_456_789);
        assert_eq!(Timestamp::new(dt).to_string(), "2023-10-05T14:30:15.123Z");
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        let t = ts("2025-07-06T01:30:00.000+02:00");
        assert_eq!(t.to_string(), "2025-07-05T23:30:00.000Z");
        assert_eq!(
            t.date(),
            Date::new(NaiveDate::from_ymd_opt(2025, 7, 5).unwrap())
        );
    }

    #[test]
    fn test_serde() -> Fallible<()> {
        let t = ts("2023-10-05T14:30:15.123Z");
        let serialized = serde_json::to_string(&t)?;
        assert_eq!(serialized, "\"2023-10-05T14:30:15.123Z\"");
        let deserialized: Timestamp = serde_json::from_str(&serialized)?;
        assert_eq!(deserialized, t);
        Ok(())
    }

    #[test]
    fn test_invalid_timestamp() {
        assert!(Timestamp::try_from("2023-10-05 14:30".to_string()).is_err());
    }

    #[test]
    fn test_plus_days() {
        let t = ts("2025-02-27T10:00:00.000Z");
        assert_eq!(t.plus_days(2).to_string(), "2025-03-01T10:00:00.000Z");
        assert_eq!(t.plus_days(0), t);
    }

    #[test]
    fn test_plus_days_saturates() {
        let t = ts("2025-02-27T10:00:00.000Z");
        let far = t.plus_days(u32::MAX);
        assert!(far > t);
        assert_eq!(far, Timestamp::latest());
        assert_eq!(far.to_string(), "9999-12-31T23:59:59.999Z");
    }

    #[test]
    fn test_far_future_round_trips() -> Fallible<()> {
        let t = ts("2025-02-27T10:00:00.000Z");
        for days in [3_000_000, 8_144_639, u32::MAX] {
            let far = t.plus_days(days);
            let parsed = Timestamp::try_from(String::from(far))?;
            assert_eq!(parsed, far);
        }
        Ok(())
    }

    #[test]
    fn test_new_clamps_to_latest() {
        let t = Timestamp::new(DateTime::<Utc>::MAX_UTC);
        assert_eq!(t, Timestamp::latest());
        assert_eq!(t.date().to_string(), "9999-12-31");
    }
}
