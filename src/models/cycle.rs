//! Evaluation cycles (candle intervals)

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Cycle {
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    OneDay,
    OneWeek,
    OneMonth,
}

impl Cycle {
    pub const ALL: [Cycle; 8] = [
        Cycle::FiveMinutes,
        Cycle::FifteenMinutes,
        Cycle::ThirtyMinutes,
        Cycle::OneHour,
        Cycle::FourHours,
        Cycle::OneDay,
        Cycle::OneWeek,
        Cycle::OneMonth,
    ];

    /// Interval label as used by the exchange and in alert headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Cycle::FiveMinutes => "5m",
            Cycle::FifteenMinutes => "15m",
            Cycle::ThirtyMinutes => "30m",
            Cycle::OneHour => "1h",
            Cycle::FourHours => "4h",
            Cycle::OneDay => "1d",
            Cycle::OneWeek => "1w",
            Cycle::OneMonth => "1M",
        }
    }

    /// Nominal length of one cycle. A month counts as 30 days.
    pub fn duration(&self) -> Duration {
        const MINUTE: u64 = 60;
        const HOUR: u64 = 60 * MINUTE;
        const DAY: u64 = 24 * HOUR;
        let secs = match self {
            Cycle::FiveMinutes => 5 * MINUTE,
            Cycle::FifteenMinutes => 15 * MINUTE,
            Cycle::ThirtyMinutes => 30 * MINUTE,
            Cycle::OneHour => HOUR,
            Cycle::FourHours => 4 * HOUR,
            Cycle::OneDay => DAY,
            Cycle::OneWeek => 7 * DAY,
            Cycle::OneMonth => 30 * DAY,
        };
        Duration::from_secs(secs)
    }

    /// Open time of the candle following one that opened at `open_time`.
    ///
    /// Months follow the calendar, every other cycle its fixed length.
    pub fn next_open(&self, open_time: DateTime<Utc>) -> DateTime<Utc> {
        let nominal = chrono::Duration::from_std(self.duration()).unwrap_or(chrono::Duration::zero());
        match self {
            Cycle::OneMonth => open_time
                .checked_add_months(Months::new(1))
                .unwrap_or(open_time + nominal),
            _ => open_time + nominal,
        }
    }

    /// Cron expression (sec min hour dom month dow) firing on each cycle boundary, UTC.
    pub fn cron_expression(&self) -> &'static str {
        match self {
            Cycle::FiveMinutes => "0 */5 * * * *",
            Cycle::FifteenMinutes => "0 */15 * * * *",
            Cycle::ThirtyMinutes => "0 */30 * * * *",
            Cycle::OneHour => "0 0 * * * *",
            Cycle::FourHours => "0 0 */4 * * *",
            Cycle::OneDay => "0 0 0 * * *",
            Cycle::OneWeek => "0 0 0 * * Mon",
            Cycle::OneMonth => "0 0 0 1 * *",
        }
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cycle::ALL
            .iter()
            .find(|c| c.as_str() == s.trim())
            .copied()
            .ok_or_else(|| format!("unsupported cycle '{}'", s))
    }
}

impl TryFrom<String> for Cycle {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cycle> for String {
    fn from(cycle: Cycle) -> Self {
        cycle.as_str().to_string()
    }
}
