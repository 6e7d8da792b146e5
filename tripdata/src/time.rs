use std::fmt;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: usize = 1440;

/// A wall-clock time with minute precision, ignoring the date. Always in `[0, 1440)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub const MIDNIGHT: MinuteOfDay = MinuteOfDay(0);

    pub fn new(minute: usize) -> Result<Self> {
        if minute >= MINUTES_PER_DAY {
            bail!("{minute} isn't a minute of the day");
        }
        Ok(Self(minute as u16))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if hour >= 24 || minute >= 60 {
            bail!("{hour}:{minute:02} isn't a time of day");
        }
        Self::new((hour * 60 + minute) as usize)
    }

    /// Seconds are dropped, not rounded.
    pub fn from_time(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn hour(self) -> u32 {
        (self.0 / 60) as u32
    }

    pub fn minute(self) -> u32 {
        (self.0 % 60) as u32
    }

    /// Like "2:30 PM"
    pub fn ampm_label(self) -> String {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0)
            .unwrap()
            .format("%-I:%M %p")
            .to_string()
    }

    /// Parses "14:30" or "2:30 PM"
    pub fn parse_hm(x: &str) -> Result<Self> {
        let x = x.trim();
        for fmt in ["%H:%M", "%I:%M %p", "%I:%M%p"] {
            if let Ok(t) = NaiveTime::parse_from_str(x, fmt) {
                return Ok(Self::from_time(t));
            }
        }
        bail!("Can't parse time of day {x:?}")
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour(), self.minute())
    }
}

/// Resolves a raw trip timestamp to its minute of day. The date and any seconds are ignored.
/// Timestamps with an explicit UTC offset use the wall-clock time in that offset.
pub fn parse_timestamp(raw: &str) -> Result<MinuteOfDay> {
    let raw = raw.trim();
    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(MinuteOfDay::from_time(dt.time()));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(MinuteOfDay::from_time(dt.naive_local().time()));
    }
    bail!("Can't parse timestamp {raw:?}")
}
