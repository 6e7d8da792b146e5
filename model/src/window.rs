use std::ops::Range;

use anyhow::Result;

use tripdata::{MinuteOfDay, MINUTES_PER_DAY};

pub const DEFAULT_RADIUS_MINUTES: usize = 60;

/// Which trips to count. The raw integer form used by the UI slider is `-1` for `Any`, or the
/// minute of day otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeFilter {
    Any,
    Around(MinuteOfDay),
}

impl TimeFilter {
    /// Rejects anything outside `[-1, 1439]` instead of clamping it.
    pub fn from_raw(raw: i32) -> Result<Self> {
        if raw == -1 {
            return Ok(Self::Any);
        }
        if raw < 0 || raw as usize >= MINUTES_PER_DAY {
            bail!("Time filter {raw} is outside [-1, {}]", MINUTES_PER_DAY - 1);
        }
        Ok(Self::Around(MinuteOfDay::new(raw as usize)?))
    }

    pub fn to_raw(self) -> i32 {
        match self {
            Self::Any => -1,
            Self::Around(m) => m.index() as i32,
        }
    }

    /// Accepts the raw integer, "any", or a time of day like "14:30" or "2:30 PM".
    pub fn parse(x: &str) -> Result<Self> {
        let x = x.trim();
        if x.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        if let Ok(raw) = x.parse::<i32>() {
            return Self::from_raw(raw);
        }
        Ok(Self::Around(MinuteOfDay::parse_hm(x)?))
    }

    pub fn label(self) -> String {
        match self {
            Self::Any => "(any time)".to_string(),
            Self::Around(m) => m.ampm_label(),
        }
    }

    pub fn is_filtered(self) -> bool {
        self != Self::Any
    }
}

/// The minute buckets selected by a query, in visiting order. A window crossing midnight is
/// split into two intervals.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeSpec {
    intervals: Vec<Range<usize>>,
}

impl RangeSpec {
    pub fn all() -> Self {
        Self {
            intervals: vec![0..MINUTES_PER_DAY],
        }
    }

    pub fn minutes(&self) -> impl Iterator<Item = usize> + '_ {
        self.intervals.iter().flat_map(|r| r.clone())
    }
}

/// Buckets within `radius_minutes` of the filter's center, as the half-open circular interval
/// `[center - radius, center + radius)`. That's `2 * radius` buckets; the bucket exactly
/// `radius` minutes later is excluded.
pub fn query(filter: TimeFilter, radius_minutes: usize) -> Result<RangeSpec> {
    if radius_minutes == 0 || 2 * radius_minutes >= MINUTES_PER_DAY {
        bail!(
            "Window radius {radius_minutes} must be in [1, {})",
            MINUTES_PER_DAY / 2
        );
    }
    let center = match filter {
        TimeFilter::Any => {
            return Ok(RangeSpec::all());
        }
        TimeFilter::Around(m) => m.index(),
    };

    let lo = (center + MINUTES_PER_DAY - radius_minutes) % MINUTES_PER_DAY;
    let hi = (center + radius_minutes) % MINUTES_PER_DAY;
    let intervals = if lo < hi {
        vec![lo..hi]
    } else if hi == 0 {
        vec![lo..MINUTES_PER_DAY]
    } else {
        vec![lo..MINUTES_PER_DAY, 0..hi]
    };
    Ok(RangeSpec { intervals })
}

/// Like `query`, but straight from the UI's raw integer.
pub fn query_raw(center: i32, radius_minutes: usize) -> Result<RangeSpec> {
    query(TimeFilter::from_raw(center)?, radius_minutes)
}
