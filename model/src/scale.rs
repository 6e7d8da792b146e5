use crate::{StationTraffic, TimeFilter};

/// Maps total traffic to a marker radius with a square-root scale, so the marker's area grows
/// linearly with trips.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MagnitudeScale {
    max_total: usize,
    range: (f64, f64),
}

impl MagnitudeScale {
    /// Unfiltered views spread all trips over `[0, 25]`. A single time window has far fewer
    /// trips, so it gets the exaggerated `[3, 50]`.
    pub fn new(stations: &[StationTraffic], filter: TimeFilter) -> Self {
        Self {
            max_total: stations.iter().map(|s| s.total_traffic).max().unwrap_or(0),
            range: if filter.is_filtered() {
                (3.0, 50.0)
            } else {
                (0.0, 25.0)
            },
        }
    }

    pub fn radius(&self, total_traffic: usize) -> f64 {
        let (lo, hi) = self.range;
        if self.max_total == 0 {
            return lo;
        }
        let pct = (total_traffic as f64).sqrt() / (self.max_total as f64).sqrt();
        lo + (hi - lo) * pct
    }
}

/// Whether a station mostly loses bikes, mostly gains them, or neither.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowBalance {
    MostlyArrivals,
    Balanced,
    MostlyDepartures,
}

impl FlowBalance {
    /// Splits `departures / total` into equal thirds; a boundary belongs to the upper level. A
    /// station without traffic is balanced.
    pub fn new(departures: usize, total_traffic: usize) -> Self {
        if total_traffic == 0 {
            return Self::Balanced;
        }
        if 3 * departures < total_traffic {
            Self::MostlyArrivals
        } else if 3 * departures < 2 * total_traffic {
            Self::Balanced
        } else {
            Self::MostlyDepartures
        }
    }

    pub fn of(station: &StationTraffic) -> Self {
        Self::new(station.departures, station.total_traffic)
    }

    /// The discrete level handed to the renderer's style variable
    pub fn level(self) -> f64 {
        match self {
            Self::MostlyArrivals => 0.0,
            Self::Balanced => 0.5,
            Self::MostlyDepartures => 1.0,
        }
    }
}
