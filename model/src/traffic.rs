use abstutil::Counter;
use anyhow::Result;

use tripdata::{Station, StationID};

use crate::{query, MinuteBucketIndex, TimeFilter};

/// A station along with the traffic from the last aggregation. The counts are a cache, always
/// overwritten wholesale by `aggregate`.
#[derive(Clone)]
pub struct StationTraffic {
    pub station: Station,
    pub departures: usize,
    pub arrivals: usize,
    pub total_traffic: usize,
}

impl StationTraffic {
    pub fn new(station: Station) -> Self {
        Self {
            station,
            departures: 0,
            arrivals: 0,
            total_traffic: 0,
        }
    }

    /// Like "12 trips (5 departures, 7 arrivals)"
    pub fn describe(&self) -> String {
        format!(
            "{} trips ({} departures, {} arrivals)",
            self.total_traffic, self.departures, self.arrivals
        )
    }
}

/// Per-station tallies within one time window. Stations that never appear count as zero.
pub struct TrafficCounts {
    pub departures: Counter<StationID>,
    pub arrivals: Counter<StationID>,
}

/// Tallies trips in the window by station, touching only the window's buckets.
pub fn count_traffic(
    index: &MinuteBucketIndex,
    filter: TimeFilter,
    radius_minutes: usize,
) -> Result<TrafficCounts> {
    let range = query(filter, radius_minutes)?;

    let mut departures = Counter::new();
    for trip in index.departures_in_range(&range) {
        if let Some(station) = trip.start_station {
            departures.inc(station);
        }
    }
    let mut arrivals = Counter::new();
    for trip in index.arrivals_in_range(&range) {
        if let Some(station) = trip.end_station {
            arrivals.inc(station);
        }
    }
    Ok(TrafficCounts {
        departures,
        arrivals,
    })
}

/// Overwrites the traffic of every station with the counts for this filter. Stations with no
/// trips in the window get zeroes; trips to stations not in the list are ignored.
pub fn aggregate(
    index: &MinuteBucketIndex,
    stations: &mut [StationTraffic],
    filter: TimeFilter,
    radius_minutes: usize,
) -> Result<()> {
    let counts = count_traffic(index, filter, radius_minutes)?;
    for s in stations {
        s.departures = counts.departures.get(s.station.id);
        s.arrivals = counts.arrivals.get(s.station.id);
        s.total_traffic = s.departures + s.arrivals;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use geom::LonLat;
    use tripdata::{orig, MinuteOfDay, Trip, TripID};

    use super::*;
    use crate::IndexBuilder;

    fn station(id: usize, name: &str) -> StationTraffic {
        StationTraffic::new(Station {
            id: StationID(id),
            orig_id: orig::StationID(name.to_string()),
            pos: LonLat::new(-73.9, 40.7),
            name: None,
        })
    }

    fn trip(start: usize, end: usize, started: usize, ended: usize) -> Trip {
        Trip {
            id: TripID(0),
            start_station: Some(StationID(start)),
            end_station: Some(StationID(end)),
            started_at: MinuteOfDay::new(started).unwrap(),
            ended_at: MinuteOfDay::new(ended).unwrap(),
        }
    }

    fn build(trips: Vec<Trip>) -> MinuteBucketIndex {
        let mut builder = IndexBuilder::new();
        for t in trips {
            builder.insert(t);
        }
        builder.finish()
    }

    fn summary(stations: &[StationTraffic]) -> Vec<(usize, usize, usize)> {
        stations
            .iter()
            .map(|s| (s.departures, s.arrivals, s.total_traffic))
            .collect()
    }

    #[test]
    fn test_two_station_round_trip() {
        let index = build(vec![trip(0, 1, 100, 115), trip(1, 0, 200, 230)]);
        let mut stations = vec![station(0, "A"), station(1, "B")];
        aggregate(&index, &mut stations, TimeFilter::Any, 60).unwrap();
        assert_eq!(summary(&stations), vec![(1, 1, 2), (1, 1, 2)]);
        assert_eq!(stations[0].describe(), "2 trips (1 departures, 1 arrivals)");
    }

    #[test]
    fn test_unfiltered_total_is_twice_the_trips() {
        let mut trips = Vec::new();
        for i in 0..300 {
            trips.push(trip(i % 4, (i + 1) % 4, (i * 13) % 1440, (i * 13 + 17) % 1440));
        }
        let index = build(trips);
        let mut stations: Vec<StationTraffic> =
            (0..4).map(|i| station(i, &i.to_string())).collect();
        aggregate(&index, &mut stations, TimeFilter::Any, 60).unwrap();
        let total: usize = stations.iter().map(|s| s.total_traffic).sum();
        assert_eq!(total, 600);
    }

    #[test]
    fn test_window_and_unknown_stations() {
        let index = build(vec![
            // Departs inside the window, arrives after it
            trip(0, 1, 480, 560),
            // Entirely before the window
            trip(1, 0, 100, 120),
            // From a station nobody knows about
            trip(9, 0, 490, 500),
        ]);
        let mut stations = vec![station(0, "A"), station(1, "B"), station(2, "C")];
        let filter = TimeFilter::from_raw(500).unwrap();
        aggregate(&index, &mut stations, filter, 60).unwrap();
        assert_eq!(summary(&stations), vec![(1, 1, 2), (0, 0, 0), (0, 0, 0)]);
    }

    #[test]
    fn test_aggregate_overwrites_and_is_idempotent() {
        let index = build(vec![trip(0, 1, 100, 115), trip(1, 0, 900, 930)]);
        let mut stations = vec![station(0, "A"), station(1, "B")];

        let morning = TimeFilter::from_raw(100).unwrap();
        aggregate(&index, &mut stations, morning, 60).unwrap();
        let first = summary(&stations);
        aggregate(&index, &mut stations, morning, 60).unwrap();
        assert_eq!(summary(&stations), first);
        assert_eq!(first, vec![(1, 0, 1), (0, 1, 1)]);

        // Nothing from the morning lingers
        aggregate(&index, &mut stations, TimeFilter::from_raw(915).unwrap(), 60).unwrap();
        assert_eq!(summary(&stations), vec![(0, 1, 1), (1, 0, 1)]);
    }

    #[test]
    fn test_count_traffic_skips_missing_stations() {
        let mut t = trip(0, 1, 100, 115);
        t.start_station = None;
        let index = build(vec![t]);
        let counts = count_traffic(&index, TimeFilter::Any, 60).unwrap();
        assert_eq!(counts.departures.get(StationID(0)), 0);
        assert_eq!(counts.arrivals.get(StationID(1)), 1);
    }
}
