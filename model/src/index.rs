use tripdata::{MinuteOfDay, Trip, TripID, MINUTES_PER_DAY};

use crate::RangeSpec;

/// Every trip, bucketed by the minute of day it starts (departures) and ends (arrivals). Each
/// trip is in exactly one bucket of each. Built once through `IndexBuilder` and read-only after.
pub struct MinuteBucketIndex {
    // Indexed by TripID
    trips: Vec<Trip>,
    departures: Vec<Vec<TripID>>,
    arrivals: Vec<Vec<TripID>>,
}

pub struct IndexBuilder {
    index: MinuteBucketIndex,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            index: MinuteBucketIndex::empty(),
        }
    }

    /// Trips must arrive with dense IDs in order, which is how `tripdata::load_trips` hands
    /// them out.
    pub fn insert(&mut self, trip: Trip) {
        let id = TripID(self.index.trips.len());
        if trip.id != id {
            warn!("Renumbering {:?} to {:?} in the index", trip.id, id);
        }
        self.index.departures[trip.started_at.index()].push(id);
        self.index.arrivals[trip.ended_at.index()].push(id);
        self.index.trips.push(Trip { id, ..trip });
    }

    pub fn finish(self) -> MinuteBucketIndex {
        self.index
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MinuteBucketIndex {
    pub fn empty() -> Self {
        Self {
            trips: Vec::new(),
            departures: vec![Vec::new(); MINUTES_PER_DAY],
            arrivals: vec![Vec::new(); MINUTES_PER_DAY],
        }
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn trip(&self, id: TripID) -> &Trip {
        &self.trips[id.0]
    }

    pub fn departures_at(&self, minute: MinuteOfDay) -> &[TripID] {
        &self.departures[minute.index()]
    }

    pub fn arrivals_at(&self, minute: MinuteOfDay) -> &[TripID] {
        &self.arrivals[minute.index()]
    }

    /// All trips starting in any of the buckets
    pub fn departures_in_range<'a>(
        &'a self,
        range: &'a RangeSpec,
    ) -> impl Iterator<Item = &'a Trip> + 'a {
        range
            .minutes()
            .flat_map(move |m| self.departures[m].iter().map(move |id| &self.trips[id.0]))
    }

    /// All trips ending in any of the buckets
    pub fn arrivals_in_range<'a>(
        &'a self,
        range: &'a RangeSpec,
    ) -> impl Iterator<Item = &'a Trip> + 'a {
        range
            .minutes()
            .flat_map(move |m| self.arrivals[m].iter().map(move |id| &self.trips[id.0]))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tripdata::StationID;

    use super::*;
    use crate::{query, TimeFilter};

    fn trip(id: usize, start: usize, end: usize, started: usize, ended: usize) -> Trip {
        Trip {
            id: TripID(id),
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

    #[test]
    fn test_partition() {
        let mut trips = Vec::new();
        for i in 0..500 {
            trips.push(trip(i, i % 7, i % 5, (i * 37) % 1440, (i * 37 + 23) % 1440));
        }
        let index = build(trips.clone());
        assert_eq!(index.len(), 500);

        let mut seen_departures: BTreeMap<TripID, usize> = BTreeMap::new();
        let mut seen_arrivals: BTreeMap<TripID, usize> = BTreeMap::new();
        for m in 0..MINUTES_PER_DAY {
            let minute = MinuteOfDay::new(m).unwrap();
            for id in index.departures_at(minute) {
                assert_eq!(index.trip(*id).started_at, minute);
                *seen_departures.entry(*id).or_insert(0) += 1;
            }
            for id in index.arrivals_at(minute) {
                assert_eq!(index.trip(*id).ended_at, minute);
                *seen_arrivals.entry(*id).or_insert(0) += 1;
            }
        }
        assert_eq!(seen_departures.len(), 500);
        assert_eq!(seen_arrivals.len(), 500);
        assert!(seen_departures.values().all(|n| *n == 1));
        assert!(seen_arrivals.values().all(|n| *n == 1));

        // And the unfiltered range hands back exactly the input
        let all = query(TimeFilter::Any, 60).unwrap();
        let mut departures: Vec<Trip> = index.departures_in_range(&all).cloned().collect();
        departures.sort_by_key(|t| t.id);
        assert_eq!(departures, trips);
        assert_eq!(index.arrivals_in_range(&all).count(), 500);
    }

    #[test]
    fn test_window_only_sees_its_buckets() {
        let index = build(vec![
            trip(0, 0, 1, 1420, 5),
            trip(1, 0, 1, 100, 200),
            trip(2, 0, 1, 89, 91),
        ]);
        let range = query(TimeFilter::Around(MinuteOfDay::new(30).unwrap()), 60).unwrap();
        let departures: Vec<TripID> = index.departures_in_range(&range).map(|t| t.id).collect();
        // Before midnight comes first
        assert_eq!(departures, vec![TripID(0), TripID(2)]);
        let arrivals: Vec<TripID> = index.arrivals_in_range(&range).map(|t| t.id).collect();
        assert_eq!(arrivals, vec![TripID(0)]);
    }

    #[test]
    fn test_renumbers_sparse_ids() {
        let index = build(vec![trip(7, 0, 1, 10, 20), trip(9, 0, 1, 10, 20)]);
        assert_eq!(
            index.departures_at(MinuteOfDay::new(10).unwrap()),
            &[TripID(0), TripID(1)]
        );
        assert_eq!(index.trip(TripID(1)).id, TripID(1));
    }
}
