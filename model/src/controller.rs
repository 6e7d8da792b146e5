use anyhow::Result;
use geom::LonLat;

use tripdata::StationID;

use crate::{
    aggregate, query, FlowBalance, MagnitudeScale, Model, StationTraffic, TimeFilter,
    DEFAULT_RADIUS_MINUTES,
};

/// Owns the current time filter and the station traffic derived from it. The only writer of
/// either; every change re-aggregates the full window.
pub struct Controller {
    model: Model,
    radius_minutes: usize,
    filter: TimeFilter,
    stations: Vec<StationTraffic>,
}

/// Everything the renderer needs to draw one station
#[derive(Clone)]
pub struct Marker {
    pub id: StationID,
    pub pos: LonLat,
    pub radius: f64,
    pub flow_balance: f64,
    pub tooltip: String,
}

impl Controller {
    pub fn new(model: Model, radius_minutes: usize) -> Result<Self> {
        // Fail before doing any work if the radius is bad
        query(TimeFilter::Any, radius_minutes)?;

        let stations = model
            .stations
            .iter()
            .cloned()
            .map(StationTraffic::new)
            .collect();
        let mut controller = Self {
            model,
            radius_minutes,
            filter: TimeFilter::Any,
            stations,
        };
        controller.recalculate()?;
        Ok(controller)
    }

    pub fn with_default_radius(model: Model) -> Result<Self> {
        Self::new(model, DEFAULT_RADIUS_MINUTES)
    }

    /// Returns true if the filter changed and traffic was recalculated.
    pub fn set_filter(&mut self, filter: TimeFilter) -> Result<bool> {
        if filter == self.filter {
            return Ok(false);
        }
        self.filter = filter;
        self.recalculate()?;
        Ok(true)
    }

    /// Straight from the UI control. Out-of-range values are an error and leave the current
    /// filter alone.
    pub fn set_filter_raw(&mut self, raw: i32) -> Result<bool> {
        let filter = TimeFilter::from_raw(raw)?;
        self.set_filter(filter)
    }

    fn recalculate(&mut self) -> Result<()> {
        aggregate(
            &self.model.index,
            &mut self.stations,
            self.filter,
            self.radius_minutes,
        )
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn filter(&self) -> TimeFilter {
        self.filter
    }

    pub fn time_label(&self) -> String {
        self.filter.label()
    }

    pub fn stations(&self) -> &[StationTraffic] {
        &self.stations
    }

    /// Sums departures and arrivals over the known stations
    pub fn total_traffic(&self) -> usize {
        self.stations.iter().map(|s| s.total_traffic).sum()
    }

    /// The n stations with the most traffic, busiest first. Ties keep the input order.
    pub fn busiest(&self, n: usize) -> Vec<&StationTraffic> {
        let mut list: Vec<&StationTraffic> = self.stations.iter().collect();
        list.sort_by(|a, b| b.total_traffic.cmp(&a.total_traffic));
        list.truncate(n);
        list
    }

    pub fn markers(&self) -> Vec<Marker> {
        let scale = MagnitudeScale::new(&self.stations, self.filter);
        self.stations
            .iter()
            .map(|s| Marker {
                id: s.station.id,
                pos: s.station.pos,
                radius: scale.radius(s.total_traffic),
                flow_balance: FlowBalance::of(s).level(),
                tooltip: s.describe(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::two_station_model;

    #[test]
    fn test_starts_unfiltered() {
        let controller = Controller::with_default_radius(two_station_model()).unwrap();
        assert_eq!(controller.filter(), TimeFilter::Any);
        assert_eq!(controller.time_label(), "(any time)");
        assert_eq!(controller.total_traffic(), 6);
    }

    #[test]
    fn test_filter_changes() {
        let mut controller = Controller::with_default_radius(two_station_model()).unwrap();
        assert!(controller.set_filter_raw(100).unwrap());
        assert!(!controller.set_filter_raw(100).unwrap());
        assert_eq!(controller.time_label(), "1:40 AM");
        // Only the 1:40 AM trip from A to B
        assert_eq!(controller.total_traffic(), 2);

        assert!(controller.set_filter_raw(1440).is_err());
        assert!(controller.set_filter_raw(-2).is_err());
        assert_eq!(controller.filter().to_raw(), 100);

        assert!(controller.set_filter_raw(-1).unwrap());
        assert_eq!(controller.total_traffic(), 6);
    }

    #[test]
    fn test_markers() {
        let mut controller = Controller::with_default_radius(two_station_model()).unwrap();
        controller.set_filter_raw(100).unwrap();
        let markers = controller.markers();
        assert_eq!(markers.len(), 2);
        // A only has the departure, B only the arrival
        assert_eq!(markers[0].flow_balance, 1.0);
        assert_eq!(markers[1].flow_balance, 0.0);
        assert_eq!(markers[0].radius, 50.0);
        assert_eq!(markers[0].tooltip, "1 trips (1 departures, 0 arrivals)");

        let busiest = controller.busiest(1);
        assert_eq!(busiest.len(), 1);
    }

    #[test]
    fn test_bad_radius() {
        assert!(Controller::new(two_station_model(), 720).is_err());
    }
}
