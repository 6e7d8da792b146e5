#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod controller;
pub mod export;
mod index;
mod scale;
mod traffic;
mod window;

use std::io::Cursor;

use abstutil::{prettyprint_usize, Timer};
use anyhow::Result;
use geom::GPSBounds;
use zip::ZipArchive;

use tripdata::{orig, IDMapping, ImportReport, Station, StationFormat, StationID, Trip};

pub use self::controller::{Controller, Marker};
pub use self::index::{IndexBuilder, MinuteBucketIndex};
pub use self::scale::{FlowBalance, MagnitudeScale};
pub use self::traffic::{aggregate, count_traffic, StationTraffic, TrafficCounts};
pub use self::window::{query, query_raw, RangeSpec, TimeFilter, DEFAULT_RADIUS_MINUTES};

/// Stations and the trip index, fully loaded. Read-only once built.
pub struct Model {
    pub gps_bounds: GPSBounds,
    pub stations: Vec<Station>,
    pub station_ids: IDMapping<orig::StationID, StationID>,
    pub index: MinuteBucketIndex,
    pub report: ImportReport,
    /// Trips with at least one end at a station missing from the station list
    pub unmatched_trips: usize,
}

impl Model {
    pub fn empty() -> Self {
        Self {
            gps_bounds: GPSBounds::new(),
            stations: Vec::new(),
            station_ids: IDMapping::new(),
            index: MinuteBucketIndex::empty(),
            report: ImportReport::default(),
            unmatched_trips: 0,
        }
    }

    /// Loads stations, then streams every trip straight into the index in one pass.
    pub fn import<R1: std::io::Read, R2: std::io::Read>(
        stations: R1,
        station_format: StationFormat,
        trips: R2,
        timer: &mut Timer,
    ) -> Result<Self> {
        let mut station_ids = IDMapping::new();
        timer.start("load stations");
        let (stations, gps_bounds) =
            tripdata::load_stations(stations, station_format, &mut station_ids)?;
        timer.stop("load stations");
        info!("Loaded {} stations", prettyprint_usize(stations.len()));

        // Stations were interned first, so their IDs are exactly 0..num_stations
        let num_stations = stations.len();
        let is_known = |id: Option<StationID>| id.map(|id| id.0 < num_stations).unwrap_or(true);

        let mut builder = IndexBuilder::new();
        let mut unmatched_trips = 0;
        let report = tripdata::load_trips(trips, &mut station_ids, timer, |trip: Trip| {
            if !is_known(trip.start_station) || !is_known(trip.end_station) {
                unmatched_trips += 1;
            }
            builder.insert(trip);
        })?;
        if unmatched_trips > 0 {
            warn!(
                "{} trips start or end at unknown stations; they won't count there",
                prettyprint_usize(unmatched_trips)
            );
        }

        Ok(Self {
            gps_bounds,
            stations,
            station_ids,
            index: builder.finish(),
            report,
            unmatched_trips,
        })
    }

    /// The station format is chosen by file extension.
    pub fn import_files(stations_path: &str, trips_path: &str, timer: &mut Timer) -> Result<Self> {
        let format = StationFormat::from_path(stations_path)?;
        let stations = fs_err::File::open(stations_path)?;
        let trips = fs_err::File::open(trips_path)?;
        Self::import(
            std::io::BufReader::new(stations),
            format,
            std::io::BufReader::new(trips),
            timer,
        )
    }

    /// A .zip bundle with `trips.csv` and either `stations.json` or `stations.csv`
    pub fn import_zip_bytes(bytes: Vec<u8>, timer: &mut Timer) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let (station_path, format) = if archive.file_names().any(|x| x == "stations.json") {
            ("stations.json", StationFormat::Json)
        } else {
            ("stations.csv", StationFormat::Csv)
        };

        // Reading one member while another is open isn't allowed, so buffer the stations
        let mut station_bytes = Vec::new();
        std::io::copy(
            &mut tripdata::get_zip_file(&mut archive, station_path)?,
            &mut station_bytes,
        )?;
        let trips = tripdata::get_zip_file(&mut archive, "trips.csv")?;
        Self::import(station_bytes.as_slice(), format, trips, timer)
    }
}
