//! Raw bike-share feeds: station lists and trip histories, parsed into compact records.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod ids;
mod stations;
pub mod time;
mod trips;

use anyhow::Result;
use zip::ZipArchive;

pub use ids::{orig, CheapID, IDMapping, StationID, TripID};
pub use stations::Station;
pub use time::{MinuteOfDay, MINUTES_PER_DAY};
pub use trips::{ImportReport, Trip};

/// How a station list is encoded
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StationFormat {
    Csv,
    Json,
}

impl StationFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let lower = path.to_lowercase();
        if lower.ends_with(".csv") {
            Ok(Self::Csv)
        } else if lower.ends_with(".json") {
            Ok(Self::Json)
        } else {
            bail!("Don't know how to read stations from {path}; expected .csv or .json")
        }
    }
}

pub fn load_stations<R: std::io::Read>(
    reader: R,
    format: StationFormat,
    ids: &mut IDMapping<orig::StationID, StationID>,
) -> Result<(Vec<Station>, geom::GPSBounds)> {
    match format {
        StationFormat::Csv => stations::load_csv(reader, ids),
        StationFormat::Json => stations::load_json(reader, ids),
    }
}

pub use trips::load as load_trips;

// Adds the path in the error message
pub fn get_zip_file<'a, R: std::io::Read + std::io::Seek>(
    archive: &'a mut ZipArchive<R>,
    path: &str,
) -> Result<zip::read::ZipFile<'a>> {
    archive
        .by_name(path)
        .map_err(|err| anyhow!("{path}: {err}"))
}
