use anyhow::Result;
use geom::{GPSBounds, LonLat};
use serde::{Deserialize, Serialize};

use crate::{orig, IDMapping, StationID};

#[derive(Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: StationID,
    pub orig_id: orig::StationID,
    pub pos: LonLat,
    pub name: Option<String>,
}

/// Stations from a CSV file with `short_name`, `lon`, `lat`, and optionally `name` columns.
pub fn load_csv<R: std::io::Read>(
    reader: R,
    ids: &mut IDMapping<orig::StationID, StationID>,
) -> Result<(Vec<Station>, GPSBounds)> {
    let mut records = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        records.push(rec);
    }
    from_records(records, ids)
}

/// Stations from JSON. Either a plain array of station objects or a GBFS
/// `station_information` feed, where they're nested under `data.stations`.
pub fn load_json<R: std::io::Read>(
    reader: R,
    ids: &mut IDMapping<orig::StationID, StationID>,
) -> Result<(Vec<Station>, GPSBounds)> {
    let records = match serde_json::from_reader(reader)? {
        StationFeed::Plain(records) => records,
        StationFeed::Gbfs { data } => data.stations,
    };
    from_records(records, ids)
}

fn from_records(
    records: Vec<Record>,
    ids: &mut IDMapping<orig::StationID, StationID>,
) -> Result<(Vec<Station>, GPSBounds)> {
    let mut gps_bounds = GPSBounds::new();
    let mut stations = Vec::new();
    for rec in records {
        let pos = LonLat::new(rec.lon, rec.lat);
        gps_bounds.update(pos);
        stations.push(Station {
            id: ids.insert_new(rec.short_name.clone())?,
            orig_id: rec.short_name,
            pos,
            name: rec.name,
        });
    }
    Ok((stations, gps_bounds))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StationFeed {
    Plain(Vec<Record>),
    Gbfs { data: GbfsData },
}

#[derive(Deserialize)]
struct GbfsData {
    stations: Vec<Record>,
}

#[derive(Deserialize)]
struct Record {
    short_name: orig::StationID,
    lon: f64,
    lat: f64,
    #[serde(default)]
    name: Option<String>,
    // Everything else (capacity, rental_methods, ...) is ignored
}
