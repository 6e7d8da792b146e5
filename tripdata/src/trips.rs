use abstutil::{prettyprint_usize, Timer};
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::time::{parse_timestamp, MinuteOfDay};
use crate::{orig, IDMapping, StationID, TripID};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripID,
    /// None when the raw record has no station (dockless returns, for example)
    pub start_station: Option<StationID>,
    pub end_station: Option<StationID>,
    pub started_at: MinuteOfDay,
    pub ended_at: MinuteOfDay,
}

/// What happened while ingesting trips. Rejected records are never handed out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Parses trips from a CSV reader, passing each valid trip to `on_trip` as soon as it's
/// produced. Records with a missing column or an unparseable timestamp are logged and skipped.
/// Station IDs are resolved through `ids`, so stations should be loaded first; unknown
/// stations get a fresh ID that no station will match.
pub fn load<R: std::io::Read, F: FnMut(Trip)>(
    reader: R,
    ids: &mut IDMapping<orig::StationID, StationID>,
    timer: &mut Timer,
    mut on_trip: F,
) -> Result<ImportReport> {
    timer.start("load trips");
    let mut report = ImportReport::default();
    for (row, rec) in csv::Reader::from_reader(reader).deserialize().enumerate() {
        let rec: Record = match rec {
            Ok(rec) => rec,
            Err(err) => {
                warn!("Skipping trip on row {}: {err}", row + 1);
                report.skipped += 1;
                continue;
            }
        };
        let (started_at, ended_at) =
            match parse_timestamp(&rec.started_at).and_then(|start| {
                Ok((start, parse_timestamp(&rec.ended_at)?))
            }) {
                Ok(pair) => pair,
                Err(err) => {
                    warn!("Skipping trip on row {}: {err}", row + 1);
                    report.skipped += 1;
                    continue;
                }
            };

        on_trip(Trip {
            id: TripID(report.loaded),
            start_station: lookup_station(ids, rec.start_station_id),
            end_station: lookup_station(ids, rec.end_station_id),
            started_at,
            ended_at,
        });
        report.loaded += 1;
    }
    timer.stop("load trips");

    info!(
        "Loaded {} trips, skipped {} malformed records",
        prettyprint_usize(report.loaded),
        prettyprint_usize(report.skipped)
    );
    Ok(report)
}

fn lookup_station(
    ids: &mut IDMapping<orig::StationID, StationID>,
    orig: Option<orig::StationID>,
) -> Option<StationID> {
    let orig = orig?;
    if orig.0.is_empty() {
        return None;
    }
    Some(ids.insert_idempotent(&orig))
}

#[derive(Deserialize)]
struct Record {
    started_at: String,
    ended_at: String,
    start_station_id: Option<orig::StationID>,
    end_station_id: Option<orig::StationID>,
    // ride_id, rideable_type, member_casual, coordinates, ... are ignored
}
