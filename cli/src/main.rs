#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::io::BufRead;

use abstutil::{prettyprint_usize, Timer};
use anyhow::Result;
use structopt::StructOpt;

use model::{Controller, Model, TimeFilter};

#[derive(StructOpt)]
struct Args {
    /// The path to a station list, as .json (plain array or GBFS station_information) or .csv
    #[structopt(long)]
    stations: Option<String>,
    /// The path to a trip history CSV
    #[structopt(long)]
    trips: Option<String>,
    /// The path to a .zip file containing trips.csv and stations.json or stations.csv
    #[structopt(long)]
    import_zip: Option<String>,
    /// Time filters to apply in order: -1 or "any" for all trips, a minute of the day, or a
    /// time like 14:30. If none are given, they're read from stdin, one per line.
    #[structopt(long, allow_hyphen_values = true)]
    time: Vec<String>,
    /// Trips within this many minutes of the filter's time are counted
    #[structopt(long, default_value = "60")]
    radius: usize,
    /// How many of the busiest stations to list after each change
    #[structopt(long, default_value = "5")]
    top: usize,
    /// Write GeoJSON markers for the final filter here
    #[structopt(long)]
    output: Option<String>,
}

impl Args {
    fn load(&mut self, timer: &mut Timer) -> Result<Model> {
        if let Some(path) = self.import_zip.take() {
            if self.stations.is_some() || self.trips.is_some() {
                bail!("You can't specify both --import-zip and --stations/--trips");
            }
            let bytes = fs_err::read(path)?;
            return Model::import_zip_bytes(bytes, timer);
        }
        match (self.stations.take(), self.trips.take()) {
            (Some(stations), Some(trips)) => Model::import_files(&stations, &trips, timer),
            (None, None) => bail!("No input specified"),
            _ => bail!("Both --stations and --trips are needed"),
        }
    }
}

fn main() {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    if let Err(err) = run(args) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(mut args: Args) -> Result<()> {
    let mut timer = Timer::new("import bike-share data");
    // A broken dataset shouldn't stop anything; the map just shows nothing.
    let model = match args.load(&mut timer) {
        Ok(model) => model,
        Err(err) => {
            error!("Couldn't load data, continuing with nothing: {err}");
            Model::empty()
        }
    };
    drop(timer);
    info!(
        "{} stations, {} trips indexed",
        prettyprint_usize(model.stations.len()),
        prettyprint_usize(model.index.len())
    );

    let mut controller = Controller::new(model, args.radius)?;
    summarize(&controller, args.top);

    if args.time.is_empty() {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            on_signal(&mut controller, &line, args.top);
        }
    } else {
        for signal in &args.time {
            on_signal(&mut controller, signal, args.top);
        }
    }

    if let Some(path) = args.output {
        let gj = model::export::markers_to_geojson_string(&controller)?;
        fs_err::write(&path, gj)?;
        info!("Wrote markers for {} to {path}", controller.time_label());
    }
    Ok(())
}

fn on_signal(controller: &mut Controller, signal: &str, top: usize) {
    let changed = match TimeFilter::parse(signal).and_then(|f| controller.set_filter(f)) {
        Ok(changed) => changed,
        Err(err) => {
            warn!("Ignoring time filter {signal:?}: {err}");
            return;
        }
    };
    if changed {
        summarize(controller, top);
    }
}

fn summarize(controller: &Controller, top: usize) {
    println!(
        "{}: {} departures and arrivals",
        controller.time_label(),
        prettyprint_usize(controller.total_traffic())
    );
    for s in controller.busiest(top) {
        if s.total_traffic == 0 {
            break;
        }
        let name = s.station.name.as_ref().unwrap_or(&s.station.orig_id.0);
        println!("  {name}: {}", s.describe());
    }
}
