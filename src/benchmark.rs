use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use chrono::{Duration, TimeZone, Utc};
use rand::Rng;

use crate::config::MigrationConfig;
use crate::driver::{makenewdir, migrate};
use crate::record::{Observation, RecordLayout, Timestamp};
use crate::station::Satellite;
use crate::window::{Error, TimeWindow};

const OLD_WINDOW_HOURS: i64 = 6;
const NEW_WINDOW_HOURS: i64 = 3;

pub fn run_benchmarks(days: i64, records_per_window: usize) -> Result<(), Error> {
    println!(
        "Running sweep benchmark over {} days, {} records per old window...",
        days, records_per_window
    );

    let scratch = tempfile::tempdir()?;
    let old_dir = scratch.path().join("old");
    let new_dir = scratch.path().join("new");
    makenewdir(&old_dir)?;

    let satellite = Satellite::Noaa19;
    let layout = RecordLayout::new(satellite.default_channels())?;
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().ok_or_else(|| {
        Error::Configuration("benchmark start is not a valid date".to_string())
    })?;
    let end = start + Duration::days(days.max(1));

    let ingest_start = Instant::now();
    let written = generate_old_windows(&old_dir, satellite, &layout, start, end, records_per_window)?;
    let ingest_ms = ingest_start.elapsed().as_secs_f64() * 1000.0;
    println!("Generated {} old windows in {:.2}ms", written, ingest_ms);

    let config = MigrationConfig {
        old_dir,
        new_dir,
        old_len: Duration::hours(OLD_WINDOW_HOURS),
        new_len: Duration::hours(NEW_WINDOW_HOURS),
        start,
        end,
        old_origin: start,
        channels: BTreeMap::from([(satellite, satellite.default_channels())]),
    };

    let sweep_start = Instant::now();
    let outcomes = migrate(&config, 1)?;
    let sweep_ms = sweep_start.elapsed().as_secs_f64() * 1000.0;

    for outcome in outcomes {
        let report = outcome.result?;
        println!("\nBenchmark Results:");
        println!("-----------------");
        println!("New windows written: {}", report.windows_written);
        println!("Records written: {}", report.records_written);
        println!("Old windows loaded: {}", report.old_loaded);
        println!("Sweep time: {:.2}ms", sweep_ms);
        if sweep_ms > 0.0 {
            println!(
                "Throughput: {:.0} records/s",
                report.records_written as f64 / (sweep_ms / 1000.0)
            );
        }
    }
    Ok(())
}

/// Writes one old window file per old-window step in `[start, end]`.
fn generate_old_windows(
    dir: &Path,
    satellite: Satellite,
    layout: &RecordLayout,
    start: Timestamp,
    end: Timestamp,
    records_per_window: usize,
) -> Result<usize, Error> {
    let mut rng = rand::rng();
    let old_len = Duration::hours(OLD_WINDOW_HOURS);
    let mut center = start;
    let mut count = 0;

    while center <= end {
        let mut window = TimeWindow::new(center, old_len, satellite.window_path(dir, center), *layout);
        // Half-open per window, so adjacent old windows never share a record.
        let mut offsets: Vec<i64> = (0..records_per_window)
            .map(|_| rng.random_range(0..old_len.num_seconds()))
            .collect();
        offsets.sort_unstable();

        for (i, offset) in offsets.into_iter().enumerate() {
            let mut obs = Observation::missing(layout, window.start() + Duration::seconds(offset));
            obs.scan_line = (i / 90) as i32;
            obs.scan_pos = (i % 90) as i32;
            obs.lat = rng.random_range(-90.0..90.0);
            obs.lon = rng.random_range(-180.0..180.0);
            for t in obs.tbb.iter_mut() {
                *t = rng.random_range(150.0..300.0);
            }
            window.push(obs.encode(layout)?, obs.time);
        }
        window.flush()?;

        center += old_len;
        count += 1;
    }
    Ok(count)
}
