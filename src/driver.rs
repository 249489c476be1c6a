//! Outer loop over satellites.

use std::path::Path;
use std::thread;

use crate::config::{MigrationConfig, StationConfig};
use crate::station::{SatWorkStation, Satellite, SweepReport};
use crate::window::Error;

#[derive(Debug)]
pub struct SatelliteOutcome {
    pub satellite: Satellite,
    pub result: Result<SweepReport, Error>,
}

/// Creates the output directory if needed and drops write access for others.
pub fn makenewdir(dir: &Path) -> Result<(), Error> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(dir)?.permissions();
        perms.set_mode(perms.mode() & !0o002);
        std::fs::set_permissions(dir, perms)?;
    }
    Ok(())
}

/// Sweeps every configured satellite, `jobs` at a time.
///
/// A failed satellite does not stop the others; each outcome is returned in
/// configuration order.
pub fn migrate(config: &MigrationConfig, jobs: usize) -> Result<Vec<SatelliteOutcome>, Error> {
    makenewdir(&config.new_dir)?;

    let stations = config.stations();
    let mut outcomes = Vec::with_capacity(stations.len());
    for batch in stations.chunks(jobs.max(1)) {
        if batch.len() == 1 {
            outcomes.push(sweep(batch[0].clone()));
            continue;
        }
        thread::scope(|s| {
            let handles: Vec<_> = batch
                .iter()
                .map(|station| {
                    let station = station.clone();
                    s.spawn(move || sweep(station))
                })
                .collect();
            for handle in handles {
                let outcome = handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                outcomes.push(outcome);
            }
        });
    }
    Ok(outcomes)
}

fn sweep(station: StationConfig) -> SatelliteOutcome {
    let satellite = station.satellite;
    log::info!("{}: sweep {} .. {}", satellite, station.start, station.end);

    let result = SatWorkStation::new(station).and_then(|mut ws| ws.split_data());
    match &result {
        Ok(report) => log::info!(
            "{}: wrote {} windows ({} records), skipped {}, loaded {} old windows, evicted {}",
            satellite,
            report.windows_written,
            report.records_written,
            report.windows_skipped,
            report.old_loaded,
            report.old_evicted
        ),
        Err(e) => log::error!("{}: sweep failed: {}", satellite, e),
    }
    SatelliteOutcome { satellite, result }
}
