//! Per-satellite migration: the double-cursor sweep over old and new windows

use std::path::PathBuf;

use chrono::Duration;

use crate::config::StationConfig;
use crate::record::{RecordLayout, Timestamp};
use crate::window::{Error, TimeWindow, WindowAssemble};

mod naming;

#[cfg(test)]
mod tests;

pub use naming::{AmsuaNaming, AtmsNaming, FileNaming, Satellite, list_window_files, parse_hour};

/// Outcome of one cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A new window file was written.
    Written { path: PathBuf, records: usize },
    /// The new window at this center starts before any old window can cover it.
    Skipped(Timestamp),
    /// No new windows remain.
    Finished,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub windows_written: usize,
    pub windows_skipped: usize,
    pub old_loaded: usize,
    pub old_evicted: usize,
    pub records_written: usize,
}

/// Owns one satellite's migration.
///
/// The new cursor advances by one new window per step. The old cursor only
/// advances when the assemble has to grow to cover the window being built.
pub struct SatWorkStation {
    config: StationConfig,
    layout: RecordLayout,
    alive: WindowAssemble,
    old_cursor: Timestamp,
    new_cursor: Timestamp,
    finished: bool,
    report: SweepReport,
}

impl SatWorkStation {
    pub fn new(config: StationConfig) -> Result<Self, Error> {
        let layout = RecordLayout::new(config.channels)?;
        if config.old_len <= Duration::zero() || config.new_len <= Duration::zero() {
            return Err(Error::Configuration(format!(
                "{}: window lengths must be positive",
                config.satellite
            )));
        }

        Ok(Self {
            old_cursor: config.old_origin,
            new_cursor: config.start,
            layout,
            alive: WindowAssemble::new(),
            finished: false,
            report: SweepReport::default(),
            config,
        })
    }

    pub fn assemble(&self) -> &WindowAssemble {
        &self.alive
    }

    pub fn report(&self) -> &SweepReport {
        &self.report
    }

    /// Runs every remaining step, then releases all loaded windows.
    pub fn split_data(&mut self) -> Result<SweepReport, Error> {
        let result = self.drain();
        self.close();
        result.map(|_| self.report.clone())
    }

    fn drain(&mut self) -> Result<(), Error> {
        loop {
            match self.step()? {
                Step::Finished => return Ok(()),
                Step::Written { path, records } => {
                    log::info!("New Sat File: {} ({} records)", path.display(), records);
                }
                Step::Skipped(center) => {
                    log::debug!("{}: skip new window at {}", self.config.satellite, center);
                }
            }
        }
    }

    /// Produces the new window at the current cursor position.
    pub fn step(&mut self) -> Result<Step, Error> {
        if self.finished || self.new_cursor > self.config.end {
            self.finished = true;
            return Ok(Step::Finished);
        }

        let center = self.new_cursor;
        let path = self.config.satellite.window_path(&self.config.new_dir, center);
        let mut candidate = TimeWindow::new(center, self.config.new_len, path, self.layout);

        let half_old = self.config.old_len / 2;
        if candidate.start() < self.config.old_origin - half_old {
            self.new_cursor += self.config.new_len;
            self.report.windows_skipped += 1;
            return Ok(Step::Skipped(center));
        }
        if candidate.end() >= self.config.end + half_old {
            log::debug!(
                "{}: new window at {} reaches past the last old window",
                self.config.satellite,
                center
            );
            self.finished = true;
            return Ok(Step::Finished);
        }

        self.evict_stale(&candidate);
        while !candidate.contained_by(&self.alive) {
            self.load_next_old()?;
        }
        // Backfill may start behind the candidate when the old origin trails it.
        self.evict_stale(&candidate);

        let records = self.alive.populate(&mut candidate)?;
        self.report.windows_written += 1;
        self.report.records_written += records;
        self.new_cursor += self.config.new_len;

        Ok(Step::Written {
            path: candidate.path().to_path_buf(),
            records,
        })
    }

    pub fn close(&mut self) {
        self.alive.close_all();
    }

    fn evict_stale(&mut self, candidate: &TimeWindow) {
        while self
            .alive
            .head()
            .is_some_and(|head| !candidate.intersect_with(head))
        {
            self.alive.dequeue();
            self.report.old_evicted += 1;
        }
    }

    fn load_next_old(&mut self) -> Result<(), Error> {
        let path = self
            .config
            .satellite
            .window_path(&self.config.old_dir, self.old_cursor);
        let mut window = TimeWindow::new(self.old_cursor, self.config.old_len, path, self.layout);
        window.load()?;
        log::debug!(
            "{}: load old window {} ({} records)",
            self.config.satellite,
            window.path().display(),
            window.record_count()
        );

        self.alive.enqueue(window);
        self.report.old_loaded += 1;
        self.old_cursor += self.config.old_len;
        Ok(())
    }
}
