use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Duration;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};

use super::{Error, WindowAssemble};
use crate::record::{Record, RecordLayout, Timestamp, read_records};

/// A closed interval `[center - len/2, center + len/2]` bound to one window file.
///
/// The same type serves both roles: source windows are loaded from their file,
/// target windows are filled from overlapping source windows and then flushed.
#[derive(Debug)]
pub struct TimeWindow {
    center: Timestamp,
    len: Duration,
    path: PathBuf,
    layout: RecordLayout,
    start: Timestamp,
    end: Timestamp,
    records: Vec<Record>,
    times: Vec<Timestamp>,
}

impl TimeWindow {
    pub fn new(center: Timestamp, len: Duration, path: PathBuf, layout: RecordLayout) -> Self {
        let half = len / 2;
        Self {
            center,
            len,
            path,
            layout,
            start: center - half,
            end: center + half,
            records: Vec::new(),
            times: Vec::new(),
        }
    }

    pub fn center(&self) -> Timestamp {
        self.center
    }

    pub fn duration(&self) -> Duration {
        self.len
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Held records paired with their observation times, in buffer order.
    pub fn records(&self) -> impl Iterator<Item = (&Record, Timestamp)> {
        self.records.iter().zip(self.times.iter().copied())
    }

    /// Appends every record of the backing file, in file order.
    pub fn load(&mut self) -> Result<usize, Error> {
        let loaded = read_records(&self.path, &self.layout)?;
        let count = loaded.len();
        for (record, time) in loaded {
            self.push(record, time);
        }

        log::debug!("Loaded {} records from {}", count, self.path.display());
        Ok(count)
    }

    /// True iff the two closed intervals share at least one instant.
    pub fn intersect_with(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True iff this window lies inside the assemble's coverage, bounds included.
    pub fn contained_by(&self, assemble: &WindowAssemble) -> bool {
        match assemble.coverage() {
            Some((start, end)) => self.start >= start && self.end <= end,
            None => false,
        }
    }

    pub fn include(&self, time: Timestamp) -> bool {
        time >= self.start && time <= self.end
    }

    /// Copies the records of `other` that fall inside this window, keeping their order.
    pub fn filter_from(&mut self, other: &TimeWindow) -> usize {
        if !self.intersect_with(other) {
            return 0;
        }

        let before = self.records.len();
        for (record, time) in other.records() {
            if self.include(time) {
                self.records.push(record.clone());
                self.times.push(time);
            }
        }
        self.records.len() - before
    }

    /// Writes the held records to the backing file, then releases them.
    ///
    /// The file is written under a temporary name and renamed into place, so
    /// a failed flush never leaves a truncated window file behind.
    pub fn flush(&mut self) -> Result<usize, Error> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Configuration(format!("window path {} has no file name", self.path.display()))
            })?;
        let temp_path = self
            .path
            .with_file_name(format!(".{}.{}.tmp", file_name, generate_random_string(8)));

        let written = self.records.len();
        let result = self.write_to(&temp_path);
        if let Err(e) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }
        std::fs::rename(&temp_path, &self.path)?;

        log::debug!("Wrote {} records to {}", written, self.path.display());
        self.close();
        Ok(written)
    }

    /// Releases the record buffers without writing anything.
    pub fn close(&mut self) {
        self.records = Vec::new();
        self.times = Vec::new();
    }

    pub(crate) fn push(&mut self, record: Record, time: Timestamp) {
        self.records.push(record);
        self.times.push(time);
    }

    fn write_to(&self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        for record in &self.records {
            writer.write_all(self.layout.encode(record))?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}

fn generate_random_string(len: usize) -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
