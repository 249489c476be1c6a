
use super::*;
use crate::record::{Observation, Record, read_records};
use chrono::{TimeZone, Utc};
use std::path::Path;

pub fn at(hours: i64, minutes: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        + Duration::hours(hours)
        + Duration::minutes(minutes)
}

pub fn create_test_record(layout: &RecordLayout, time: Timestamp, scan_line: i32) -> Record {
    let mut obs = Observation::missing(layout, time);
    obs.scan_line = scan_line;
    obs.encode(layout).unwrap()
}

/// Writes an old window file; scan lines are `center_hour * 1000 + index`.
pub fn write_old_window(
    dir: &Path,
    satellite: Satellite,
    layout: &RecordLayout,
    center_hour: i64,
    times: &[Timestamp],
) -> Vec<Record> {
    let records: Vec<Record> = times
        .iter()
        .enumerate()
        .map(|(i, t)| create_test_record(layout, *t, (center_hour * 1000) as i32 + i as i32))
        .collect();
    let bytes: Vec<u8> = records.iter().flat_map(|r| r.as_bytes().to_vec()).collect();
    std::fs::write(satellite.window_path(dir, at(center_hour, 0)), bytes).unwrap();
    records
}

pub fn test_config(old_dir: &Path, new_dir: &Path, start_hour: i64, end_hour: i64) -> StationConfig {
    StationConfig {
        satellite: Satellite::Noaa19,
        channels: 15,
        old_dir: old_dir.to_path_buf(),
        new_dir: new_dir.to_path_buf(),
        old_len: Duration::hours(6),
        new_len: Duration::hours(3),
        start: at(start_hour, 0),
        end: at(end_hour, 0),
        old_origin: at(0, 0),
    }
}

pub fn read_times(path: &Path, layout: &RecordLayout) -> Vec<Timestamp> {
    read_records(path, layout)
        .unwrap()
        .into_iter()
        .map(|(_, t)| t)
        .collect()
}
