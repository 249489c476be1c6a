pub mod assemble;

use super::*;
use crate::record::{Observation, Record, RecordLayout, Timestamp};
use chrono::{Duration, TimeZone, Utc};
use std::path::Path;

pub fn test_layout() -> RecordLayout {
    RecordLayout::new(15).unwrap()
}

pub fn at(hours: i64, minutes: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        + Duration::hours(hours)
        + Duration::minutes(minutes)
}

pub fn create_test_record(time: Timestamp, scan_line: i32) -> Record {
    let layout = test_layout();
    let mut obs = Observation::missing(&layout, time);
    obs.scan_line = scan_line;
    obs.encode(&layout).unwrap()
}

/// A window centered at `center_hour` holding one record per time, scan line = index.
pub fn create_test_window(dir: &Path, center_hour: i64, len_hours: i64, times: &[Timestamp]) -> TimeWindow {
    let path = dir.join(format!("window_{:02}.dat", center_hour));
    let mut window = TimeWindow::new(at(center_hour, 0), Duration::hours(len_hours), path, test_layout());
    for (i, time) in times.iter().enumerate() {
        window.push(create_test_record(*time, i as i32), *time);
    }
    window
}

pub fn scan_lines(path: &Path) -> Vec<i32> {
    let layout = test_layout();
    crate::record::read_records(path, &layout)
        .unwrap()
        .iter()
        .map(|(record, _)| Observation::decode(&layout, record).unwrap().scan_line)
        .collect()
}
