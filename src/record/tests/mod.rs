
use super::*;
use chrono::Duration;

pub fn test_layout() -> RecordLayout {
    RecordLayout::new(15).unwrap()
}

pub fn at(hours: i64, minutes: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        + Duration::hours(hours)
        + Duration::minutes(minutes)
}

/// A record at `time` whose scan line makes its bytes unique.
pub fn create_test_record(layout: &RecordLayout, time: Timestamp, scan_line: i32) -> Record {
    let mut obs = Observation::missing(layout, time);
    obs.scan_line = scan_line;
    obs.tbb = (0..layout.channels()).map(|c| 200.0 + c as f32).collect();
    obs.encode(layout).unwrap()
}
