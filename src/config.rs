//! Migration configuration.
//!
//! A migration is described either by a YAML file (every satellite listed
//! under `nchannels`) or by the fixed-table command line variant. Both end up
//! as one validated [`StationConfig`] per satellite.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::Deserialize;

use crate::record::Timestamp;
use crate::station::Satellite;
use crate::window::Error;

const RANGE_FORMAT: &str = "%Y%m%d%H%M";

/// Old window length of the fixed-table variant, in hours.
pub const FIXED_OLD_WINDOW_HOURS: i64 = 6;
/// New window length of the fixed-table variant, in hours.
pub const FIXED_NEW_WINDOW_HOURS: i64 = 3;

/// Raw YAML document, mirrors the keys of `config.yml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    oldwindow_dir: PathBuf,
    newwindow_dir: PathBuf,
    oldwindow_len: i64,
    newwindow_len: i64,
    start_str: String,
    end_str: String,
    nchannels: BTreeMap<String, usize>,
}

/// Everything one satellite's sweep needs.
#[derive(Debug, Clone, PartialEq)]
pub struct StationConfig {
    pub satellite: Satellite,
    pub channels: usize,
    pub old_dir: PathBuf,
    pub new_dir: PathBuf,
    pub old_len: Duration,
    pub new_len: Duration,
    /// First new window center.
    pub start: Timestamp,
    /// Last new window center, inclusive.
    pub end: Timestamp,
    /// First old window center.
    pub old_origin: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationConfig {
    pub old_dir: PathBuf,
    pub new_dir: PathBuf,
    pub old_len: Duration,
    pub new_len: Duration,
    pub start: Timestamp,
    pub end: Timestamp,
    pub old_origin: Timestamp,
    pub channels: BTreeMap<Satellite, usize>,
}

impl MigrationConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, Error> {
        let raw: RawConfig = serde_yaml::from_str(contents)
            .map_err(|e| Error::Configuration(format!("invalid migration config: {}", e)))?;

        let start = parse_range_bound("start_str", &raw.start_str)?;
        let end = parse_range_bound("end_str", &raw.end_str)?;
        let mut channels = BTreeMap::new();
        for (name, count) in raw.nchannels {
            channels.insert(name.parse::<Satellite>()?, count);
        }

        let config = Self {
            old_dir: raw.oldwindow_dir,
            new_dir: raw.newwindow_dir,
            old_len: window_hours("oldwindow_len", raw.oldwindow_len)?,
            new_len: window_hours("newwindow_len", raw.newwindow_len)?,
            start,
            end,
            old_origin: start,
            channels,
        };
        config.validate()?;
        Ok(config)
    }

    /// The command line variant: fixed window lengths and channel table.
    ///
    /// New windows run from `target` to `end`; the first old window is the
    /// nearest old-window boundary at or before `target`.
    pub fn fixed(
        old_dir: PathBuf,
        new_dir: PathBuf,
        target: Timestamp,
        end: Option<Timestamp>,
        satellites: &[Satellite],
    ) -> Result<Self, Error> {
        let old_len = Duration::hours(FIXED_OLD_WINDOW_HOURS);
        let satellites = if satellites.is_empty() {
            &Satellite::ALL[..]
        } else {
            satellites
        };

        let config = Self {
            old_dir,
            new_dir,
            old_len,
            new_len: Duration::hours(FIXED_NEW_WINDOW_HOURS),
            start: target,
            end: end.unwrap_or(target),
            old_origin: snap_back(target, old_len),
            channels: satellites
                .iter()
                .map(|sat| (*sat, sat.default_channels()))
                .collect(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn stations(&self) -> Vec<StationConfig> {
        self.channels
            .iter()
            .map(|(satellite, channels)| StationConfig {
                satellite: *satellite,
                channels: *channels,
                old_dir: self.old_dir.clone(),
                new_dir: self.new_dir.clone(),
                old_len: self.old_len,
                new_len: self.new_len,
                start: self.start,
                end: self.end,
                old_origin: self.old_origin,
            })
            .collect()
    }

    fn validate(&self) -> Result<(), Error> {
        if self.start > self.end {
            return Err(Error::Configuration(format!(
                "migration start {} is after its end {}",
                self.start, self.end
            )));
        }
        if self.old_origin > self.start {
            return Err(Error::Configuration(format!(
                "first old window {} is after the migration start {}",
                self.old_origin, self.start
            )));
        }
        if self.channels.is_empty() {
            return Err(Error::Configuration("no satellites configured".to_string()));
        }
        if let Some((sat, _)) = self.channels.iter().find(|(_, n)| **n == 0) {
            return Err(Error::Configuration(format!("{} has zero channels", sat)));
        }
        Ok(())
    }
}

fn window_hours(key: &str, hours: i64) -> Result<Duration, Error> {
    Duration::try_hours(hours)
        .filter(|_| hours > 0)
        .ok_or_else(|| {
            Error::Configuration(format!(
                "{} must be a positive number of hours, got {}",
                key, hours
            ))
        })
}

fn parse_range_bound(key: &str, value: &str) -> Result<Timestamp, Error> {
    let naive = NaiveDateTime::parse_from_str(value, RANGE_FORMAT).map_err(|e| {
        Error::Configuration(format!("{} {:?} is not YYYYMMDDHHMM: {}", key, value, e))
    })?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Latest instant at or before `time` that is a whole number of `step`s past midnight.
pub fn snap_back(time: Timestamp, step: Duration) -> Timestamp {
    let midnight = time
        .with_hour(0)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time);
    let step_secs = step.num_seconds().max(1);
    let offset = (time - midnight).num_seconds();
    midnight + Duration::seconds(offset - offset.rem_euclid(step_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2020, 5, 21, h, 0, 0).unwrap()
    }

    const YAML: &str = r#"
oldwindow_dir: /data/3dvar_6h
newwindow_dir: /data/3dvar_3h
oldwindow_len: 6
newwindow_len: 3
start_str: "202005210000"
end_str: "202005211800"
nchannels:
  metop2: 15
  npp: 22
"#;

    #[test]
    fn test_parse_yaml() {
        let config = MigrationConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.old_len, Duration::hours(6));
        assert_eq!(config.new_len, Duration::hours(3));
        assert_eq!(config.start, hour(0));
        assert_eq!(config.end, hour(18));
        assert_eq!(config.old_origin, config.start);

        let stations = config.stations();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].satellite, Satellite::Metop2);
        assert_eq!(stations[0].channels, 15);
        assert_eq!(stations[1].satellite, Satellite::Npp);
        assert_eq!(stations[1].new_dir, PathBuf::from("/data/3dvar_3h"));
    }

    #[test]
    fn test_unknown_satellite_rejected() {
        let yaml = YAML.replace("metop2", "fy3d");
        assert!(matches!(MigrationConfig::from_yaml(&yaml), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_missing_key_rejected() {
        let yaml = YAML.replace("newwindow_len: 3\n", "");
        assert!(matches!(MigrationConfig::from_yaml(&yaml), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let yaml = format!("{}nthreads: 4\n", YAML);
        assert!(matches!(MigrationConfig::from_yaml(&yaml), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for yaml in [
            YAML.replace("oldwindow_len: 6", "oldwindow_len: 0"),
            YAML.replace("202005211800", "202005201800"),
            YAML.replace("202005210000", "2020052100"),
            YAML.replace("npp: 22", "npp: 0"),
        ] {
            assert!(
                matches!(MigrationConfig::from_yaml(&yaml), Err(Error::Configuration(_))),
                "accepted:\n{}",
                yaml
            );
        }
    }

    #[test]
    fn test_fixed_snaps_old_origin_back() {
        let config = MigrationConfig::fixed("old".into(), "new".into(), hour(3), None, &[]).unwrap();
        assert_eq!(config.old_origin, hour(0));
        assert_eq!(config.start, hour(3));
        assert_eq!(config.end, hour(3));
        assert_eq!(config.channels.len(), Satellite::ALL.len());
        assert_eq!(config.channels[&Satellite::Npp], 22);
        assert_eq!(config.channels[&Satellite::Noaa15], 15);

        let config = MigrationConfig::fixed(
            "old".into(),
            "new".into(),
            hour(12),
            Some(hour(21)),
            &[Satellite::Metop1],
        )
        .unwrap();
        assert_eq!(config.old_origin, hour(12));
        assert_eq!(config.end, hour(21));
        assert_eq!(config.stations().len(), 1);
    }

    #[test]
    fn test_fixed_end_before_target() {
        let result = MigrationConfig::fixed("old".into(), "new".into(), hour(9), Some(hour(3)), &[]);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_snap_back() {
        let six = Duration::hours(6);
        assert_eq!(snap_back(hour(0), six), hour(0));
        assert_eq!(snap_back(hour(5), six), hour(0));
        assert_eq!(snap_back(hour(6), six), hour(6));
        assert_eq!(snap_back(hour(23), six), hour(18));
    }
}
