use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::record::Timestamp;
use crate::window::Error;

const STAMP_FORMAT: &str = "%Y%m%d%H";

/// Maps window timestamps to file names and back for one naming scheme.
pub trait FileNaming: Send + Sync {
    fn file_name(&self, satellite: &str, stamp: &str) -> String;

    /// Extracts the `YYYYMMDDHH` stamp from a file name, `None` if it does not match.
    fn stamp<'a>(&self, satellite: &str, file_name: &'a str) -> Option<&'a str>;
}

/// `{sat}_{YYYYMMDDHH}_ama.dat`
pub struct AmsuaNaming;

/// `{sat}_atms{YYYYMMDDHH}.dat`
pub struct AtmsNaming;

impl FileNaming for AmsuaNaming {
    fn file_name(&self, satellite: &str, stamp: &str) -> String {
        format!("{}_{}_ama.dat", satellite, stamp)
    }

    fn stamp<'a>(&self, satellite: &str, file_name: &'a str) -> Option<&'a str> {
        file_name
            .strip_prefix(satellite)?
            .strip_prefix('_')?
            .strip_suffix("_ama.dat")
    }
}

impl FileNaming for AtmsNaming {
    fn file_name(&self, satellite: &str, stamp: &str) -> String {
        format!("{}_atms{}.dat", satellite, stamp)
    }

    fn stamp<'a>(&self, satellite: &str, file_name: &'a str) -> Option<&'a str> {
        file_name
            .strip_prefix(satellite)?
            .strip_prefix("_atms")?
            .strip_suffix(".dat")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Satellite {
    Metop1,
    Metop2,
    Noaa15,
    Noaa18,
    Noaa19,
    Npp,
}

impl Satellite {
    pub const ALL: [Satellite; 6] = [
        Satellite::Metop1,
        Satellite::Metop2,
        Satellite::Noaa15,
        Satellite::Noaa18,
        Satellite::Noaa19,
        Satellite::Npp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Satellite::Metop1 => "metop1",
            Satellite::Metop2 => "metop2",
            Satellite::Noaa15 => "noaa15",
            Satellite::Noaa18 => "noaa18",
            Satellite::Noaa19 => "noaa19",
            Satellite::Npp => "npp",
        }
    }

    /// Channel count of the sounder each satellite carries (AMSU-A or ATMS).
    pub fn default_channels(&self) -> usize {
        match self {
            Satellite::Npp => 22,
            _ => 15,
        }
    }

    pub fn naming(&self) -> &'static dyn FileNaming {
        match self {
            Satellite::Npp => &AtmsNaming,
            _ => &AmsuaNaming,
        }
    }

    pub fn window_path(&self, dir: &Path, time: Timestamp) -> PathBuf {
        let stamp = time.format(STAMP_FORMAT).to_string();
        dir.join(self.naming().file_name(self.name(), &stamp))
    }

    /// Inverse of [`Satellite::window_path`].
    pub fn window_time(&self, path: &Path) -> Result<Timestamp, Error> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Format(format!("{} has no file name", path.display())))?;
        let stamp = self.naming().stamp(self.name(), file_name).ok_or_else(|| {
            Error::Format(format!("{} is not a {} window file", file_name, self.name()))
        })?;
        parse_hour(stamp)
    }
}

impl fmt::Display for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Satellite {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Satellite::ALL
            .into_iter()
            .find(|sat| sat.name() == s)
            .ok_or_else(|| Error::Configuration(format!("Unknown satellite name {}", s)))
    }
}

/// Parses a `YYYYMMDDHH` stamp.
pub fn parse_hour(stamp: &str) -> Result<Timestamp, Error> {
    if stamp.len() != 10 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Format(format!("expected YYYYMMDDHH, got {:?}", stamp)));
    }
    // chrono needs a minute to build a time of day.
    let naive = NaiveDateTime::parse_from_str(&format!("{}00", stamp), "%Y%m%d%H%M")
        .map_err(|e| Error::Format(format!("invalid stamp {:?}: {}", stamp, e)))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Window files of `satellite` in `dir` whose time lies in `[from, to]`, oldest first.
pub fn list_window_files(
    satellite: Satellite,
    dir: &Path,
    from: Timestamp,
    to: Timestamp,
) -> Result<Vec<(Timestamp, PathBuf)>, Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        // Files of other satellites or schemes share the directory.
        let Ok(time) = satellite.window_time(&path) else {
            continue;
        };
        if from <= time && time <= to {
            files.push((time, path));
        }
    }
    files.sort();
    Ok(files)
}
