use std::io::{Cursor, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chrono::{Datelike, Timelike};

use super::{Record, RecordLayout, Timestamp};
use crate::window::Error;

/// Integer missing-data indicator.
pub const MDI: i32 = -999_999;
/// Real missing-data indicator.
pub const RMDI: f32 = -999_999.0;

/// All named fields of one record.
///
/// The sweep never goes through this type; records travel as opaque bytes.
/// It exists for producing records and for inspecting window files.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub marker: i32,
    pub time: Timestamp,
    pub scan_line: i32,
    pub scan_pos: i32,
    pub lat: f32,
    pub lon: f32,
    pub surface_height: i32,
    pub surface_type: i32,
    pub sat_zenith: f32,
    pub sat_azimuth: f32,
    pub sol_zenith: f32,
    pub sol_azimuth: f32,
    /// Brightness temperature per channel
    pub tbb: Vec<f32>,
    pub avhrr: [i32; 13],
    pub hirs_flag: i32,
    pub prepro: [i32; 5],
    pub cloud_fraction: f32,
    pub surface_temp: f32,
    pub cloud_top_temp: f32,
    pub end_marker: i32,
}

impl Observation {
    /// An observation at `time` with every auxiliary field set to missing.
    pub fn missing(layout: &RecordLayout, time: Timestamp) -> Self {
        // Fortran sequential records: the marker counts the bytes between markers.
        let marker = (layout.record_len() - 8) as i32;
        Self {
            marker,
            time,
            scan_line: 0,
            scan_pos: 0,
            lat: RMDI,
            lon: RMDI,
            surface_height: MDI,
            surface_type: MDI,
            sat_zenith: RMDI,
            sat_azimuth: RMDI,
            sol_zenith: RMDI,
            sol_azimuth: RMDI,
            tbb: vec![RMDI; layout.channels()],
            avhrr: [MDI; 13],
            hirs_flag: MDI,
            prepro: [0; 5],
            cloud_fraction: RMDI,
            surface_temp: RMDI,
            cloud_top_temp: RMDI,
            end_marker: marker,
        }
    }

    pub fn decode(layout: &RecordLayout, record: &Record) -> Result<Self, Error> {
        let (_, time) = layout.decode(record.as_bytes())?;
        let mut r = Cursor::new(record.as_bytes());

        let marker = r.read_i32::<BigEndian>()?;
        // Time fields were already validated above.
        for _ in 0..6 {
            r.read_i32::<BigEndian>()?;
        }
        let scan_line = r.read_i32::<BigEndian>()?;
        let scan_pos = r.read_i32::<BigEndian>()?;
        let lat = r.read_f32::<BigEndian>()?;
        let lon = r.read_f32::<BigEndian>()?;
        let surface_height = r.read_i32::<BigEndian>()?;
        let surface_type = r.read_i32::<BigEndian>()?;
        let sat_zenith = r.read_f32::<BigEndian>()?;
        let sat_azimuth = r.read_f32::<BigEndian>()?;
        let sol_zenith = r.read_f32::<BigEndian>()?;
        let sol_azimuth = r.read_f32::<BigEndian>()?;

        let mut tbb = vec![0.0; layout.channels()];
        r.read_f32_into::<BigEndian>(&mut tbb)?;
        let mut avhrr = [0; 13];
        r.read_i32_into::<BigEndian>(&mut avhrr)?;
        let hirs_flag = r.read_i32::<BigEndian>()?;
        let mut prepro = [0; 5];
        r.read_i32_into::<BigEndian>(&mut prepro)?;

        Ok(Self {
            marker,
            time,
            scan_line,
            scan_pos,
            lat,
            lon,
            surface_height,
            surface_type,
            sat_zenith,
            sat_azimuth,
            sol_zenith,
            sol_azimuth,
            tbb,
            avhrr,
            hirs_flag,
            prepro,
            cloud_fraction: r.read_f32::<BigEndian>()?,
            surface_temp: r.read_f32::<BigEndian>()?,
            cloud_top_temp: r.read_f32::<BigEndian>()?,
            end_marker: r.read_i32::<BigEndian>()?,
        })
    }

    /// Packs the fields with `layout` and returns the resulting record.
    pub fn encode(&self, layout: &RecordLayout) -> Result<Record, Error> {
        if self.tbb.len() != layout.channels() {
            return Err(Error::Format(format!(
                "observation has {} channels, layout expects {}",
                self.tbb.len(),
                layout.channels()
            )));
        }

        let mut w = Vec::with_capacity(layout.record_len());
        w.write_i32::<BigEndian>(self.marker)?;
        for part in [
            self.time.year(),
            self.time.month() as i32,
            self.time.day() as i32,
            self.time.hour() as i32,
            self.time.minute() as i32,
            self.time.second() as i32,
        ] {
            w.write_i32::<BigEndian>(part)?;
        }
        w.write_i32::<BigEndian>(self.scan_line)?;
        w.write_i32::<BigEndian>(self.scan_pos)?;
        w.write_f32::<BigEndian>(self.lat)?;
        w.write_f32::<BigEndian>(self.lon)?;
        w.write_i32::<BigEndian>(self.surface_height)?;
        w.write_i32::<BigEndian>(self.surface_type)?;
        for angle in [self.sat_zenith, self.sat_azimuth, self.sol_zenith, self.sol_azimuth] {
            w.write_f32::<BigEndian>(angle)?;
        }
        for t in &self.tbb {
            w.write_f32::<BigEndian>(*t)?;
        }
        for flag in self.avhrr.iter().chain([self.hirs_flag].iter()).chain(self.prepro.iter()) {
            w.write_i32::<BigEndian>(*flag)?;
        }
        for v in [self.cloud_fraction, self.surface_temp, self.cloud_top_temp] {
            w.write_f32::<BigEndian>(v)?;
        }
        w.write_i32::<BigEndian>(self.end_marker)?;
        w.flush()?;

        layout.decode(&w).map(|(record, _)| record)
    }
}
