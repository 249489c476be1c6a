//! Fixed-width binary observation records

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use byteorder::{BigEndian, ReadBytesExt};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::window::Error;

mod observation;

#[cfg(test)]
mod tests;

pub use observation::{Observation, MDI, RMDI};

/// Every timestamp in the crate is a UTC wall-clock instant with second precision.
pub type Timestamp = DateTime<Utc>;

// Word counts around the channel block, all fields are 4 bytes wide.
const HEADER_WORDS: usize = 9 + 2 + 2 + 4;
const TRAILER_WORDS: usize = 13 + 1 + 5 + 3 + 1;
const WORD: usize = 4;

// Byte offset of the year field, directly after the leading record marker.
const TIME_OFFSET: usize = WORD;

/// Byte layout of one record for a given channel count.
///
/// Header: marker, year, month, day, hour, minute, second, scan line,
/// scan position, lat, lon, surface height, surface type and four angles.
/// Then one big-endian `f32` per channel, then the auxiliary trailer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    channels: usize,
}

impl RecordLayout {
    pub fn new(channels: usize) -> Result<Self, Error> {
        if channels == 0 {
            return Err(Error::Configuration(
                "record layout needs at least one channel".to_string(),
            ));
        }
        Ok(Self { channels })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Record length in bytes, derived purely from the channel count.
    pub fn record_len(&self) -> usize {
        (HEADER_WORDS + self.channels + TRAILER_WORDS) * WORD
    }

    /// Splits raw bytes into an opaque record and its observation time.
    pub fn decode(&self, raw: &[u8]) -> Result<(Record, Timestamp), Error> {
        if raw.len() != self.record_len() {
            return Err(Error::Format(format!(
                "expected {} bytes per record for {} channels, got {}",
                self.record_len(),
                self.channels,
                raw.len()
            )));
        }

        let time = decode_timestamp(&raw[TIME_OFFSET..TIME_OFFSET + 6 * WORD])?;
        Ok((Record { bytes: Arc::from(raw) }, time))
    }

    /// Returns the exact bytes the record was decoded from.
    pub fn encode<'a>(&self, record: &'a Record) -> &'a [u8] {
        record.as_bytes()
    }
}

/// One observation, carried as the verbatim bytes it was read from.
///
/// Cloning is cheap and shares the payload, which is never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    bytes: Arc<[u8]>,
}

impl Record {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn decode_timestamp(fields: &[u8]) -> Result<Timestamp, Error> {
    let mut cursor = Cursor::new(fields);
    let mut parts = [0i32; 6];
    for part in parts.iter_mut() {
        *part = cursor.read_i32::<BigEndian>()?;
    }
    let [year, month, day, hour, minute, second] = parts;

    let naive = u32::try_from(month)
        .ok()
        .zip(u32::try_from(day).ok())
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        .zip(u32::try_from(hour).ok())
        .zip(u32::try_from(minute).ok())
        .zip(u32::try_from(second).ok())
        .and_then(|(((date, h), mi), s)| date.and_hms_opt(h, mi, s))
        .ok_or_else(|| {
            Error::Format(format!(
                "invalid record time {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ))
        })?;

    Ok(Utc.from_utc_datetime(&naive))
}

/// Reads every record of a window file, in file order.
///
/// Reading stops at end of file. A file whose length is not a whole number
/// of records does not match the layout and fails before anything is decoded.
pub fn read_records(path: &Path, layout: &RecordLayout) -> Result<Vec<(Record, Timestamp)>, Error> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    let file_len = file.metadata()?.len();
    let record_len = layout.record_len() as u64;
    if file_len % record_len != 0 {
        return Err(Error::Format(format!(
            "{}: {} bytes is not a whole number of {}-byte records ({} channels)",
            path.display(),
            file_len,
            record_len,
            layout.channels()
        )));
    }

    let mut reader = BufReader::new(file);
    let mut buf = vec![0u8; layout.record_len()];
    let mut records = Vec::with_capacity((file_len / record_len) as usize);
    loop {
        let n = read_chunk(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        let decoded = layout.decode(&buf[..n]).map_err(|e| match e {
            Error::Format(msg) => Error::Format(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        records.push(decoded);
    }
    Ok(records)
}

/// Fills `buf` as far as the reader allows and returns the byte count.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
