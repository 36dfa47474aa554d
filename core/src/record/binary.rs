//! Binary record sink
//!
//! Layout, all little-endian:
//!
//! | offset | size | field                       |
//! |--------|------|-----------------------------|
//! | 0      | 8    | magic `PWREC001`            |
//! | 8      | 8    | u64 record count            |
//! | 16     | 48·n | records                     |
//!
//! Each record:
//!
//! | offset | size | field                       |
//! |--------|------|-----------------------------|
//! | 0      | 4    | i32 bounces                 |
//! | 4      | 4    | f32 distance                |
//! | 8      | 12   | 3×f32 position              |
//! | 20     | 12   | 3×f32 direction             |
//! | 32     | 4    | f32 weight                  |
//! | 36     | 4    | i32 detector x              |
//! | 40     | 4    | i32 detector y              |
//! | 44     | 4    | reserved, written as 0      |
//!
//! Detector coordinates are −1 when the path has no detector pixel.

use super::{PathRecord, RecordSink};
use crate::error::{Error, Result};
use crate::geometry::*;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// File signature.
pub const RECORD_MAGIC: &[u8; 8] = b"PWREC001";

/// Size of one encoded record in bytes.
pub const RECORD_SIZE: usize = 48;

const COUNT_OFFSET: u64 = 8;

/// Appends fixed size binary records. The count in the header is written as
/// 0 on open and patched on close, so the file can grow without limit.
pub struct BinaryRecordSink<W: Write + Seek + Send = BufWriter<File>> {
    out: W,
    count: u64,
}

impl BinaryRecordSink {
    /// Creates the file, truncating an existing one.
    ///
    /// * `path` - Output file path.
    pub fn create(path: &Path) -> Result<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write + Seek + Send> BinaryRecordSink<W> {
    /// Wraps a writer and writes the header.
    ///
    /// * `out` - The writer, positioned at the start of the output.
    pub fn new(mut out: W) -> Result<Self> {
        out.write_all(RECORD_MAGIC)?;
        out.write_u64::<LittleEndian>(0)?;
        Ok(Self { out, count: 0 })
    }

    fn write_record(&mut self, r: &PathRecord) -> Result<()> {
        let (dx, dy) = r.detector.map_or((-1, -1), |p| (p.x, p.y));
        let w = &mut self.out;
        w.write_i32::<LittleEndian>(r.bounces)?;
        w.write_f32::<LittleEndian>(r.distance)?;
        for v in [r.position.x, r.position.y, r.position.z] {
            w.write_f32::<LittleEndian>(v)?;
        }
        for v in [r.direction.x, r.direction.y, r.direction.z] {
            w.write_f32::<LittleEndian>(v)?;
        }
        w.write_f32::<LittleEndian>(r.weight)?;
        w.write_i32::<LittleEndian>(dx)?;
        w.write_i32::<LittleEndian>(dy)?;
        w.write_u32::<LittleEndian>(0)?;
        Ok(())
    }

    /// Patches the record count into the header, flushes and returns the
    /// writer.
    pub fn finish(mut self) -> Result<W> {
        let end = self.out.stream_position()?;
        self.out.seek(SeekFrom::Start(COUNT_OFFSET))?;
        self.out.write_u64::<LittleEndian>(self.count)?;
        self.out.seek(SeekFrom::Start(end))?;
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write + Seek + Send> RecordSink for BinaryRecordSink<W> {
    fn append(&mut self, records: &[PathRecord]) -> Result<()> {
        for r in records {
            self.write_record(r)?;
        }
        self.count += records.len() as u64;
        Ok(())
    }

    fn len(&self) -> u64 {
        self.count
    }

    fn close(self: Box<Self>) -> Result<()> {
        (*self).finish().map(|_| ())
    }
}

/// Reads every record of a binary record stream. Launch pixel and sample
/// index are not stored and come back as defaults.
///
/// * `input` - The reader, positioned at the start of the stream.
pub fn read_records<R: Read>(mut input: R) -> Result<Vec<PathRecord>> {
    let mut magic = [0_u8; 8];
    input.read_exact(&mut magic)?;
    if &magic != RECORD_MAGIC {
        return Err(Error::Io(std::io::Error::new(
            ErrorKind::InvalidData,
            "not a path record file",
        )));
    }

    let count = input.read_u64::<LittleEndian>()?;
    let mut records = Vec::with_capacity(count.min(1 << 20) as usize);
    for _ in 0..count {
        let bounces = input.read_i32::<LittleEndian>()?;
        let distance = input.read_f32::<LittleEndian>()?;
        let mut v = [0.0; 7];
        for x in v.iter_mut() {
            *x = input.read_f32::<LittleEndian>()?;
        }
        let dx = input.read_i32::<LittleEndian>()?;
        let dy = input.read_i32::<LittleEndian>()?;
        let _reserved = input.read_u32::<LittleEndian>()?;
        records.push(PathRecord {
            bounces,
            distance,
            position: Point3f::new(v[0], v[1], v[2]),
            direction: Vector3f::new(v[3], v[4], v[5]),
            weight: v[6],
            detector: (dx >= 0 && dy >= 0).then(|| Point2i::new(dx, dy)),
            ..Default::default()
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_record(bounces: i32, detector: Option<Point2i>) -> PathRecord {
        PathRecord {
            bounces,
            distance: 3.25,
            position: Point3f::new(1.0, -2.0, 0.5),
            direction: Vector3f::new(0.0, 0.0, -1.0),
            weight: 1.0,
            detector,
            ..Default::default()
        }
    }

    #[test]
    fn header_count_is_patched_on_finish() {
        let mut sink = BinaryRecordSink::new(Cursor::new(Vec::new())).unwrap();
        sink.append(&[sample_record(1, None)]).unwrap();
        sink.append(&[sample_record(2, Some(Point2i::new(3, 4)))]).unwrap();
        let bytes = sink.finish().unwrap().into_inner();

        assert_eq!(&bytes[0..8], RECORD_MAGIC);
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 2);
        assert_eq!(bytes.len(), 16 + 2 * RECORD_SIZE);
    }

    #[test]
    fn records_read_back() {
        let written = vec![sample_record(1, None), sample_record(4, Some(Point2i::new(9, 0)))];
        let mut sink = BinaryRecordSink::new(Cursor::new(Vec::new())).unwrap();
        sink.append(&written).unwrap();
        let bytes = sink.finish().unwrap().into_inner();
        assert_eq!(bytes.len(), 16 + written.len() * RECORD_SIZE);

        let read = read_records(Cursor::new(bytes)).unwrap();
        assert_eq!(read, written);
    }

    #[test]
    fn record_fields_sit_at_fixed_offsets() {
        let mut sink = BinaryRecordSink::new(Cursor::new(Vec::new())).unwrap();
        sink.append(&[sample_record(7, Some(Point2i::new(5, 6))), sample_record(8, None)])
            .unwrap();
        let bytes = sink.finish().unwrap().into_inner();

        let word = |offset: usize| <[u8; 4]>::try_from(&bytes[offset..offset + 4]).unwrap();
        let second = 16 + RECORD_SIZE;
        assert_eq!(i32::from_le_bytes(word(16)), 7);
        assert_eq!(f32::from_le_bytes(word(16 + 4)), 3.25);
        assert_eq!(i32::from_le_bytes(word(16 + 36)), 5);
        assert_eq!(i32::from_le_bytes(word(16 + 40)), 6);
        assert_eq!(u32::from_le_bytes(word(16 + 44)), 0);
        assert_eq!(i32::from_le_bytes(word(second)), 8);
        assert_eq!(i32::from_le_bytes(word(second + 36)), -1);
        assert_eq!(bytes.len(), second + RECORD_SIZE);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let bytes = b"NOTRECS!\0\0\0\0\0\0\0\0".to_vec();
        assert!(read_records(Cursor::new(bytes)).is_err());
    }

    #[test]
    fn file_sink_via_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paths.bin");
        let mut sink = super::super::create_sink(&path).unwrap();
        sink.append(&[sample_record(1, None)]).unwrap();
        sink.close().unwrap();

        let read = read_records(File::open(&path).unwrap()).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].bounces, 1);
    }
}
