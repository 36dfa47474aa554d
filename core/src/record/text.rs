//! Text record sink

use super::{PathRecord, RecordSink};
use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes records as blocks of text lines:
///
/// ```text
/// (bounces)
/// {distance}
/// x y z
/// dx dy dz
/// [px py]
/// ```
///
/// The last line is present only when the record has a detector pixel.
pub struct TextRecordSink<W: Write + Send = BufWriter<File>> {
    out: W,
    count: u64,
}

impl TextRecordSink {
    /// Creates the file, truncating an existing one.
    ///
    /// * `path` - Output file path.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write + Send> TextRecordSink<W> {
    /// Wraps a writer.
    ///
    /// * `out` - The writer.
    pub fn new(out: W) -> Self {
        Self { out, count: 0 }
    }

    fn write_record(&mut self, r: &PathRecord) -> Result<()> {
        writeln!(self.out, "({})", r.bounces)?;
        writeln!(self.out, "{{{}}}", r.distance)?;
        writeln!(self.out, "{} {} {}", r.position.x, r.position.y, r.position.z)?;
        writeln!(self.out, "{} {} {}", r.direction.x, r.direction.y, r.direction.z)?;
        if let Some(px) = r.detector {
            writeln!(self.out, "[{} {}]", px.x, px.y)?;
        }
        Ok(())
    }

    /// Flushes and returns the writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write + Send> RecordSink for TextRecordSink<W> {
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
        (*self).into_inner().map(|_| ())
    }
}
