//! Path records and the sinks that persist them

mod binary;
mod path_record;
mod text;

// Re-export
pub use binary::*;
pub use path_record::*;
pub use text::*;

use crate::error::Result;
use std::path::Path;

/// Destination for batches of path records. A sink is created open, accepts
/// any number of `append` calls and must be closed to flush trailing data.
pub trait RecordSink: Send {
    /// Appends a batch of records.
    ///
    /// * `records` - The records.
    fn append(&mut self, records: &[PathRecord]) -> Result<()>;

    /// Returns the number of records written so far.
    fn len(&self) -> u64;

    /// Returns true if nothing was written.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flushes and finalises the output.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Creates a sink for the given path. A `.txt` extension selects the text
/// format; any other path gets the binary format.
///
/// * `path` - Output file path.
pub fn create_sink(path: &Path) -> Result<Box<dyn RecordSink>> {
    let is_text = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("txt"));

    if is_text {
        Ok(Box::new(TextRecordSink::create(path)?))
    } else {
        Ok(Box::new(BinaryRecordSink::create(path)?))
    }
}
