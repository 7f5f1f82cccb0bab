use super::{Record, Recorder};

/// Keeps written records in memory.
///
/// Used to inspect metrics in tests and to collect per-trigger results
/// before exporting them.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// The number of records written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the values of the scalar `key` in the order they were written.
    ///
    /// Records without the key are skipped.
    pub fn scalars(&self, key: &str) -> Vec<f32> {
        self.buf
            .iter()
            .filter_map(|r| r.get_scalar(key).ok())
            .collect()
    }

    /// Returns the steps of the records in the order they were written.
    ///
    /// Records without a step are skipped.
    pub fn steps(&self) -> Vec<usize> {
        self.buf.iter().filter_map(|r| r.step()).collect()
    }
}

impl Recorder for BufferedRecorder {
    /// Write a [`Record`] to the buffer.
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }
}
