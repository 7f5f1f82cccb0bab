//! Writes evaluation metrics to TensorBoard event files.
use lmeval_core::record::{Record, RecordValue, Recorder};
use log::warn;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Each scalar is written at the step the record is tagged with.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
        }
    }

    /// Flushes written events to disk.
    pub fn flush(&mut self) {
        self.writer.flush();
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// A record without a step is dropped with a warning.
    fn write(&mut self, record: Record) {
        let step = match record.step() {
            Some(step) => step,
            None => {
                warn!("Record without step was dropped: {:?}", record);
                return;
            }
        };

        for (k, v) in record.iter() {
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_write_scalars() {
        let dir = TempDir::new("tensorboard_recorder").unwrap();
        let mut recorder = TensorboardRecorder::new(dir.path());

        let mut record = Record::from_scalar("mean_score", 1.5).with_step(16_777_217);
        record.insert("max_score", RecordValue::Scalar(2.5));
        recorder.write(record);
        recorder.write(Record::from_scalar("max_score", 2.0));
        recorder.flush();
        // Dropping joins the writer thread, which creates the event file.
        drop(recorder);

        let n_files = std::fs::read_dir(dir.path()).unwrap().count();
        assert!(n_files >= 1);
    }
}
