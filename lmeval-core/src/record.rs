//! Types and traits for recording evaluation metrics.
//!
//! * [`Record`] - a container of key-value pairs
//! * [`RecordValue`] - the values a [`Record`] can hold
//! * [`Recorder`] - writes records to an output destination
//! * [`BufferedRecorder`] - keeps records in memory
//! * [`NullRecorder`] - discards all records
//!
//! ```rust
//! use lmeval_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("mean_score", 2.5).with_step(100);
//! record.insert("max_score", RecordValue::Scalar(4.0));
//! assert_eq!(record.get_scalar("mean_score").unwrap(), 2.5);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
