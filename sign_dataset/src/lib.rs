//! # sign_dataset
//!
//! Everything that turns a detected hand into a durable training row:
//!
//! * [`LandmarkSet`]: the 21-point hand pose returned by a detector, and its
//!   63-float flattened form.
//! * [`Label`] and [`LabelController`]: the tag stamped on every sample and
//!   the small state machine that changes it.
//! * [`SampleRecorder`]: the pending [`SampleBuffer`], its [`FlushPolicy`],
//!   and the [`DatasetStore`] it flushes into.
//! * [`CsvDatasetStore`] / [`read_dataset`]: the append-only CSV file.
//!
//! ## Flush guarantee
//!
//! Every committed sample reaches the store exactly once: automatically when
//! the buffer reaches the threshold (10 by default), or in the single
//! `final_flush` the driver performs when its loop ends.
//!
//! ```rust,no_run
//! use sign_dataset::{CsvDatasetStore, FlushPolicy, Label, SampleRecorder, FEATURE_LEN};
//!
//! let store = CsvDatasetStore::new("data/landmarks.csv");
//! let mut rec = SampleRecorder::new(store, FlushPolicy::default());
//!
//! rec.append([0.0; FEATURE_LEN], Label::default());
//! rec.maybe_flush().unwrap();
//! rec.final_flush().unwrap();
//! ```

pub mod error;
pub mod landmarks;
pub mod label;
pub mod buffer;
pub mod store;

pub use error::{LandmarkError, StorageError};
pub use landmarks::{LandmarkSet, Point3, FEATURE_LEN, LANDMARK_COUNT, HAND_CONNECTIONS};
pub use label::{read_answer, Label, LabelChange, LabelController, LabelPrompt, LabelState, StdinPrompt};
pub use buffer::{FlushPolicy, Sample, SampleBuffer, SampleRecorder, DEFAULT_FLUSH_THRESHOLD};
pub use store::{csv_header, read_dataset, CsvDatasetStore, DatasetStore};
