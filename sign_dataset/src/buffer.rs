//! Pending-sample buffer and its flush policy.
//!
//! [`SampleBuffer`] only accumulates; [`FlushPolicy`] only decides;
//! [`SampleRecorder`] ties them to a [`DatasetStore`] and keeps the counters
//! the status bar shows.

use crate::error::StorageError;
use crate::label::Label;
use crate::landmarks::FEATURE_LEN;
use crate::store::DatasetStore;

/// Samples buffered before an automatic flush.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 10;

// ════════════════════════════════════════════════════════════════════════════
// Sample
// ════════════════════════════════════════════════════════════════════════════

/// One labelled, flattened landmark vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub features: [f32; FEATURE_LEN],
    pub label:    Label,
}

impl Sample {
    pub fn new(features: [f32; FEATURE_LEN], label: Label) -> Self {
        Sample { features, label }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SampleBuffer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct SampleBuffer {
    pending: Vec<Sample>,
}

impl SampleBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        SampleBuffer { pending: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, sample: Sample) {
        self.pending.push(sample);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FlushPolicy
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlushPolicy {
    threshold: usize,
}

impl FlushPolicy {
    /// `None` for a zero threshold.
    pub fn new(threshold: usize) -> Option<Self> {
        (threshold > 0).then_some(FlushPolicy { threshold })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn should_flush(&self, pending: usize) -> bool {
        pending >= self.threshold
    }
}

impl Default for FlushPolicy {
    fn default() -> Self {
        FlushPolicy { threshold: DEFAULT_FLUSH_THRESHOLD }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SampleRecorder
// ════════════════════════════════════════════════════════════════════════════

/// Buffer + policy + store.
///
/// A failed write leaves the buffer intact and poisons the recorder; every
/// later flush returns [`StorageError::Poisoned`] instead of retrying, so a
/// half-written batch can never land twice.
#[derive(Debug)]
pub struct SampleRecorder<S: DatasetStore> {
    store:        S,
    policy:       FlushPolicy,
    buffer:       SampleBuffer,
    flushed:      usize,
    flush_events: usize,
    poisoned:     bool,
}

impl<S: DatasetStore> SampleRecorder<S> {
    pub fn new(store: S, policy: FlushPolicy) -> Self {
        SampleRecorder {
            store,
            policy,
            buffer:       SampleBuffer::with_capacity(policy.threshold()),
            flushed:      0,
            flush_events: 0,
            poisoned:     false,
        }
    }

    /// Buffer one sample.  Callers only reach this with a detected hand.
    pub fn append(&mut self, features: [f32; FEATURE_LEN], label: Label) {
        self.buffer.push(Sample::new(features, label));
    }

    /// Flush iff the buffer has reached the threshold.  Returns rows written.
    pub fn maybe_flush(&mut self) -> Result<usize, StorageError> {
        if self.policy.should_flush(self.buffer.len()) {
            self.flush()
        } else {
            Ok(0)
        }
    }

    /// Write every pending sample and clear the buffer.
    pub fn flush(&mut self) -> Result<usize, StorageError> {
        if self.poisoned {
            return Err(StorageError::Poisoned { unsaved: self.buffer.len() });
        }
        if self.buffer.is_empty() {
            return Ok(0);
        }

        match self.store.write_rows(self.buffer.as_slice()) {
            Ok(rows) => {
                self.flushed      += rows;
                self.flush_events += 1;
                self.buffer.clear();
                log::debug!("flushed {} samples ({} total)", rows, self.flushed);
                Ok(rows)
            }
            Err(e) => {
                self.poisoned = true;
                log::error!("flush failed, {} samples unsaved: {}", self.buffer.len(), e);
                Err(e)
            }
        }
    }

    /// End-of-session flush; writes only when something is pending.
    pub fn final_flush(&mut self) -> Result<usize, StorageError> {
        if self.buffer.is_empty() {
            return Ok(0);
        }
        self.flush()
    }

    pub fn pending(&self) -> usize       { self.buffer.len() }
    pub fn flushed(&self) -> usize       { self.flushed }
    pub fn session_total(&self) -> usize { self.flushed + self.buffer.len() }
    pub fn flush_events(&self) -> usize  { self.flush_events }
    pub fn is_poisoned(&self) -> bool    { self.poisoned }
    pub fn store(&self) -> &S            { &self.store }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
