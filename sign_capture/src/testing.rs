//! Deterministic stand-ins for the camera, detector, window, prompt, store
//! and classifier.  Each one appends to a shared [`EventLog`] so tests can
//! check ordering as well as counts.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use sign_dataset::{DatasetStore, Label, LabelPrompt, LandmarkSet, Sample, StorageError, FEATURE_LEN};
use sign_model::GestureClassifier;

use crate::detector::{HandLandmarkDetector, SimHandDetector};
use crate::devices::Devices;
use crate::error::AppError;
use crate::frame::{Frame, FrameSource};
use crate::visualizer::{Command, Overlay, Screen};

pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.borrow().clone()
}

// ── Frame source ──────────────────────────────────────────────────────────

/// `false` in the script is a missed read; past the script every read
/// succeeds.
pub struct ScriptedSource {
    pub script: VecDeque<bool>,
    pub next:   u64,
    pub log:    EventLog,
}

impl ScriptedSource {
    pub fn new(script: &[bool], log: &EventLog) -> Self {
        ScriptedSource { script: script.iter().copied().collect(), next: 0, log: log.clone() }
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if !self.script.pop_front().unwrap_or(true) {
            self.log.borrow_mut().push("miss".to_string());
            return None;
        }
        let index = self.next;
        self.next += 1;
        self.log.borrow_mut().push(format!("frame {}", index));
        Some(Frame::filled(index, 8, 6, 0x202020))
    }
}

impl Drop for ScriptedSource {
    fn drop(&mut self) {
        self.log.borrow_mut().push("source released".to_string());
    }
}

// ── Detector ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sight {
    Hand,
    NoHand,
    Fail,
}

/// Follows the script, then repeats `after`.
pub struct ScriptedDetector {
    pub script: VecDeque<Sight>,
    pub after:  Sight,
}

impl ScriptedDetector {
    pub fn always(sight: Sight) -> Self {
        ScriptedDetector { script: VecDeque::new(), after: sight }
    }

    pub fn new(script: &[Sight], after: Sight) -> Self {
        ScriptedDetector { script: script.iter().copied().collect(), after }
    }
}

impl HandLandmarkDetector for ScriptedDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, AppError> {
        match self.script.pop_front().unwrap_or(self.after) {
            Sight::Hand   => Ok(Some(SimHandDetector::pose(frame.index as f32))),
            Sight::NoHand => Ok(None),
            Sight::Fail   => Err(AppError::Detector("scripted failure".to_string())),
        }
    }
}

// ── Screen ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Rendered {
    pub status:   Vec<String>,
    pub headline: Option<String>,
    pub feedback: Option<String>,
    pub hand:     bool,
}

/// One scripted poll result per call; `Exit` once the script runs out.
pub struct ScriptedScreen {
    pub commands: VecDeque<Option<Command>>,
    pub renders:  Rc<RefCell<Vec<Rendered>>>,
    pub log:      EventLog,
}

impl ScriptedScreen {
    pub fn new(commands: &[Option<Command>], log: &EventLog) -> Self {
        ScriptedScreen {
            commands: commands.iter().copied().collect(),
            renders:  Rc::new(RefCell::new(Vec::new())),
            log:      log.clone(),
        }
    }
}

impl Screen for ScriptedScreen {
    fn is_open(&self) -> bool { true }

    fn render(&mut self, _frame: &Frame, overlay: &Overlay<'_>) {
        self.renders.borrow_mut().push(Rendered {
            status:   overlay.status.clone(),
            headline: overlay.headline.clone(),
            feedback: overlay.feedback.clone(),
            hand:     overlay.hand.is_some(),
        });
    }

    fn poll_command(&mut self) -> Option<Command> {
        self.commands.pop_front().unwrap_or(Some(Command::Exit))
    }
}

impl Drop for ScriptedScreen {
    fn drop(&mut self) {
        self.log.borrow_mut().push("screen released".to_string());
    }
}

pub fn devices(source: ScriptedSource, detector: ScriptedDetector, screen: ScriptedScreen) -> Devices {
    Devices {
        source:   Box::new(source),
        detector: Box::new(detector),
        screen:   Box::new(screen),
    }
}

// ── Prompt ────────────────────────────────────────────────────────────────

pub struct ScriptedPrompt {
    pub answers: VecDeque<String>,
    pub log:     EventLog,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str], log: &EventLog) -> Self {
        ScriptedPrompt { answers: answers.iter().map(|s| s.to_string()).collect(), log: log.clone() }
    }
}

impl LabelPrompt for ScriptedPrompt {
    fn request(&mut self, current: &Label) -> String {
        self.log.borrow_mut().push(format!("prompt {}", current));
        self.answers.pop_front().unwrap_or_default()
    }
}

// ── Store ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MemoryStore {
    pub rows: Rc<RefCell<Vec<Sample>>>,
    pub fail: bool,
    pub log:  EventLog,
}

impl MemoryStore {
    pub fn new(log: &EventLog) -> Self {
        MemoryStore { rows: Rc::new(RefCell::new(Vec::new())), fail: false, log: log.clone() }
    }

    pub fn failing(log: &EventLog) -> Self {
        MemoryStore { fail: true, ..MemoryStore::new(log) }
    }

    pub fn labels(&self) -> Vec<String> {
        self.rows.borrow().iter().map(|s| s.label.to_string()).collect()
    }
}

impl DatasetStore for MemoryStore {
    fn write_rows(&mut self, samples: &[Sample]) -> Result<usize, StorageError> {
        if self.fail {
            self.log.borrow_mut().push("flush failed".to_string());
            return Err(StorageError::Write {
                path:   PathBuf::from("memory"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.log.borrow_mut().push(format!("flush {}", samples.len()));
        self.rows.borrow_mut().extend_from_slice(samples);
        Ok(samples.len())
    }
}

// ── Classifier ────────────────────────────────────────────────────────────

pub struct CountingClassifier {
    pub label:      &'static str,
    pub confidence: f32,
    pub calls:      Rc<Cell<usize>>,
}

impl CountingClassifier {
    pub fn new(label: &'static str, confidence: f32) -> Self {
        CountingClassifier { label, confidence, calls: Rc::new(Cell::new(0)) }
    }
}

impl GestureClassifier for CountingClassifier {
    fn predict(&self, _features: &[f32; FEATURE_LEN]) -> String {
        self.calls.set(self.calls.get() + 1);
        self.label.to_string()
    }

    fn predict_confidence(&self, _features: &[f32; FEATURE_LEN]) -> f32 {
        self.confidence
    }
}
