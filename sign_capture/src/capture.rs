//! Capture mode: label hand poses and save them to the dataset.
//!
//! `CaptureSession` owns the devices, the [`LabelController`], and the
//! [`SampleRecorder`].  One [`tick`](CaptureSession::tick) processes exactly
//! one frame:
//!
//! 1. resolve a pending label change (blocks on the operator, no frame read);
//! 2. read a frame; a miss ends the tick;
//! 3. detect the hand;
//! 4. render the status block and, with a hand, its skeleton;
//! 5. act on at most one key: `S` save, `C` change label, `Esc` exit.
//!
//! [`run`](CaptureSession::run) ends with exactly one `final_flush`, then
//! releases the camera and the window, on every exit path.

use sign_dataset::{
    DatasetStore, LabelChange, LabelController, LabelPrompt, LandmarkSet, SampleRecorder,
};

use crate::config::AppConfig;
use crate::devices::Devices;
use crate::error::AppError;
use crate::visualizer::{Command, Overlay};

pub const CAPTURE_LEGEND: &str = "S=SAVE  C=CHANGE LABEL  ESC=EXIT";

/// What one tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No frame this tick; nothing rendered, no key polled.
    FrameMissed,
    Processed { hand: bool, command: Option<Command> },
}

/// Counts reported when a session ends cleanly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Samples written this session.
    pub samples:      usize,
    /// Threshold-triggered flushes.
    pub auto_flushes: usize,
    /// Rows written by the final flush.
    pub final_rows:   usize,
}

// ════════════════════════════════════════════════════════════════════════════
// start
// ════════════════════════════════════════════════════════════════════════════

/// Validate `config`, then open the devices with `open`.  When opening fails
/// the store is dropped untouched.
pub fn start<S, F>(
    config: &AppConfig,
    store:  S,
    prompt: Box<dyn LabelPrompt>,
    open:   F,
) -> Result<CaptureSession<S>, AppError>
where
    S: DatasetStore,
    F: FnOnce(&AppConfig) -> Result<Devices, AppError>,
{
    let policy = config.flush_policy()?;
    let label  = config.initial_label()?;
    let devices = open(config)?;

    Ok(CaptureSession {
        devices,
        prompt,
        labels:   LabelController::new(label),
        recorder: SampleRecorder::new(store, policy),
        running:  true,
        feedback: None,
    })
}

// ════════════════════════════════════════════════════════════════════════════
// CaptureSession
// ════════════════════════════════════════════════════════════════════════════

pub struct CaptureSession<S: DatasetStore> {
    devices:  Devices,
    prompt:   Box<dyn LabelPrompt>,
    labels:   LabelController,
    recorder: SampleRecorder<S>,
    running:  bool,
    /// Last operator-facing message, shown at the bottom of the window.
    feedback: Option<String>,
}

impl<S: DatasetStore> CaptureSession<S> {
    pub fn is_running(&self) -> bool          { self.running }
    pub fn labels(&self) -> &LabelController  { &self.labels }
    pub fn recorder(&self) -> &SampleRecorder<S> { &self.recorder }

    // ── one tick ──────────────────────────────────────────────────────────

    pub fn tick(&mut self) -> Result<TickOutcome, AppError> {
        if self.labels.is_prompting() {
            self.resolve_label();
        }

        let frame = match self.devices.source.next_frame() {
            Some(f) => f,
            None    => return Ok(TickOutcome::FrameMissed),
        };

        let hand = match self.devices.detector.detect(&frame) {
            Ok(h) => h,
            Err(e) => {
                log::warn!("landmark detection failed: {}", e);
                None
            }
        };

        let overlay = Overlay {
            status:   self.status_lines(),
            legend:   Some(CAPTURE_LEGEND),
            headline: None,
            feedback: self.feedback.clone(),
            hand:     hand.as_ref(),
        };
        self.devices.screen.render(&frame, &overlay);

        let command = self.devices.screen.poll_command();
        match command {
            Some(Command::Capture) => self.capture(hand.as_ref())?,
            Some(Command::Relabel) => {
                self.labels.request_change();
                self.feedback = Some("ENTER THE NEW LABEL IN THE TERMINAL".to_string());
            }
            Some(Command::Exit) => {
                log::info!("exit requested");
                self.running = false;
            }
            None => {}
        }

        Ok(TickOutcome::Processed { hand: hand.is_some(), command })
    }

    fn capture(&mut self, hand: Option<&LandmarkSet>) -> Result<(), AppError> {
        let hand = match hand {
            Some(h) => h,
            None => {
                self.feedback = Some("NO HAND DETECTED - NOTHING SAVED".to_string());
                log::debug!("capture ignored: no hand in frame");
                return Ok(());
            }
        };

        let label = self.labels.current().clone();
        self.recorder.append(hand.flatten(), label.clone());
        log::info!("sample {} saved for {}", self.recorder.pending(), label);

        let written = self.recorder.maybe_flush()?;
        self.feedback = Some(if written > 0 {
            format!("SAVED {} SAMPLES TO DISK", written)
        } else {
            format!("SAMPLE {} SAVED FOR {}", self.recorder.pending(), label)
        });
        Ok(())
    }

    fn resolve_label(&mut self) {
        match self.labels.resolve(&mut *self.prompt) {
            Some(LabelChange::Changed { from, to }) => {
                log::info!("label changed {} -> {}", from, to);
                self.feedback = Some(format!("LABEL NOW {}", to));
            }
            Some(LabelChange::Kept { rejected }) => {
                log::info!("label kept at {} (rejected {:?})", self.labels.current(), rejected);
                self.feedback = Some(format!("LABEL KEPT AT {}", self.labels.current()));
            }
            None => {}
        }
    }

    fn status_lines(&self) -> Vec<String> {
        vec![
            format!("LABEL: {}", self.labels.current()),
            format!("PENDING: {}", self.recorder.pending()),
            format!("TOTAL: {}", self.recorder.session_total()),
        ]
    }

    // ── whole session ─────────────────────────────────────────────────────

    /// Tick until exit, then flush and release.  A storage error inside a
    /// tick stops the loop and is returned after cleanup.
    pub fn run(mut self) -> Result<SessionSummary, AppError> {
        let outcome = self.drive();
        self.finish(outcome)
    }

    fn drive(&mut self) -> Result<(), AppError> {
        while self.running && self.devices.screen.is_open() {
            self.tick()?;
        }
        Ok(())
    }

    fn finish(self, outcome: Result<(), AppError>) -> Result<SessionSummary, AppError> {
        let CaptureSession { devices, mut recorder, .. } = self;

        let auto_flushes = recorder.flush_events();
        let flushed = recorder.final_flush();
        devices.release();

        match (outcome, flushed) {
            (Err(e), Err(again)) => {
                log::error!("final flush skipped: {}", again);
                Err(e)
            }
            (Err(e), Ok(_)) => Err(e),
            (Ok(()), Err(e)) => Err(e.into()),
            (Ok(()), Ok(final_rows)) => {
                log::info!(
                    "session saved {} samples ({} automatic flushes, {} in final flush)",
                    recorder.flushed(), auto_flushes, final_rows
                );
                Ok(SessionSummary { samples: recorder.flushed(), auto_flushes, final_rows })
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
