//! Recognition mode: classify the live hand with a trained model.
//!
//! The model is loaded before any device is opened, so a missing or corrupt
//! model file never leaves a window behind.  Per tick the current prediction
//! (or a prompt to show a hand) is drawn as the headline; only `Esc` is
//! honoured.

use std::path::Path;

use sign_model::{GestureClassifier, ModelError, Prediction};

use crate::config::AppConfig;
use crate::devices::Devices;
use crate::error::AppError;
use crate::visualizer::{Command, Overlay};

pub const SHOW_HAND_PROMPT: &str = "SHOW A HAND TO THE CAMERA";
pub const RECOGNIZE_LEGEND: &str = "ESC=EXIT";

#[derive(Clone, Debug, PartialEq)]
pub enum RecognitionOutcome {
    FrameMissed,
    NoHand,
    Predicted(Prediction),
}

/// Load the model from `config.model_path`, then open the devices.
pub fn start<C, L, F>(config: &AppConfig, load: L, open: F) -> Result<Recognizer<C>, AppError>
where
    C: GestureClassifier,
    L: FnOnce(&Path) -> Result<C, ModelError>,
    F: FnOnce(&AppConfig) -> Result<Devices, AppError>,
{
    let classifier = load(&config.model_path)?;
    log::info!("model loaded from {}", config.model_path.display());
    let devices = open(config)?;
    Ok(Recognizer { devices, classifier, running: true })
}

pub struct Recognizer<C: GestureClassifier> {
    devices:    Devices,
    classifier: C,
    running:    bool,
}

impl<C: GestureClassifier> Recognizer<C> {
    pub fn is_running(&self) -> bool { self.running }

    pub fn tick(&mut self) -> RecognitionOutcome {
        let frame = match self.devices.source.next_frame() {
            Some(f) => f,
            None    => return RecognitionOutcome::FrameMissed,
        };

        let hand = self.devices.detector.detect(&frame).unwrap_or_else(|e| {
            log::warn!("landmark detection failed: {}", e);
            None
        });

        let prediction = hand.as_ref().map(|h| self.classifier.classify(&h.flatten()));
        let headline = match &prediction {
            Some(p) => p.to_string(),
            None    => SHOW_HAND_PROMPT.to_string(),
        };

        let overlay = Overlay {
            legend:   Some(RECOGNIZE_LEGEND),
            headline: Some(headline),
            hand:     hand.as_ref(),
            ..Overlay::default()
        };
        self.devices.screen.render(&frame, &overlay);

        if self.devices.screen.poll_command() == Some(Command::Exit) {
            log::info!("exit requested");
            self.running = false;
        }

        match prediction {
            Some(p) => {
                log::trace!("predicted {}", p);
                RecognitionOutcome::Predicted(p)
            }
            None => RecognitionOutcome::NoHand,
        }
    }

    /// Tick until exit or window close, then release the devices.
    pub fn run(mut self) {
        while self.running && self.devices.screen.is_open() {
            self.tick();
        }
        self.devices.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn recognizer(
        classifier: CountingClassifier,
        frames:     &[bool],
        sights:     ScriptedDetector,
        commands:   &[Option<Command>],
        log:        &EventLog,
    ) -> (Recognizer<CountingClassifier>, std::rc::Rc<std::cell::RefCell<Vec<Rendered>>>) {
        let screen = ScriptedScreen::new(commands, log);
        let renders = screen.renders.clone();
        let devs = devices(ScriptedSource::new(frames, log), sights, screen);
        let r = start(&AppConfig::default(), |_| Ok(classifier), |_| Ok(devs)).unwrap();
        (r, renders)
    }

    #[test]
    fn no_hand_shows_prompt_and_skips_classifier() {
        let log = event_log();
        let clf = CountingClassifier::new("A", 0.9);
        let calls = clf.calls.clone();
        let (mut r, renders) = recognizer(clf, &[], ScriptedDetector::always(Sight::NoHand), &[None, None], &log);

        assert_eq!(r.tick(), RecognitionOutcome::NoHand);
        assert_eq!(r.tick(), RecognitionOutcome::NoHand);
        assert_eq!(calls.get(), 0);
        assert!(renders.borrow().iter().all(|x| x.headline.as_deref() == Some(SHOW_HAND_PROMPT)));
    }

    #[test]
    fn hand_shows_prediction_with_percent() {
        let log = event_log();
        let clf = CountingClassifier::new("A", 0.95);
        let calls = clf.calls.clone();
        let (mut r, renders) = recognizer(clf, &[], ScriptedDetector::always(Sight::Hand), &[None], &log);

        let expected = Prediction { label: "A".to_string(), confidence: 0.95 };
        assert_eq!(r.tick(), RecognitionOutcome::Predicted(expected));
        assert_eq!(calls.get(), 1);
        let last = renders.borrow().last().cloned().unwrap();
        assert_eq!(last.headline.as_deref(), Some("A (95%)"));
        assert!(last.hand);
    }

    #[test]
    fn capture_keys_are_ignored() {
        let log = event_log();
        let commands = [Some(Command::Capture), Some(Command::Relabel), Some(Command::Exit)];
        let (mut r, _) = recognizer(
            CountingClassifier::new("B", 0.5), &[], ScriptedDetector::always(Sight::Hand), &commands, &log,
        );
        r.tick();
        r.tick();
        assert!(r.is_running());
        r.tick();
        assert!(!r.is_running());
    }

    #[test]
    fn missed_frame_renders_nothing() {
        let log = event_log();
        let (mut r, renders) = recognizer(
            CountingClassifier::new("A", 1.0), &[false], ScriptedDetector::always(Sight::Hand), &[None], &log,
        );
        assert_eq!(r.tick(), RecognitionOutcome::FrameMissed);
        assert!(renders.borrow().is_empty());
    }

    #[test]
    fn run_releases_devices_on_exit() {
        let log = event_log();
        let (r, renders) = recognizer(
            CountingClassifier::new("A", 1.0), &[], ScriptedDetector::always(Sight::NoHand), &[None, None], &log,
        );
        r.run();
        assert_eq!(renders.borrow().len(), 3);
        let ev = events(&log);
        assert!(ev.ends_with(&["source released".to_string(), "screen released".to_string()]));
    }

    #[test]
    fn model_failure_opens_nothing() {
        let mut opened = false;
        let result: Result<Recognizer<CountingClassifier>, AppError> = start(
            &AppConfig::default(),
            |p| Err(ModelError::Invalid(format!("{} missing", p.display()))),
            |_| {
                opened = true;
                Err(AppError::Display("unused".to_string()))
            },
        );
        assert!(matches!(result, Err(AppError::ModelUnavailable(_))));
        assert!(!opened);
    }
}
