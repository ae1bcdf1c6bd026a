//! Hand landmark extraction by a MediaPipe helper process or a simulator.
//!
//! The public interface is [`HandLandmarkDetector`]; the loops don't know
//! whether landmarks came from a real model or the synthetic generator.

use sign_dataset::{LandmarkSet, Point3, LANDMARK_COUNT};

use crate::error::AppError;
use crate::frame::Frame;

// ════════════════════════════════════════════════════════════════════════════
// HandLandmarkDetector trait
// ════════════════════════════════════════════════════════════════════════════

/// Frame → zero or one hand.
pub trait HandLandmarkDetector {
    /// An `Err` is a per-tick failure; callers log it and treat the frame as
    /// having no hand.
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, AppError>;
}

/// The detector matching the frame source chosen at build time.
pub fn open_detector(cfg: &crate::config::AppConfig) -> Result<Box<dyn HandLandmarkDetector>, AppError> {
    #[cfg(feature = "camera")]
    {
        Ok(Box::new(MediaPipeDetector::spawn(&cfg.detector_command, cfg.min_detection_confidence)?))
    }
    #[cfg(not(feature = "camera"))]
    {
        let _ = cfg;
        Ok(Box::new(SimHandDetector::default()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandDetector: synthetic open hand (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Reports a gently moving open hand for the first `visible` frames of every
/// `period` frames and nothing for the rest, keyed on [`Frame::index`].
pub struct SimHandDetector {
    pub period:  u64,
    pub visible: u64,
}

impl Default for SimHandDetector {
    fn default() -> Self {
        SimHandDetector { period: 120, visible: 90 }
    }
}

impl SimHandDetector {
    pub fn pose(t: f32) -> LandmarkSet {
        let wobble_x = 0.03 * (t * 0.11).sin();
        let wobble_y = 0.02 * (t * 0.07).cos();
        let wrist = Point3::new(0.5 + wobble_x, 0.82 + wobble_y, 0.0);

        let mut pts = [Point3::default(); LANDMARK_COUNT];
        pts[0] = wrist;
        // Thumb … pinky fan out from the wrist, four joints each.
        let angles   = [-1.05f32, -0.45, -0.12, 0.2, 0.5];
        let lengths  = [0.07f32, 0.1, 0.105, 0.1, 0.085];
        let curl     = 0.25 * (t * 0.05).sin().abs();
        for (f, (&a, &len)) in angles.iter().zip(lengths.iter()).enumerate() {
            for j in 0..4 {
                let reach = len * (j as f32 + 1.0) * (1.0 - curl * j as f32 / 4.0);
                let x = wrist.x + reach * a.sin();
                let y = wrist.y - reach * a.cos();
                let z = -0.01 * (j as f32 + 1.0);
                pts[1 + f * 4 + j] = Point3::new(x, y, z);
            }
        }
        LandmarkSet::new(pts)
    }
}

impl HandLandmarkDetector for SimHandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, AppError> {
        if frame.index % self.period.max(1) >= self.visible {
            return Ok(None);
        }
        Ok(Some(SimHandDetector::pose(frame.index as f32)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MediaPipeDetector: helper process (feature = "camera")
// ════════════════════════════════════════════════════════════════════════════

/// Hand landmarks from a MediaPipe helper process.
///
/// # Protocol
///
/// * helper prints `READY` once its model is loaded;
/// * per frame we write `width`, `height`, `channels` as u32 LE followed by
///   the raw RGB bytes;
/// * the helper answers one JSON line:
///   `{"hands":[{"handedness":"Right","score":0.97,"landmarks":[{"x":..,"y":..,"z":..}, …]}],"error":null}`.
///
/// Replies are decoded by [`parse_reply`].  The process is killed on drop,
/// and on a failed handshake.
#[cfg(feature = "camera")]
pub struct MediaPipeDetector {
    process:        std::process::Child,
    reader:         std::io::BufReader<std::process::ChildStdout>,
    min_confidence: f32,
}

// ── Helper reply decoding (always built) ──────────────────────────────────

mod wire {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct PointJson {
        pub x: f32,
        pub y: f32,
        pub z: f32,
    }

    #[derive(Deserialize, Debug)]
    pub struct HandJson {
        #[serde(default)]
        pub handedness: String,
        pub score:      f32,
        pub landmarks:  Vec<PointJson>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Reply {
        #[serde(default)]
        pub hands: Vec<HandJson>,
        #[serde(default)]
        pub error: Option<String>,
    }
}

/// Consume the helper's first line, which must be `READY`.
pub fn await_ready(reader: &mut impl std::io::BufRead) -> Result<(), AppError> {
    let mut ready = String::new();
    match reader.read_line(&mut ready) {
        Ok(_) if ready.trim() == "READY" => Ok(()),
        Ok(0) => Err(AppError::Detector("helper exited before READY".to_string())),
        Ok(_) => Err(AppError::Detector(format!("expected READY, got {:?}", ready.trim()))),
        Err(e) => Err(AppError::Detector(format!("helper did not start: {}", e))),
    }
}

/// Decode one helper reply line into at most one hand.
///
/// An `error` in the reply is a per-tick failure.  Otherwise the first hand
/// scoring at least `min_confidence` with exactly 21 landmarks is returned;
/// hands with any other point count are skipped with a warning.
pub fn parse_reply(line: &str, min_confidence: f32) -> Result<Option<LandmarkSet>, AppError> {
    let reply: wire::Reply = serde_json::from_str(line)
        .map_err(|e| AppError::Detector(format!("bad reply {:?}: {}", line.trim(), e)))?;

    if let Some(err) = reply.error {
        return Err(AppError::Detector(err));
    }

    for hand in reply.hands {
        if hand.score < min_confidence {
            continue;
        }
        let points = hand.landmarks.iter().map(|p| Point3::new(p.x, p.y, p.z)).collect();
        match LandmarkSet::from_points(points) {
            Ok(set) => {
                log::trace!("{} hand, score {:.2}", hand.handedness, hand.score);
                return Ok(Some(set));
            }
            Err(e) => log::warn!("ignoring hand: {}", e),
        }
    }
    Ok(None)
}

#[cfg(feature = "camera")]
impl MediaPipeDetector {
    pub fn spawn(command: &[String], min_confidence: f32) -> Result<Self, AppError> {
        use std::io::BufReader;
        use std::process::{Command, Stdio};

        let (program, args) = command
            .split_first()
            .ok_or_else(|| AppError::Config("detector_command is empty".to_string()))?;

        log::info!("starting hand detector: {}", command.join(" "));
        let mut process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| AppError::Detector(format!("cannot start {}: {}", program, e)))?;

        let handshake = match process.stdout.take() {
            Some(stdout) => {
                let mut reader = BufReader::new(stdout);
                await_ready(&mut reader).map(|()| reader)
            }
            None => Err(AppError::Detector("helper has no stdout".to_string())),
        };
        let reader = match handshake {
            Ok(r) => r,
            Err(e) => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(e);
            }
        };

        log::info!("hand detector ready");
        Ok(MediaPipeDetector { process, reader, min_confidence })
    }
}

#[cfg(feature = "camera")]
impl HandLandmarkDetector for MediaPipeDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, AppError> {
        use std::io::{BufRead, Write};

        let io_err = |e: std::io::Error| AppError::Detector(e.to_string());

        let stdin = self
            .process
            .stdin
            .as_mut()
            .ok_or_else(|| AppError::Detector("helper stdin closed".to_string()))?;
        stdin.write_all(&(frame.width as u32).to_le_bytes()).map_err(io_err)?;
        stdin.write_all(&(frame.height as u32).to_le_bytes()).map_err(io_err)?;
        stdin.write_all(&3u32.to_le_bytes()).map_err(io_err)?;
        stdin.write_all(&frame.rgb_bytes()).map_err(io_err)?;
        stdin.flush().map_err(io_err)?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(io_err)?;
        parse_reply(&line, self.min_confidence)
    }
}

#[cfg(feature = "camera")]
impl Drop for MediaPipeDetector {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
