//! The three external collaborators a loop drives, opened and released
//! together.

use crate::config::AppConfig;
use crate::detector::{open_detector, HandLandmarkDetector};
use crate::error::AppError;
use crate::frame::{open_frame_source, FrameSource};
use crate::visualizer::{Screen, Visualizer};

pub struct Devices {
    pub source:   Box<dyn FrameSource>,
    pub detector: Box<dyn HandLandmarkDetector>,
    pub screen:   Box<dyn Screen>,
}

impl Devices {
    /// Frame source first, then detector, then screen.
    pub fn release(self) {
        let Devices { source, detector, screen } = self;
        drop(source);
        drop(detector);
        drop(screen);
        log::debug!("devices released");
    }
}

/// Open the real devices.  The camera goes first so that a missing camera
/// fails before any window or helper process exists.
pub fn open_devices(cfg: &AppConfig, title: &str) -> Result<Devices, AppError> {
    let source   = open_frame_source(cfg)?;
    let detector = open_detector(cfg)?;
    let screen   = Visualizer::new(title, cfg.frame_width, cfg.frame_height)?;
    Ok(Devices { source, detector, screen: Box::new(screen) })
}
