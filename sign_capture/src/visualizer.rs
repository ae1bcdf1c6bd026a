//! Software-rendered camera view using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ LABEL: A                                     │
//! │ PENDING: 3                                   │
//! │ TOTAL: 23                                    │
//! │ S=SAVE  C=CHANGE LABEL  ESC=EXIT             │
//! │                                              │
//! │         [camera frame + hand skeleton]       │
//! │                                              │
//! │ feedback line                                │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Recognition mode uses the same window with a large headline instead of
//! the status block.

use std::time::Duration;

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use sign_dataset::{LandmarkSet, Point3, HAND_CONNECTIONS};

use crate::error::AppError;
use crate::frame::Frame;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const STATUS_COLOR:   u32   = 0xFF00FF00;  // green
const LEGEND_COLOR:   u32   = 0xFFFFFF00;  // yellow
const HEADLINE_COLOR: u32   = 0xFFFFFFFF;
const FEEDBACK_COLOR: u32   = 0xFFEEEEEE;
const BONE_COLOR:     u32   = 0xFFFFFFFF;
const JOINT_COLOR:    u32   = 0xFFFF3030;
const PANEL_COLOR:    u32   = 0xFF000000;
const TEXT_SCALE:     usize = 3;
const HEADLINE_SCALE: usize = 6;
const LINE_H:         usize = 6 * TEXT_SCALE + 8;
/// How far outside the window a landmark may still be drawn.
const CLIP_MARGIN:    isize = 64;

// ════════════════════════════════════════════════════════════════════════════
// Command / Overlay / Screen
// ════════════════════════════════════════════════════════════════════════════

/// Operator request decoded from one key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `S`: save the current hand as a sample.
    Capture,
    /// `C`: change the active label.
    Relabel,
    /// `Esc` or window closed.
    Exit,
}

/// Everything drawn over a frame.
#[derive(Clone, Debug, Default)]
pub struct Overlay<'a> {
    pub status:   Vec<String>,
    pub legend:   Option<&'a str>,
    pub headline: Option<String>,
    pub feedback: Option<String>,
    pub hand:     Option<&'a LandmarkSet>,
}

/// Output surface + keyboard of one loop.
pub trait Screen {
    fn is_open(&self) -> bool;
    fn render(&mut self, frame: &Frame, overlay: &Overlay<'_>);
    /// At most one command per call; never blocks beyond the window's
    /// update rate.
    fn poll_command(&mut self) -> Option<Command>;
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
}

impl Visualizer {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, AppError> {
        let mut window = Window::new(
            title,
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Display(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(1)));

        Ok(Visualizer {
            window,
            buf: vec![PANEL_COLOR; width * height],
            width,
            height,
        })
    }

    // ── Frame ─────────────────────────────────────────────────────────────

    /// Nearest-neighbour scale of `frame` onto the whole window.
    fn blit(&mut self, frame: &Frame) {
        if frame.width == 0 || frame.height == 0 {
            self.buf.fill(PANEL_COLOR);
            return;
        }
        for row in 0..self.height {
            let sy = row * frame.height / self.height;
            for col in 0..self.width {
                let sx = col * frame.width / self.width;
                self.buf[row * self.width + col] = frame.pixels[sy * frame.width + sx] | 0xFF000000;
            }
        }
    }

    // ── Hand skeleton ─────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &LandmarkSet) {
        let (w, h) = (self.width, self.height);
        let to_px = |i: usize| to_pixel(&hand.points()[i], w, h);

        for &(a, b) in HAND_CONNECTIONS.iter() {
            let (x0, y0) = to_px(a);
            let (x1, y1) = to_px(b);
            self.draw_line(x0, y0, x1, y1, BONE_COLOR);
        }
        for i in 0..hand.points().len() {
            let (x, y) = to_px(i);
            self.fill_rect_signed(x - 3, y - 3, 7, 7, JOINT_COLOR);
        }
    }

    // ── Text blocks ───────────────────────────────────────────────────────

    fn draw_status(&mut self, lines: &[String], legend: Option<&str>) {
        let mut y = 10;
        for line in lines {
            self.draw_text_panel(line, 10, y, TEXT_SCALE, STATUS_COLOR);
            y += LINE_H;
        }
        if let Some(legend) = legend {
            self.draw_text_panel(legend, 10, y, TEXT_SCALE - 1, LEGEND_COLOR);
        }
    }

    fn draw_text_panel(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let w = text.chars().count() * 4 * scale + 2 * scale;
        let h = 5 * scale + 2 * scale;
        self.shade_rect(x.saturating_sub(scale), y.saturating_sub(scale), w, h, 0.55);
        self.draw_label(text, x, y, scale, color);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    fn fill_rect_signed(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        for dy in 0..h as isize {
            for dx in 0..w as isize {
                let (px, py) = (x + dx, y + dy);
                if px >= 0 && py >= 0 {
                    self.set_pixel(px as usize, py as usize, color);
                }
            }
        }
    }

    /// Darken a rectangle towards black by `amount`.
    fn shade_rect(&mut self, x: usize, y: usize, w: usize, h: usize, amount: f32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                let idx = row * self.width + col;
                self.buf[idx] = blend(self.buf[idx], PANEL_COLOR, amount);
            }
        }
    }

    /// Bresenham line, clipped to the window.
    fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            if x >= 0 && y >= 0 {
                self.set_pixel(x as usize, y as usize, color);
                self.set_pixel(x as usize + 1, y as usize, color);
            }
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font: 3×5 glyphs, each font pixel drawn as a
    /// `scale`×`scale` block.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for sy in 0..scale {
                            for sx in 0..scale {
                                self.set_pixel(cx + col * scale + sx, y + row * scale + sy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > self.width { break; }
        }
    }
}

impl Screen for Visualizer {
    fn is_open(&self) -> bool { self.window.is_open() }

    fn render(&mut self, frame: &Frame, overlay: &Overlay<'_>) {
        self.blit(frame);

        if let Some(hand) = overlay.hand {
            self.draw_hand(hand);
        }

        self.draw_status(&overlay.status, overlay.legend);

        if let Some(headline) = &overlay.headline {
            let scale = fit_scale(headline, self.width.saturating_sub(60), HEADLINE_SCALE);
            self.draw_text_panel(headline, 50, 100, scale, HEADLINE_COLOR);
        }

        if let Some(feedback) = &overlay.feedback {
            let y = self.height.saturating_sub(5 * TEXT_SCALE + 12);
            self.draw_text_panel(feedback, 10, y, TEXT_SCALE - 1, FEEDBACK_COLOR);
        }

        if let Err(e) = self.window.update_with_buffer(&self.buf, self.width, self.height) {
            log::warn!("window update failed: {}", e);
        }
    }

    fn poll_command(&mut self) -> Option<Command> {
        if !self.window.is_open() {
            return Some(Command::Exit);
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Escape) {
            Some(Command::Exit)
        } else if one_shot(Key::S) {
            Some(Command::Capture)
        } else if one_shot(Key::C) {
            Some(Command::Relabel)
        } else {
            None
        }
    }
}

impl Drop for Visualizer {
    fn drop(&mut self) {
        log::debug!("window closed");
    }
}

/// Largest scale up to `max` at which `text` fits in `width` pixels; never
/// below 1.
fn fit_scale(text: &str, width: usize, max: usize) -> usize {
    let glyphs = text.chars().count().max(1);
    (width / (4 * glyphs)).clamp(1, max.max(1))
}

/// Normalised landmark to window pixels, clamped to within [`CLIP_MARGIN`]
/// of the window edges.
fn to_pixel(p: &Point3, width: usize, height: usize) -> (isize, isize) {
    let clamp = |v: f32, extent: usize| {
        let px = (v * extent as f32) as isize;
        px.clamp(-CLIP_MARGIN, extent as isize + CLIP_MARGIN)
    };
    (clamp(p.x, width), clamp(p.y, height))
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Glyph rows, top to bottom; bit 2 is the left column.  Letters are looked
/// up upper-cased.
const GLYPHS: &[(char, [u8; 5])] = &[
    ('0', [7, 5, 5, 5, 7]), ('1', [2, 6, 2, 2, 7]), ('2', [7, 1, 7, 4, 7]),
    ('3', [7, 1, 7, 1, 7]), ('4', [5, 5, 7, 1, 1]), ('5', [7, 4, 7, 1, 7]),
    ('6', [7, 4, 7, 5, 7]), ('7', [7, 1, 1, 1, 1]), ('8', [7, 5, 7, 5, 7]),
    ('9', [7, 5, 7, 1, 7]),
    ('A', [7, 5, 7, 5, 5]), ('B', [6, 5, 6, 5, 6]), ('C', [7, 4, 4, 4, 7]),
    ('D', [6, 5, 5, 5, 6]), ('E', [7, 4, 7, 4, 7]), ('F', [7, 4, 7, 4, 4]),
    ('G', [7, 4, 5, 5, 7]), ('H', [5, 5, 7, 5, 5]), ('I', [7, 2, 2, 2, 7]),
    ('J', [1, 1, 1, 5, 7]), ('K', [5, 5, 6, 5, 5]), ('L', [4, 4, 4, 4, 7]),
    ('M', [5, 7, 5, 5, 5]), ('N', [7, 5, 5, 5, 5]), ('O', [7, 5, 5, 5, 7]),
    ('P', [7, 5, 7, 4, 4]), ('Q', [7, 5, 5, 7, 1]), ('R', [6, 5, 6, 5, 5]),
    ('S', [7, 4, 7, 1, 7]), ('T', [7, 2, 2, 2, 2]), ('U', [5, 5, 5, 5, 7]),
    ('V', [5, 5, 5, 2, 2]), ('W', [5, 5, 5, 7, 5]), ('X', [5, 5, 2, 5, 5]),
    ('Y', [5, 5, 7, 2, 2]), ('Z', [7, 1, 2, 4, 7]),
    ('(', [2, 4, 4, 4, 2]), (')', [2, 1, 1, 1, 2]), ('%', [5, 1, 2, 4, 5]),
    ('!', [2, 2, 2, 0, 2]), ('/', [1, 1, 2, 4, 4]), ('-', [0, 0, 7, 0, 0]),
    ('.', [0, 0, 0, 0, 2]), (',', [0, 0, 0, 2, 4]), (':', [0, 2, 0, 2, 0]),
    ('=', [0, 7, 0, 7, 0]), (' ', [0, 0, 0, 0, 0]),
];

/// Drawn for characters missing from [`GLYPHS`].
const UNKNOWN_GLYPH: [u8; 5] = [0, 0, 2, 0, 0];

fn char_glyph(c: char) -> [u8; 5] {
    let c = c.to_ascii_uppercase();
    GLYPHS
        .iter()
        .find(|(g, _)| *g == c)
        .map(|(_, rows)| *rows)
        .unwrap_or(UNKNOWN_GLYPH)
}

/// Linear mix of two ARGB colours, channel by channel; `t` = 0 gives `a`,
/// `t` = 1 gives `b`.  The result is opaque.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    [16u32, 8, 0].iter().fold(0xFF000000, |out, &shift| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        out | (((ca + (cb - ca) * t).round() as u32) << shift)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF102030, 0xFF000000, 0.0), 0xFF102030);
        assert_eq!(blend(0xFF102030, 0xFF000000, 1.0), 0xFF000000);
    }

    #[test]
    fn long_headline_shrinks() {
        assert_eq!(fit_scale("A (95%)", 580, HEADLINE_SCALE), HEADLINE_SCALE);
        assert_eq!(fit_scale("SHOW A HAND TO THE CAMERA", 580, HEADLINE_SCALE), 5);
        assert_eq!(fit_scale("SHOW A HAND TO THE CAMERA", 40, HEADLINE_SCALE), 1);
    }

    #[test]
    fn blend_midpoint() {
        assert_eq!(blend(0xFF000000, 0xFF204060, 0.5), 0xFF102030);
    }

    #[test]
    fn overlay_text_has_glyphs() {
        let texts = [
            "QA (95%)",
            "SHOW A HAND TO THE CAMERA",
            "NO HAND DETECTED - NOTHING SAVED",
            crate::capture::CAPTURE_LEGEND,
            "LABEL: z PENDING: 0",
        ];
        for ch in texts.iter().flat_map(|t| t.chars()).filter(|c| *c != ' ') {
            assert_ne!(char_glyph(ch), UNKNOWN_GLYPH, "missing glyph for {:?}", ch);
        }
    }

    #[test]
    fn glyph_table_is_consistent() {
        for (i, (c, rows)) in GLYPHS.iter().enumerate() {
            assert!(rows.iter().all(|r| *r < 8), "{:?} wider than 3 columns", c);
            assert!(!c.is_ascii_lowercase());
            assert!(GLYPHS[i + 1..].iter().all(|(d, _)| d != c), "{:?} listed twice", c);
        }
        assert_eq!(char_glyph('q'), char_glyph('Q'));
    }

    #[test]
    fn wild_landmarks_are_clamped() {
        let far = Point3::new(1e9, -1e9, 0.0);
        assert_eq!(to_pixel(&far, 640, 480), (640 + CLIP_MARGIN, -CLIP_MARGIN));
        assert_eq!(to_pixel(&Point3::new(f32::NAN, 0.5, 0.0), 640, 480), (0, 240));
        assert_eq!(to_pixel(&Point3::new(0.25, 1.0, 0.0), 640, 480), (160, 480));
    }
}
