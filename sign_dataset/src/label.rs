//! Sample labels and the controller that changes them.
//!
//! The controller has one steady state, `Active(label)`, and one transient
//! state, `Prompt(label)`.  A capture loop asks for a change with
//! [`LabelController::request_change`] and, before it reads its next frame,
//! sees [`LabelController::is_prompting`] and calls
//! [`LabelController::resolve`], which blocks on the operator.  No sample can
//! be stamped while the label is being changed.

use std::fmt;
use std::io::{self, BufRead, Write};

// ════════════════════════════════════════════════════════════════════════════
// Label
// ════════════════════════════════════════════════════════════════════════════

/// Non-empty, purely alphabetic, upper-case tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    /// The acceptance rule for operator input: non-empty and every char
    /// alphabetic.  Accepted input is upper-cased; no trimming is applied,
    /// so `" b"` is rejected.
    pub fn parse(input: &str) -> Option<Label> {
        if input.is_empty() || !input.chars().all(char::is_alphabetic) {
            return None;
        }
        Some(Label(input.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Label {
    fn default() -> Self {
        Label("A".to_string())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LabelPrompt: where new labels come from
// ════════════════════════════════════════════════════════════════════════════

/// Blocking source of operator answers.
pub trait LabelPrompt {
    fn request(&mut self, current: &Label) -> String;
}

/// Prompt on stdout, answer on stdin.
pub struct StdinPrompt;

impl LabelPrompt for StdinPrompt {
    fn request(&mut self, current: &Label) -> String {
        println!();
        println!("  Current label: {}", current);
        print!("  New label (letters only, Enter to keep): ");
        io::stdout().flush().ok();

        read_answer(&mut io::stdin().lock())
    }
}

/// One line from `reader` with its `\n` or `\r\n` removed and nothing
/// else.  End of input and read errors give an empty answer.
pub fn read_answer(reader: &mut impl BufRead) -> String {
    let mut buf = String::new();
    if let Err(e) = reader.read_line(&mut buf) {
        log::warn!("could not read label: {}", e);
        return String::new();
    }
    buf.trim_end_matches(['\r', '\n']).to_string()
}

// ════════════════════════════════════════════════════════════════════════════
// LabelController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelState {
    Active(Label),
    /// Change requested; the frame loop must resolve before its next frame.
    Prompt(Label),
}

/// Result of resolving a prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelChange {
    Changed { from: Label, to: Label },
    /// Input rejected (empty or not alphabetic); holds the raw answer.
    Kept { rejected: String },
}

#[derive(Debug)]
pub struct LabelController {
    state: LabelState,
}

impl LabelController {
    pub fn new(initial: Label) -> Self {
        LabelController { state: LabelState::Active(initial) }
    }

    pub fn current(&self) -> &Label {
        match &self.state {
            LabelState::Active(l) | LabelState::Prompt(l) => l,
        }
    }

    pub fn state(&self) -> &LabelState {
        &self.state
    }

    pub fn is_prompting(&self) -> bool {
        matches!(self.state, LabelState::Prompt(_))
    }

    pub fn request_change(&mut self) {
        if let LabelState::Active(l) = &self.state {
            self.state = LabelState::Prompt(l.clone());
        }
    }

    /// Block on `prompt` and return to `Active`.  A no-op returning `None`
    /// when no change was requested.
    pub fn resolve(&mut self, prompt: &mut dyn LabelPrompt) -> Option<LabelChange> {
        let current = match &self.state {
            LabelState::Prompt(l) => l.clone(),
            LabelState::Active(_) => return None,
        };

        let answer = prompt.request(&current);
        let change = match Label::parse(&answer) {
            Some(next) => {
                self.state = LabelState::Active(next.clone());
                LabelChange::Changed { from: current, to: next }
            }
            None => {
                self.state = LabelState::Active(current);
                LabelChange::Kept { rejected: answer }
            }
        };
        Some(change)
    }
}

impl Default for LabelController {
    fn default() -> Self {
        LabelController::new(Label::default())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
