// src/overlay/state.rs

//! Per-session overlay state and the read-only status shown next to the toggle.

use crate::diff::compute::DiffResult;
use std::fmt;

/// Where the overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    /// Hidden. A cached result may still exist.
    Idle,
    /// Visible and waiting for a result (running, or scheduled after a zoom change).
    Computing,
    /// Visible with a result to render.
    Ready,
    /// Visible, the last computation failed.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    pub visible: bool,
    pub sensitivity: u8,
    pub is_computing: bool,
    pub last_result: Option<DiffResult>,
    pub last_error: Option<String>,
}

impl OverlayState {
    pub fn new(sensitivity: u8) -> Self {
        OverlayState {
            visible: false,
            sensitivity,
            is_computing: false,
            last_result: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        if !self.visible {
            OverlayPhase::Idle
        } else if self.is_computing {
            OverlayPhase::Computing
        } else if self.last_error.is_some() {
            OverlayPhase::Error
        } else if self.last_result.is_some() {
            OverlayPhase::Ready
        } else {
            OverlayPhase::Computing
        }
    }

    pub fn status(&self) -> DiffStatus {
        DiffStatus {
            diff_percentage: self.last_result.as_ref().map(|r| r.diff_percentage),
            is_computing: self.is_computing,
            error: self.last_error.clone(),
        }
    }
}

/// What the UI displays beside the diff toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffStatus {
    pub diff_percentage: Option<f64>,
    pub is_computing: bool,
    pub error: Option<String>,
}

impl DiffStatus {
    /// e.g. `"12.4% changed"`, or `None` when there is nothing to report.
    pub fn summary(&self) -> Option<String> {
        self.diff_percentage.map(|pct| format!("{pct:.1}% changed"))
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            write!(f, "{error}")
        } else if self.is_computing {
            write!(f, "Computing diff…")
        } else if let Some(summary) = self.summary() {
            write!(f, "{summary}")
        } else {
            Ok(())
        }
    }
}
