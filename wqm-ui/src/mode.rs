//! View mode
//!
//! The mode decides what a reconciliation cycle renders: markers for tagged
//! readings in standard mode, the triage list of untagged readings in admin
//! mode. [`ViewModeController::toggle`] is the only mutator.

use std::fmt;
use wqm_common::{Partition, Reading};

/// Active view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Standard,
    Admin,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Standard => write!(f, "standard"),
            ViewMode::Admin => write!(f, "admin"),
        }
    }
}

/// What one cycle renders
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Readings drawn as map markers
    pub markers: Vec<Reading>,
    /// Readings listed for triage; `None` hides the list
    pub triage: Option<Vec<Reading>>,
}

/// Single owner of the mode flag
#[derive(Debug, Default)]
pub struct ViewModeController {
    mode: ViewMode,
}

impl ViewModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_admin(&self) -> bool {
        self.mode == ViewMode::Admin
    }

    /// Flip the mode and return the new one
    #[must_use = "a mode change requires a reconciliation cycle"]
    pub fn toggle(&mut self) -> ViewMode {
        self.mode = match self.mode {
            ViewMode::Standard => ViewMode::Admin,
            ViewMode::Admin => ViewMode::Standard,
        };
        self.mode
    }

    /// Label of the toggle control for the current mode
    pub fn toggle_label(&self) -> &'static str {
        match self.mode {
            ViewMode::Standard => "Admin Mode",
            ViewMode::Admin => "Exit Admin Mode",
        }
    }

    /// Choose what to render from a partition
    ///
    /// Admin mode suppresses every marker while the triage list is shown.
    pub fn select(&self, partition: Partition) -> Selection {
        match self.mode {
            ViewMode::Standard => Selection {
                markers: partition.tagged,
                triage: None,
            },
            ViewMode::Admin => Selection {
                markers: Vec::new(),
                triage: Some(partition.untagged),
            },
        }
    }
}
