//! Admin triage list
//!
//! Lists untagged readings; each row carries its own [`TagRequest`].

use wqm_common::Reading;

use crate::surface::{TagRequest, TriageRow, TriageSurface};

/// Shown instead of rows when nothing needs tagging
pub const EMPTY_PLACEHOLDER: &str = "No untagged readings found.";

/// Rebuild the list from `untagged`
pub fn render(surface: &mut dyn TriageSurface, untagged: &[Reading]) {
    surface.clear();

    if untagged.is_empty() {
        surface.show_placeholder(EMPTY_PLACEHOLDER);
        return;
    }

    for reading in untagged {
        surface.push_row(row_for(reading));
    }
}

/// Empty and hide the list (standard mode)
pub fn hide(surface: &mut dyn TriageSurface) {
    surface.clear();
}

fn row_for(reading: &Reading) -> TriageRow {
    TriageRow {
        key: reading.display_key(),
        ph: reading.ph.to_string(),
        solids: reading.solids.to_string(),
        action: TagRequest {
            reading: reading.clone(),
        },
    }
}
