//! Coordinate tagging
//!
//! One attempt runs PROMPTING_LAT → PROMPTING_LON → VALIDATING → SUBMITTING
//! and ends as Succeeded, Failed, Rejected (validation) or Abandoned (a
//! prompt was cancelled). Only Succeeded leads to a refresh; that refresh is
//! issued by the caller.
//!
//! Prompting and validation ([`TaggingWorkflow::prepare`]) are synchronous so
//! the caller can hold its surfaces while the user types, then release them
//! before [`TaggingWorkflow::submit`] goes to the network.

use std::sync::Arc;
use tracing::{debug, warn};
use wqm_common::{Coordinates, Reading};

use crate::client::{ReadingService, UpdateAck};
use crate::error::{TriageError, TriageResult};
use crate::surface::CoordinatePrompt;

const MISSING_ID_MESSAGE: &str = "Error: Cannot tag an item with a missing 'reading_id'.";
const MISSING_COORDS_MESSAGE: &str = "Both latitude and longitude are required.";

/// Result of the prompt and validation steps
#[derive(Debug)]
pub enum Prepared {
    /// A prompt was cancelled; nothing to report
    Abandoned,
    /// Input rejected before any network call
    Invalid(TriageError),
    /// Ready to submit
    Ready { reading_id: String, coords: Coordinates },
}

/// Final state of one tagging attempt
#[derive(Debug)]
pub enum TagOutcome {
    Abandoned,
    Rejected(TriageError),
    Failed(TriageError),
    Succeeded { reading_id: String },
}

impl TagOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TagOutcome::Succeeded { .. })
    }
}

pub struct TaggingWorkflow {
    service: Arc<dyn ReadingService>,
}

impl TaggingWorkflow {
    pub fn new(service: Arc<dyn ReadingService>) -> Self {
        Self { service }
    }

    /// Collect and validate coordinates for `reading`
    ///
    /// Both prompts run before any validation, so a reading without an id
    /// is only reported after the user has answered them.
    pub fn prepare(reading: &Reading, prompt: &mut dyn CoordinatePrompt) -> Prepared {
        let Some(latitude) = prompt.prompt(&format!("Enter Latitude for reading {}:", reading.reading_id)) else {
            debug!(reading = %reading.display_key(), "Latitude prompt cancelled");
            return Prepared::Abandoned;
        };

        let Some(longitude) = prompt.prompt(&format!("Enter Longitude for reading {}:", reading.reading_id)) else {
            debug!(reading = %reading.display_key(), "Longitude prompt cancelled");
            return Prepared::Abandoned;
        };

        let Some(reading_id) = reading.id() else {
            warn!(reading = %reading.display_key(), "Cannot tag reading without reading_id");
            return Prepared::Invalid(TriageError::Validation(MISSING_ID_MESSAGE.to_string()));
        };

        if latitude.is_empty() || longitude.is_empty() {
            return Prepared::Invalid(TriageError::Validation(MISSING_COORDS_MESSAGE.to_string()));
        }

        match Coordinates::parse(&latitude, &longitude) {
            Ok(coords) => Prepared::Ready { reading_id, coords },
            Err(e) => Prepared::Invalid(TriageError::Validation(format!("Error: {}", e))),
        }
    }

    /// Send validated coordinates to the service
    pub async fn submit(&self, reading_id: &str, coords: Coordinates) -> TriageResult<UpdateAck> {
        self.service.update_reading(reading_id, coords).await
    }
}

/// Confirmation shown after a successful update
pub fn success_message(reading_id: &str) -> String {
    format!("✅ Success! Reading {} was updated.", reading_id)
}

/// Notice text for a failed submission
pub fn failure_message(error: &TriageError) -> String {
    match error {
        TriageError::Update(msg) | TriageError::Network(msg) => format!("Error: {}", msg),
        other => other.user_message(),
    }
}
