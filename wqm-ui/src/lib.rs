//! wqm-ui library interface
//!
//! Water-quality map triage: fetches readings, shows tagged ones as map
//! markers, and in admin mode lists untagged ones for manual geotagging.
//! Exposes public APIs for integration testing.

pub mod app;
pub mod client;
pub mod command;
pub mod error;
pub mod map_view;
pub mod mode;
pub mod surface;
pub mod tagging;
pub mod terminal;
pub mod triage_view;

pub use crate::app::{CycleOutcome, CycleSummary, TriageApp};
pub use crate::client::{ReadingService, ReadingServiceClient, UpdateAck};
pub use crate::error::{TriageError, TriageResult};
pub use crate::mode::ViewMode;
pub use crate::tagging::TagOutcome;
