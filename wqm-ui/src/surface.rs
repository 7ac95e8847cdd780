//! Presentation surfaces
//!
//! The views draw through these traits and never touch a concrete map
//! widget, list, or input mechanism. The binary implements them on a
//! terminal (see `terminal.rs`); tests implement them as recorders.

use wqm_common::{Potability, Reading};

/// Handle of an overlay added to a [`MapSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// Overlay category, fixed when the overlay is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    TileLayer,
    ReadingMarker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Green,
    Red,
}

impl MarkerColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerColor::Green => "green",
            MarkerColor::Red => "red",
        }
    }
}

/// Circle marker style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub color: MarkerColor,
    pub radius: f64,
    pub fill_opacity: f64,
}

/// Popup text attached to a marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    pub status: Potability,
    pub ph: String,
    pub solids: String,
    pub turbidity: String,
}

impl MarkerPopup {
    /// HTML rendering for surfaces that display markup
    pub fn to_html(&self) -> String {
        format!(
            "<b>{}</b><br><b>pH:</b> {}<br><b>Solids:</b> {}<br><b>Turbidity:</b> {}",
            self.status.label(),
            html_escape(&self.ph),
            html_escape(&self.solids),
            html_escape(&self.turbidity)
        )
    }
}

/// One reading drawn on the map
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub latitude: f64,
    pub longitude: f64,
    pub style: MarkerStyle,
    pub popup: MarkerPopup,
}

/// Anything that can be placed on the map
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    TileLayer { url: String, attribution: String },
    ReadingMarker(MarkerSpec),
}

impl Overlay {
    pub fn kind(&self) -> OverlayKind {
        match self {
            Overlay::TileLayer { .. } => OverlayKind::TileLayer,
            Overlay::ReadingMarker(_) => OverlayKind::ReadingMarker,
        }
    }
}

/// Map widget
pub trait MapSurface: Send {
    fn set_view(&mut self, latitude: f64, longitude: f64, zoom: u8);

    fn add_overlay(&mut self, overlay: Overlay) -> OverlayId;

    /// Every overlay currently on the map, with its kind
    fn overlays(&self) -> Vec<(OverlayId, OverlayKind)>;

    fn remove_overlay(&mut self, id: OverlayId);
}

/// Activation bound to one triage row
///
/// Holds an owned snapshot of the reading the row was built for, so an
/// action kept across a re-render still targets that reading.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRequest {
    pub reading: Reading,
}

/// One row of the triage list
#[derive(Debug, Clone, PartialEq)]
pub struct TriageRow {
    pub key: String,
    pub ph: String,
    pub solids: String,
    pub action: TagRequest,
}

impl TriageRow {
    /// Single-line rendering: `ID: <key> | pH: <ph> | Solids: <solids>`
    pub fn summary(&self) -> String {
        format!("ID: {} | pH: {} | Solids: {}", self.key, self.ph, self.solids)
    }
}

/// Triage list container
pub trait TriageSurface: Send {
    fn clear(&mut self);

    fn show_placeholder(&mut self, text: &str);

    fn push_row(&mut self, row: TriageRow);

    /// Action of the row at `index` in the current list
    fn activate(&self, index: usize) -> Option<TagRequest>;
}

/// Mode toggle button and the admin layout switch
pub trait ControlSurface: Send {
    fn set_admin_indicator(&mut self, label: &str, active: bool);
}

/// Blocking text prompt; `None` means the user cancelled
pub trait CoordinatePrompt: Send {
    fn prompt(&mut self, message: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// User-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Alert channel
pub trait Notifier: Send {
    fn notify(&mut self, notice: Notice);
}

/// Every surface the application draws on
pub struct Surfaces {
    pub map: Box<dyn MapSurface>,
    pub triage: Box<dyn TriageSurface>,
    pub controls: Box<dyn ControlSurface>,
    pub prompt: Box<dyn CoordinatePrompt>,
    pub notifier: Box<dyn Notifier>,
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
