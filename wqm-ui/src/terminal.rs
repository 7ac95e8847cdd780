//! Terminal surfaces used by the `wqm-ui` binary
//!
//! Markers and triage rows are printed as they are drawn; prompts read one
//! line from stdin. `:q` or end of input cancels a prompt.

use std::io::{self, BufRead, Write};
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::surface::{
    ControlSurface, CoordinatePrompt, MapSurface, Notice, Notifier, Overlay, OverlayId, OverlayKind,
    Severity, Surfaces, TagRequest, TriageRow, TriageSurface,
};

const CANCEL_INPUT: &str = ":q";

/// Build the full surface set for an interactive terminal
pub fn surfaces() -> Surfaces {
    Surfaces {
        map: Box::new(TerminalMap::default()),
        triage: Box::new(TerminalTriageList::default()),
        controls: Box::new(TerminalControls),
        prompt: Box::new(TerminalPrompt::stdin()),
        notifier: Box::new(TerminalNotifier),
    }
}

#[derive(Default)]
pub struct TerminalMap {
    next_id: u64,
    overlays: Vec<(OverlayId, OverlayKind)>,
}

impl MapSurface for TerminalMap {
    fn set_view(&mut self, latitude: f64, longitude: f64, zoom: u8) {
        println!("Map centered at ({:.4}, {:.4}), zoom {}", latitude, longitude, zoom);
    }

    fn add_overlay(&mut self, overlay: Overlay) -> OverlayId {
        self.next_id += 1;
        let id = OverlayId(self.next_id);

        match &overlay {
            Overlay::TileLayer { attribution, .. } => println!("Tiles: {}", attribution),
            Overlay::ReadingMarker(marker) => println!(
                "  ● {:<5} ({:>9.4}, {:>9.4})  {} | pH: {} | Solids: {} | Turbidity: {}",
                marker.style.color.as_str(),
                marker.latitude,
                marker.longitude,
                marker.popup.status.label(),
                marker.popup.ph,
                marker.popup.solids,
                marker.popup.turbidity
            ),
        }

        self.overlays.push((id, overlay.kind()));
        id
    }

    fn overlays(&self) -> Vec<(OverlayId, OverlayKind)> {
        self.overlays.clone()
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        self.overlays.retain(|(existing, _)| *existing != id);
    }
}

/// Numbered list; row numbers shown to the user start at 1
#[derive(Default)]
pub struct TerminalTriageList {
    rows: Vec<TriageRow>,
}

impl TriageSurface for TerminalTriageList {
    fn clear(&mut self) {
        self.rows.clear();
    }

    fn show_placeholder(&mut self, text: &str) {
        println!("  {}", text);
    }

    fn push_row(&mut self, row: TriageRow) {
        println!("  [{}] {}", self.rows.len() + 1, row.summary());
        self.rows.push(row);
    }

    fn activate(&self, index: usize) -> Option<TagRequest> {
        self.rows.get(index).map(|row| row.action.clone())
    }
}

pub struct TerminalControls;

impl ControlSurface for TerminalControls {
    fn set_admin_indicator(&mut self, label: &str, active: bool) {
        let marker = if active { "*" } else { " " };
        println!("[{}] toggle: \"{}\"", marker, label);
    }
}

/// Where prompt answers come from
pub trait LineSource: Send {
    /// Append one line to `buf`; `Ok(0)` at end of input
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl LineSource for io::Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::Stdin::read_line(self, buf)
    }
}

impl<T: AsRef<[u8]> + Send> LineSource for io::Cursor<T> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

pub struct TerminalPrompt<S = io::Stdin> {
    input: S,
}

impl TerminalPrompt {
    pub fn stdin() -> Self {
        Self { input: io::stdin() }
    }
}

impl<S: LineSource> TerminalPrompt<S> {
    pub fn new(input: S) -> Self {
        Self { input }
    }
}

impl<S: LineSource> CoordinatePrompt for TerminalPrompt<S> {
    fn prompt(&mut self, message: &str) -> Option<String> {
        print!("{} ({} to cancel) ", message, CANCEL_INPUT);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match off_worker(|| self.input.read_line(&mut line)) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let answer = line.trim();
                (answer != CANCEL_INPUT).then(|| answer.to_string())
            }
        }
    }
}

/// Run blocking input without stalling a runtime worker
///
/// `block_in_place` only exists on the multi-thread runtime; anywhere else
/// the closure runs directly.
fn off_worker<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => tokio::task::block_in_place(f),
        _ => f(),
    }
}

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.severity {
            Severity::Info => println!("» {}", notice.message),
            Severity::Error => println!("! {}", notice.message),
        }
    }
}
