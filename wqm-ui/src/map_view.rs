//! Map view
//!
//! Draws one circle marker per tagged reading. Old markers are found by
//! their overlay kind on every redraw; nothing else on the map is touched.

use tracing::{debug, warn};
use wqm_common::config::MapConfig;
use wqm_common::{Potability, Reading};

use crate::surface::{MapSurface, MarkerColor, MarkerPopup, MarkerSpec, MarkerStyle, Overlay, OverlayKind};

const MARKER_RADIUS: f64 = 8.0;
const MARKER_FILL_OPACITY: f64 = 0.8;

/// Set the initial view and add the base tile layer
pub fn init(surface: &mut dyn MapSurface, config: &MapConfig) {
    surface.set_view(config.center_lat, config.center_lon, config.zoom);
    surface.add_overlay(Overlay::TileLayer {
        url: config.tile_url.clone(),
        attribution: config.attribution.clone(),
    });
}

/// Replace all reading markers with markers for `readings`
///
/// Returns the number of markers drawn. Readings whose coordinates do not
/// parse as numbers are skipped.
pub fn render(surface: &mut dyn MapSurface, readings: &[Reading]) -> usize {
    let stale: Vec<_> = surface
        .overlays()
        .into_iter()
        .filter(|(_, kind)| *kind == OverlayKind::ReadingMarker)
        .map(|(id, _)| id)
        .collect();
    let removed = stale.len();
    for id in stale {
        surface.remove_overlay(id);
    }

    let mut drawn = 0;
    for reading in readings {
        match marker_for(reading) {
            Some(marker) => {
                surface.add_overlay(Overlay::ReadingMarker(marker));
                drawn += 1;
            }
            None => warn!(
                reading = %reading.display_key(),
                latitude = %reading.latitude,
                longitude = %reading.longitude,
                "Skipping marker with non-numeric coordinates"
            ),
        }
    }

    debug!(removed, drawn, "Map markers redrawn");
    drawn
}

/// Marker color for a potability status
pub fn marker_color(status: Potability) -> MarkerColor {
    match status {
        Potability::Safe => MarkerColor::Green,
        Potability::NotSafe => MarkerColor::Red,
    }
}

fn marker_for(reading: &Reading) -> Option<MarkerSpec> {
    let coords = reading.coordinates()?;
    let status = reading.potability();

    Some(MarkerSpec {
        latitude: coords.latitude,
        longitude: coords.longitude,
        style: MarkerStyle {
            color: marker_color(status),
            radius: MARKER_RADIUS,
            fill_opacity: MARKER_FILL_OPACITY,
        },
        popup: MarkerPopup {
            status,
            ph: reading.ph.to_string(),
            solids: reading.solids.to_string(),
            turbidity: reading.turbidity.to_string(),
        },
    })
}
