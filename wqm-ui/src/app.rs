//! Reconciliation loop
//!
//! A cycle is fetch → partition → select → render. Cycles run on initial
//! load, manual refresh, mode toggle and after a successful tag.
//!
//! Cycles may overlap. Each takes a ticket before fetching, and a cycle whose
//! ticket is older than the last rendered one is dropped when its response
//! arrives, so a slow stale response never overwrites a newer view. No lock
//! is held across a network call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use wqm_common::config::MapConfig;
use wqm_common::partition;

use crate::client::ReadingService;
use crate::error::TriageError;
use crate::map_view;
use crate::mode::{ViewMode, ViewModeController};
use crate::surface::{Notice, Surfaces, TagRequest};
use crate::tagging::{self, Prepared, TagOutcome, TaggingWorkflow};
use crate::triage_view;

/// Counts from a rendered cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub ticket: u64,
    pub mode: ViewMode,
    pub tagged: usize,
    pub untagged: usize,
    pub markers: usize,
}

/// How one reconciliation cycle ended
#[derive(Debug)]
pub enum CycleOutcome {
    Rendered(CycleSummary),
    /// A newer cycle rendered first; nothing was drawn or reported
    Discarded { ticket: u64 },
    /// Fetch failed; the previous view is untouched
    Failed(TriageError),
}

impl CycleOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, CycleOutcome::Rendered(_))
    }
}

/// View state mutated only under the shell lock
struct Shell {
    mode: ViewModeController,
    last_rendered: u64,
    surfaces: Surfaces,
}

/// Application object: owns the mode, the surfaces and the service handle
pub struct TriageApp {
    service: Arc<dyn ReadingService>,
    workflow: TaggingWorkflow,
    shell: Mutex<Shell>,
    issued: AtomicU64,
}

impl TriageApp {
    /// Build the app and draw the base map; does not fetch
    pub fn new(service: Arc<dyn ReadingService>, mut surfaces: Surfaces, map_config: &MapConfig) -> Self {
        map_view::init(surfaces.map.as_mut(), map_config);

        let mode = ViewModeController::new();
        surfaces
            .controls
            .set_admin_indicator(mode.toggle_label(), mode.is_admin());

        Self {
            workflow: TaggingWorkflow::new(Arc::clone(&service)),
            service,
            shell: Mutex::new(Shell {
                mode,
                last_rendered: 0,
                surfaces,
            }),
            issued: AtomicU64::new(0),
        }
    }

    pub async fn mode(&self) -> ViewMode {
        self.shell.lock().await.mode.mode()
    }

    /// Run one reconciliation cycle
    pub async fn refresh(&self) -> CycleOutcome {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(ticket, "Reconciliation cycle started");

        let fetched = self.service.fetch_readings().await;

        let readings = match fetched {
            Ok(readings) => readings,
            Err(err) => {
                error!(ticket, error = %err, "Failed to fetch readings");
                let mut shell = self.shell.lock().await;
                if ticket < shell.last_rendered {
                    debug!(ticket, last_rendered = shell.last_rendered, "Dropping error from stale cycle");
                    return CycleOutcome::Discarded { ticket };
                }
                shell.surfaces.notifier.notify(Notice::error(err.user_message()));
                return CycleOutcome::Failed(err);
            }
        };

        let partition = partition(readings);
        let tagged = partition.tagged.len();
        let untagged = partition.untagged.len();

        let mut shell = self.shell.lock().await;
        if ticket < shell.last_rendered {
            debug!(ticket, last_rendered = shell.last_rendered, "Discarding stale cycle");
            return CycleOutcome::Discarded { ticket };
        }
        shell.last_rendered = ticket;

        let mode = shell.mode.mode();
        let selection = shell.mode.select(partition);
        let surfaces = &mut shell.surfaces;

        match &selection.triage {
            Some(list) => {
                info!("Admin mode on, {} untagged readings", list.len());
                triage_view::render(surfaces.triage.as_mut(), list);
            }
            None => {
                info!("Admin mode off, showing {} tagged readings", selection.markers.len());
                triage_view::hide(surfaces.triage.as_mut());
            }
        }
        let markers = map_view::render(surfaces.map.as_mut(), &selection.markers);

        CycleOutcome::Rendered(CycleSummary {
            ticket,
            mode,
            tagged,
            untagged,
            markers,
        })
    }

    /// Flip the view mode, relabel the toggle, then reconcile
    pub async fn toggle_mode(&self) -> CycleOutcome {
        {
            let mut shell = self.shell.lock().await;
            let mode = shell.mode.toggle();
            let label = shell.mode.toggle_label();
            shell
                .surfaces
                .controls
                .set_admin_indicator(label, mode == ViewMode::Admin);

            let state = if mode == ViewMode::Admin { "ON" } else { "OFF" };
            shell
                .surfaces
                .notifier
                .notify(Notice::info(format!("Admin Mode is now {}.", state)));
            info!(mode = %mode, "View mode toggled");
        }

        self.refresh().await
    }

    /// Run the action bound to triage row `index`
    ///
    /// Returns `None` when no such row is currently listed.
    pub async fn activate_row(&self, index: usize) -> Option<TagOutcome> {
        let request = {
            let shell = self.shell.lock().await;
            shell.surfaces.triage.activate(index)?
        };
        Some(self.tag(request).await)
    }

    /// Tag the reading captured in `request`
    pub async fn tag(&self, request: TagRequest) -> TagOutcome {
        let prepared = {
            let mut shell = self.shell.lock().await;
            TaggingWorkflow::prepare(&request.reading, shell.surfaces.prompt.as_mut())
        };

        let (reading_id, coords) = match prepared {
            Prepared::Abandoned => return TagOutcome::Abandoned,
            Prepared::Invalid(err) => {
                self.notify(Notice::error(err.user_message())).await;
                return TagOutcome::Rejected(err);
            }
            Prepared::Ready { reading_id, coords } => (reading_id, coords),
        };

        match self.workflow.submit(&reading_id, coords).await {
            Ok(_) => {
                self.notify(Notice::info(tagging::success_message(&reading_id))).await;
                let cycle = self.refresh().await;
                debug!(reading_id = %reading_id, rendered = cycle.is_rendered(), "Post-tag refresh finished");
                TagOutcome::Succeeded { reading_id }
            }
            Err(err) => {
                error!(reading_id = %reading_id, error = %err, "Error updating coordinates");
                self.notify(Notice::error(tagging::failure_message(&err))).await;
                TagOutcome::Failed(err)
            }
        }
    }

    async fn notify(&self, notice: Notice) {
        self.shell.lock().await.surfaces.notifier.notify(notice);
    }
}
