//! Shared test fixtures for wqm-ui integration tests
//!
//! - `MockReadingService`: axum server on 127.0.0.1:0 that serves a reading
//!   list and accepts coordinate updates, recording every request
//! - `recording_surfaces`: surface fakes writing into one shared `UiLog`
//! - `GatedService`: in-memory service whose fetches complete only when the
//!   test releases them, for ordering tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use wqm_common::{Coordinates, Reading};
use wqm_ui::surface::{
    ControlSurface, CoordinatePrompt, MapSurface, MarkerSpec, Notice, Notifier, Overlay, OverlayId,
    OverlayKind, Surfaces, TagRequest, TriageRow, TriageSurface,
};
use wqm_ui::{ReadingService, ReadingServiceClient, TriageError, TriageResult, UpdateAck};

// =============================================================================
// Mock reading service (HTTP)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

pub struct MockState {
    /// Current reading set
    pub readings: Vec<Value>,
    /// Wrap list responses as `{"statusCode": 200, "body": "<json>"}`
    pub double_encode: bool,
    /// Replace the list response entirely
    pub list_override: Option<(StatusCode, String)>,
    /// Replace the update response entirely
    pub update_override: Option<(StatusCode, String)>,
    /// Hold list responses back this long
    pub list_delay: Option<Duration>,
    pub requests: Vec<RecordedRequest>,
}

#[derive(Clone)]
pub struct MockReadingService {
    pub state: Arc<Mutex<MockState>>,
    pub endpoint: String,
}

impl MockReadingService {
    /// Start the mock on an ephemeral port
    pub async fn start(readings: Vec<Value>) -> Self {
        let state = Arc::new(Mutex::new(MockState {
            readings,
            double_encode: false,
            list_override: None,
            update_override: None,
            list_delay: None,
            requests: Vec::new(),
        }));

        let app = Router::new()
            .route("/v1/readings", get(list_readings))
            .route("/v1/readings/:reading_id", put(update_reading))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            endpoint: format!("http://{}/v1/readings", addr),
        }
    }

    pub fn client(&self) -> ReadingServiceClient {
        ReadingServiceClient::new(self.endpoint.clone(), Duration::from_secs(5)).unwrap()
    }

    pub fn set_double_encode(&self, on: bool) {
        self.state.lock().unwrap().double_encode = on;
    }

    pub fn set_list_response(&self, status: StatusCode, body: &str) {
        self.state.lock().unwrap().list_override = Some((status, body.to_string()));
    }

    pub fn set_list_delay(&self, delay: Duration) {
        self.state.lock().unwrap().list_delay = Some(delay);
    }

    pub fn clear_list_response(&self) {
        self.state.lock().unwrap().list_override = None;
    }

    pub fn set_update_response(&self, status: StatusCode, body: &str) {
        self.state.lock().unwrap().update_override = Some((status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }
}

async fn list_readings(State(state): State<Arc<Mutex<MockState>>>) -> Response {
    let delay = state.lock().unwrap().list_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        method: "GET".to_string(),
        path: "/v1/readings".to_string(),
        body: None,
    });

    if let Some((status, body)) = state.list_override.clone() {
        return (status, [("content-type", "application/json")], body).into_response();
    }

    let array = Value::Array(state.readings.clone());
    if state.double_encode {
        Json(json!({"statusCode": 200, "body": array.to_string()})).into_response()
    } else {
        Json(array).into_response()
    }
}

async fn update_reading(
    State(state): State<Arc<Mutex<MockState>>>,
    Path(reading_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        method: "PUT".to_string(),
        path: format!("/v1/readings/{}", reading_id),
        body: Some(body.clone()),
    });

    if let Some((status, body)) = state.update_override.clone() {
        return (status, [("content-type", "application/json")], body).into_response();
    }

    let (Some(lat), Some(lon)) = (body.get("latitude").cloned(), body.get("longitude").cloned()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid or missing latitude/longitude in body. Must be numbers."})),
        )
            .into_response();
    };

    match state
        .readings
        .iter_mut()
        .find(|r| r.get("reading_id").and_then(Value::as_str) == Some(reading_id.as_str()))
    {
        Some(reading) => {
            reading["latitude"] = lat.clone();
            reading["longitude"] = lon.clone();
            Json(json!({
                "message": "Coordinates updated successfully",
                "updatedAttributes": {"latitude": lat, "longitude": lon}
            }))
            .into_response()
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Could not update item in database"})),
        )
            .into_response(),
    }
}

// =============================================================================
// Recording surfaces
// =============================================================================

#[derive(Default)]
pub struct UiLog {
    next_overlay: u64,
    pub overlays: Vec<(OverlayId, Overlay)>,
    pub view: Option<(f64, f64, u8)>,
    pub rows: Vec<TriageRow>,
    pub placeholder: Option<String>,
    pub indicator: Option<(String, bool)>,
    pub notices: Vec<Notice>,
    pub prompts: Vec<String>,
    pub answers: VecDeque<Option<String>>,
}

impl UiLog {
    pub fn markers(&self) -> Vec<MarkerSpec> {
        self.overlays
            .iter()
            .filter_map(|(_, overlay)| match overlay {
                Overlay::ReadingMarker(marker) => Some(marker.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn row_keys(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.key.clone()).collect()
    }

    pub fn tile_layers(&self) -> usize {
        self.overlays
            .iter()
            .filter(|(_, overlay)| overlay.kind() == OverlayKind::TileLayer)
            .count()
    }

    /// Everything a user would see, for before/after comparisons
    pub fn view_output(&self) -> (Vec<MarkerSpec>, Vec<String>, Option<String>, Option<(String, bool)>) {
        (self.markers(), self.row_keys(), self.placeholder.clone(), self.indicator.clone())
    }
}

pub type SharedLog = Arc<Mutex<UiLog>>;

struct RecordingMap(SharedLog);

impl MapSurface for RecordingMap {
    fn set_view(&mut self, latitude: f64, longitude: f64, zoom: u8) {
        self.0.lock().unwrap().view = Some((latitude, longitude, zoom));
    }

    fn add_overlay(&mut self, overlay: Overlay) -> OverlayId {
        let mut log = self.0.lock().unwrap();
        log.next_overlay += 1;
        let id = OverlayId(log.next_overlay);
        log.overlays.push((id, overlay));
        id
    }

    fn overlays(&self) -> Vec<(OverlayId, OverlayKind)> {
        let log = self.0.lock().unwrap();
        log.overlays.iter().map(|(id, overlay)| (*id, overlay.kind())).collect()
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        self.0.lock().unwrap().overlays.retain(|(existing, _)| *existing != id);
    }
}

struct RecordingTriage(SharedLog);

impl TriageSurface for RecordingTriage {
    fn clear(&mut self) {
        let mut log = self.0.lock().unwrap();
        log.rows.clear();
        log.placeholder = None;
    }

    fn show_placeholder(&mut self, text: &str) {
        self.0.lock().unwrap().placeholder = Some(text.to_string());
    }

    fn push_row(&mut self, row: TriageRow) {
        self.0.lock().unwrap().rows.push(row);
    }

    fn activate(&self, index: usize) -> Option<TagRequest> {
        self.0.lock().unwrap().rows.get(index).map(|row| row.action.clone())
    }
}

struct RecordingControls(SharedLog);

impl ControlSurface for RecordingControls {
    fn set_admin_indicator(&mut self, label: &str, active: bool) {
        self.0.lock().unwrap().indicator = Some((label.to_string(), active));
    }
}

struct ScriptedPrompt(SharedLog);

impl CoordinatePrompt for ScriptedPrompt {
    fn prompt(&mut self, message: &str) -> Option<String> {
        let mut log = self.0.lock().unwrap();
        log.prompts.push(message.to_string());
        log.answers.pop_front().flatten()
    }
}

struct RecordingNotifier(SharedLog);

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notice: Notice) {
        self.0.lock().unwrap().notices.push(notice);
    }
}

pub fn recording_surfaces() -> (Surfaces, SharedLog) {
    let log: SharedLog = Arc::new(Mutex::new(UiLog::default()));
    let surfaces = Surfaces {
        map: Box::new(RecordingMap(Arc::clone(&log))),
        triage: Box::new(RecordingTriage(Arc::clone(&log))),
        controls: Box::new(RecordingControls(Arc::clone(&log))),
        prompt: Box::new(ScriptedPrompt(Arc::clone(&log))),
        notifier: Box::new(RecordingNotifier(Arc::clone(&log))),
    };
    (surfaces, log)
}

/// Queue prompt answers; `None` cancels that prompt
pub fn answer_prompts(log: &SharedLog, answers: &[Option<&str>]) {
    log.lock()
        .unwrap()
        .answers
        .extend(answers.iter().map(|a| a.map(str::to_string)));
}

// =============================================================================
// Gated in-memory service
// =============================================================================

/// Fetches wait on oneshot gates queued by the test, in call order
#[derive(Default)]
pub struct GatedService {
    gates: Mutex<VecDeque<oneshot::Receiver<Vec<Reading>>>>,
}

impl GatedService {
    /// Queue a gate for the next fetch; send on the returned sender to complete it
    pub fn push_gate(&self) -> oneshot::Sender<Vec<Reading>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl ReadingService for GatedService {
    async fn fetch_readings(&self) -> TriageResult<Vec<Reading>> {
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.map_err(|_| TriageError::Network("gate dropped".to_string())),
            None => Err(TriageError::Network("no gate queued".to_string())),
        }
    }

    async fn update_reading(&self, _reading_id: &str, _coords: Coordinates) -> TriageResult<UpdateAck> {
        Ok(UpdateAck::default())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn tagged_reading(id: &str, lat: f64, lon: f64, is_potable: Value) -> Value {
    json!({
        "reading_id": id,
        "device_id": "esp32-01",
        "timestamp_utc": 1730000000,
        "latitude": lat,
        "longitude": lon,
        "ph": "7.10",
        "solids": "320.50",
        "turbidity": "2.80",
        "is_potable": is_potable,
    })
}

pub fn untagged_reading(id: &str) -> Value {
    json!({
        "reading_id": id,
        "device_id": "esp32-01",
        "timestamp_utc": 1730000100,
        "ph": "6.40",
        "solids": "410.00",
        "turbidity": "4.10",
        "is_potable": 0,
    })
}

pub fn sample_readings() -> Vec<Value> {
    vec![
        tagged_reading("t-safe", 12.97, 77.59, json!(1)),
        untagged_reading("abc123"),
        tagged_reading("t-unsafe", 13.03, 77.62, json!("0")),
        json!({"timestamp_utc": 1730000200, "ph": "7.00", "solids": "150.00", "latitude": 0, "longitude": 0}),
    ]
}

pub fn readings_from(values: Vec<Value>) -> Vec<Reading> {
    values.into_iter().map(|v| Reading::from_value(v).unwrap()).collect()
}
