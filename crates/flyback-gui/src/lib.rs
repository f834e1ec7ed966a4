//! Flyback GUI - Web viewer for booster telemetry replays
//!
//! Features:
//! - Full replay (frames + overlay) as JSON for the browser player
//! - Single frames rendered server-side as SVG
//! - Telemetry summary with flight events

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use flyback_core::{InversionPolicy, InversionPreset, ALL_EVENTS};
use flyback_replay::overlay::{TITLE, X_AXIS_LABEL, Y_AXIS_LABEL};
use flyback_replay::{render_svg, Frame, Overlay, PlaybackConfig, Session, TelemetryStore};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

/// Shared, read-only state behind every request.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<TelemetryStore>,
    base: PlaybackConfig,
}

impl AppState {
    pub fn new(store: Arc<TelemetryStore>, base: PlaybackConfig) -> Self {
        Self { store, base }
    }
}

/// Creates the Axum router with all routes
pub fn create_router(store: Arc<TelemetryStore>, base: PlaybackConfig) -> Router {
    Router::new()
        .route("/api/replay", get(handle_replay))
        .route("/api/frame/{index}", get(handle_frame))
        .route("/api/summary", get(handle_summary))
        .fallback_service(ServeDir::new("crates/flyback-gui/static"))
        .with_state(AppState::new(store, base))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<flyback_replay::ReplayError> for ApiError {
    fn from(err: flyback_replay::ReplayError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, message = %self.message, "request rejected");
        (self.status, self.message).into_response()
    }
}

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

fn parse_preset(name: &str) -> Option<InversionPreset> {
    match name {
        "separation" => Some(InversionPreset::Separation),
        "boostback_flip" | "boostback-flip" => Some(InversionPreset::BoostbackFlip),
        "boostback_quarter_turn" | "boostback-quarter-turn" => {
            Some(InversionPreset::BoostbackQuarterTurn)
        }
        _ => None,
    }
}

/// Parse config overrides from query parameters on top of the server's base config
fn parse_config(base: &PlaybackConfig, params: &HashMap<String, String>) -> Result<PlaybackConfig, ApiError> {
    let mut config = base.clone();

    macro_rules! parse_param {
        ($($field:ident).+, $name:expr, $type:ty) => {
            if let Some(val) = params.get($name).and_then(|v| v.parse::<$type>().ok()) {
                config.$($field).+ = val;
            }
        };
    }

    // Preset goes first so the individual inversion fields can refine it
    if let Some(name) = params.get("preset") {
        let preset = parse_preset(name)
            .ok_or_else(|| ApiError::bad_request(format!("unknown preset '{name}'")))?;
        config.inversion = InversionPolicy::from_preset(preset);
    }

    parse_param!(width, "width", u32);
    parse_param!(height, "height", u32);
    parse_param!(fps, "fps", u32);
    parse_param!(line_thickness, "thickness", u32);
    parse_param!(rotation_step, "rotation_step", f64);
    parse_param!(separation_time, "separation_time", f64);
    parse_param!(inversion.threshold_time, "inversion_threshold", f64);
    parse_param!(inversion.offset_degrees, "inversion_offset", f64);
    parse_param!(icon.scale, "icon_scale", f64);

    if let Some(seed) = params.get("seed").and_then(|v| v.parse::<u64>().ok()) {
        config.seed = Some(seed);
    }

    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AxisLabels {
    title: &'static str,
    x_axis: &'static str,
    y_axis: &'static str,
}

#[derive(Debug, Serialize)]
struct ReplayResponse {
    width: u32,
    height: u32,
    fps: u32,
    /// Drawn icon size in pixels.
    icon_width: f64,
    icon_height: f64,
    labels: AxisLabels,
    overlay: Overlay,
    frames: Vec<Frame>,
}

#[derive(Debug, Serialize)]
struct EventInfo {
    label: &'static str,
    time: f64,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    samples: usize,
    frames: usize,
    duration: f64,
    max_altitude: f64,
    max_downrange: f64,
    max_speed: f64,
    events: Vec<EventInfo>,
}

fn build_replay(state: &AppState, config: PlaybackConfig) -> Result<ReplayResponse, ApiError> {
    let (width, height, fps) = (config.width, config.height, config.fps);
    let (icon_width, icon_height) = (config.icon.drawn_width(), config.icon.drawn_height());
    let mut session = Session::new(Arc::clone(&state.store), config)?;
    let frames = session.collect_frames();
    debug!(frames = frames.len(), "replay built");
    Ok(ReplayResponse {
        width,
        height,
        fps,
        icon_width,
        icon_height,
        labels: AxisLabels {
            title: TITLE,
            x_axis: X_AXIS_LABEL,
            y_axis: Y_AXIS_LABEL,
        },
        overlay: session.overlay().clone(),
        frames,
    })
}

/// Renders the frame showing sample `index`. Index 0 is never shown on its
/// own; the first frame already points at sample 1.
fn build_frame_svg(state: &AppState, config: PlaybackConfig, index: usize) -> Result<String, ApiError> {
    let last = state.store.len().saturating_sub(1);
    let valid = if last == 0 { index == 0 } else { (1..=last).contains(&index) };
    if !valid {
        return Err(ApiError::not_found(format!("no frame for sample {index}")));
    }

    let mut session = Session::new(Arc::clone(&state.store), config)?;
    loop {
        let frame = session.tick();
        if frame.index >= index || session.compositor().is_finished() {
            return Ok(render_svg(session.overlay(), &frame, session.config()));
        }
    }
}

fn build_summary(state: &AppState) -> SummaryResponse {
    let store = &state.store;
    SummaryResponse {
        samples: store.len(),
        frames: store.len().saturating_sub(1).max(1),
        duration: store.duration(),
        max_altitude: store.max_altitude(),
        max_downrange: store.max_downrange(),
        max_speed: store.max_speed(),
        events: ALL_EVENTS
            .iter()
            .map(|e| EventInfo {
                label: e.label(),
                time: e.time(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Handle full replay request
async fn handle_replay(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ReplayResponse>, ApiError> {
    let config = parse_config(&state.base, &params)?;
    build_replay(&state, config).map(Json)
}

/// Handle single frame request, rendered as SVG
async fn handle_frame(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let config = parse_config(&state.base, &params)?;
    let svg = build_frame_svg(&state, config, index)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn handle_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    Json(build_summary(&state))
}
