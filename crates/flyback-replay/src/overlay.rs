//! Static trajectory backdrop, built once per replay.

use flyback_core::ScreenProjector;
use nalgebra::Point2;
use serde::Serialize;
use tracing::warn;

use crate::config::PlaybackConfig;
use crate::telemetry::TelemetryStore;

pub const TITLE: &str = "Trajectory profile";
pub const X_AXIS_LABEL: &str = "Downrange distance [km]";
pub const Y_AXIS_LABEL: &str = "Altitude [km]";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeMarker {
    pub position: Point2<f64>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMarker {
    pub position: Point2<f64>,
    pub label: String,
    pub time: f64,
    /// Sample the marker is pinned to.
    pub sample_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub points: Vec<Point2<f64>>,
    pub time_markers: Vec<TimeMarker>,
    pub event_markers: Vec<EventMarker>,
    pub line_thickness: u32,
}

impl Overlay {
    pub fn build(store: &TelemetryStore, projector: &ScreenProjector, config: &PlaybackConfig) -> Self {
        let points: Vec<Point2<f64>> = store
            .samples()
            .iter()
            .map(|s| projector.project(s.downrange, s.altitude))
            .collect();

        let time_markers = if config.time_marker_stride == 0 {
            Vec::new()
        } else {
            store
                .samples()
                .iter()
                .zip(&points)
                .step_by(config.time_marker_stride)
                .map(|(s, p)| TimeMarker {
                    position: *p,
                    label: format!("{:.0} s", s.time),
                })
                .collect()
        };

        let mut event_markers = Vec::with_capacity(config.events.len());
        for event in &config.events {
            match store.first_at_or_after(event.time) {
                Some((index, _)) => event_markers.push(EventMarker {
                    position: points[index],
                    label: event.label.clone(),
                    time: event.time,
                    sample_index: index,
                }),
                None => warn!(
                    event = %event.label,
                    time_s = event.time,
                    "telemetry ends before event; marker skipped"
                ),
            }
        }

        Self {
            points,
            time_markers,
            event_markers,
            line_thickness: config.line_thickness,
        }
    }
}
