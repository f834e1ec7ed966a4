//! Replay configuration: defaults, bounds and JSON loading.

use std::path::Path;

use flyback_core::{
    FlightEvent, InversionPolicy, ALL_EVENTS, DEFAULT_ROTATION_STEP, STAGE_SEPARATION_TIME,
};
use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, Result};

/// Parameter specification with bounds and step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Human-readable label.
    pub label: &'static str,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Step size for interactive adjustment.
    pub step: f64,
}

impl ParamSpec {
    pub const fn new(label: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self {
            label,
            min,
            max,
            step,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Accepted ranges for user-tunable values.
pub mod limits {
    use super::ParamSpec;

    pub const WIDTH: ParamSpec = ParamSpec::new("Width (px)", 100.0, 8192.0, 10.0);
    pub const HEIGHT: ParamSpec = ParamSpec::new("Height (px)", 100.0, 8192.0, 10.0);
    pub const FPS: ParamSpec = ParamSpec::new("Ticks per second", 1.0, 240.0, 1.0);
    pub const ROTATION_STEP: ParamSpec = ParamSpec::new("Rotation Step (°/tick)", 0.1, 90.0, 0.5);
    pub const LINE_THICKNESS: ParamSpec = ParamSpec::new("Line Thickness (px)", 1.0, 10.0, 1.0);
    pub const ICON_SCALE: ParamSpec = ParamSpec::new("Icon Scale", 0.05, 5.0, 0.05);
    pub const JITTER: ParamSpec = ParamSpec::new("Particle Jitter (°)", 0.0, 180.0, 1.0);
    pub const MAX_PARTICLES: ParamSpec = ParamSpec::new("Max Particles", 0.0, 10_000.0, 10.0);
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// The vehicle drawable. Only its scaled height enters the geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconSpec {
    /// Image reference embedded in SVG output; a drawn silhouette is used
    /// when absent.
    pub href: Option<String>,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Default for IconSpec {
    fn default() -> Self {
        Self {
            href: None,
            width: 28.0,
            height: 160.0,
            scale: 0.5,
        }
    }
}

impl IconSpec {
    pub fn drawn_width(&self) -> f64 {
        self.width * self.scale
    }

    pub fn drawn_height(&self) -> f64 {
        self.height * self.scale
    }
}

/// Exhaust particle emission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// One particle per this much speed (m/s).
    pub speed_per_particle: f64,
    /// Maximum angular jitter either side of the exhaust axis (degrees).
    pub jitter_deg: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Ceiling on particles emitted per tick.
    pub max_particles: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            speed_per_particle: 10.0,
            jitter_deg: 30.0,
            min_distance: 20.0,
            max_distance: 40.0,
            max_particles: 200,
        }
    }
}

/// A labelled overlay annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMarkerSpec {
    pub label: String,
    pub time: f64,
}

impl From<FlightEvent> for EventMarkerSpec {
    fn from(event: FlightEvent) -> Self {
        Self {
            label: event.label().to_string(),
            time: event.time(),
        }
    }
}

// ---------------------------------------------------------------------------
// Playback config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub width: u32,
    pub height: u32,
    /// Target ticks per second.
    pub fps: u32,
    /// Degrees per tick for the flip rotation.
    pub rotation_step: f64,
    /// The flip starts on the first sample at or after this time (s).
    pub separation_time: f64,
    pub inversion: InversionPolicy,
    pub line_thickness: u32,
    /// A time marker every this many samples; 0 disables them.
    pub time_marker_stride: usize,
    pub icon: IconSpec,
    pub particles: ParticleConfig,
    pub events: Vec<EventMarkerSpec>,
    /// Seed for particle jitter. Unseeded when absent.
    pub seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            fps: 60,
            rotation_step: DEFAULT_ROTATION_STEP,
            separation_time: STAGE_SEPARATION_TIME,
            inversion: InversionPolicy::default(),
            line_thickness: 1,
            time_marker_stride: 60,
            icon: IconSpec::default(),
            particles: ParticleConfig::default(),
            events: ALL_EVENTS.iter().copied().map(EventMarkerSpec::from).collect(),
            seed: None,
        }
    }
}

impl PlaybackConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        check(&limits::WIDTH, self.width as f64)?;
        check(&limits::HEIGHT, self.height as f64)?;
        check(&limits::FPS, self.fps as f64)?;
        check(&limits::ROTATION_STEP, self.rotation_step)?;
        check(&limits::LINE_THICKNESS, self.line_thickness as f64)?;
        check(&limits::ICON_SCALE, self.icon.scale)?;

        if self.icon.height <= 0.0 || self.icon.width <= 0.0 {
            return Err(ReplayError::invalid_config("icon dimensions must be positive"));
        }
        let p = &self.particles;
        check(&limits::JITTER, p.jitter_deg)?;
        check(&limits::MAX_PARTICLES, p.max_particles as f64)?;
        if !(p.speed_per_particle > 0.0 && p.speed_per_particle.is_finite()) {
            return Err(ReplayError::invalid_config(
                "particles.speed_per_particle must be positive and finite",
            ));
        }
        if !(p.min_distance >= 0.0 && p.min_distance <= p.max_distance && p.max_distance.is_finite()) {
            return Err(ReplayError::invalid_config(
                "particles need 0 <= min_distance <= max_distance, both finite",
            ));
        }
        if !self.inversion.threshold_time.is_finite() || !self.separation_time.is_finite() {
            return Err(ReplayError::invalid_config("event thresholds must be finite"));
        }
        Ok(())
    }

    /// Nudges the trajectory line thickness, staying within bounds.
    /// Returns whether the value changed.
    pub fn adjust_line_thickness(&mut self, delta: i32) -> bool {
        let next = limits::LINE_THICKNESS.clamp(self.line_thickness as f64 + delta as f64) as u32;
        let changed = next != self.line_thickness;
        self.line_thickness = next;
        changed
    }
}

fn check(spec: &ParamSpec, value: f64) -> Result<()> {
    if spec.contains(value) {
        Ok(())
    } else {
        Err(ReplayError::InvalidConfig(format!(
            "{} = {} is outside [{}, {}]",
            spec.label, value, spec.min, spec.max
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyback_core::SignConvention;

    #[test]
    fn test_default_is_valid() {
        let config = PlaybackConfig::default();
        config.validate().unwrap();
        assert_eq!(config.events.len(), ALL_EVENTS.len());
        assert_eq!(config.events[2].label, "Stage sep");
        assert_eq!(config.icon.drawn_height(), 80.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PlaybackConfig::from_json(r#"{ "fps": 20, "icon": { "scale": 1.0 } }"#).unwrap();
        assert_eq!(config.fps, 20);
        assert_eq!(config.width, 1000);
        assert_eq!(config.icon.scale, 1.0);
        assert_eq!(config.icon.height, 160.0);
    }

    #[test]
    fn test_inversion_policy_from_json() {
        let config = PlaybackConfig::from_json(
            r#"{ "inversion": { "threshold_time": 228.0, "offset_degrees": -90.0, "sign_convention": "mirrored" } }"#,
        )
        .unwrap();
        assert_eq!(config.inversion.threshold_time, 228.0);
        assert_eq!(config.inversion.sign_convention, SignConvention::Mirrored);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            PlaybackConfig::from_json(r#"{ "fps": 0 }"#),
            Err(ReplayError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlaybackConfig::from_json(r#"{ "line_thickness": 11 }"#),
            Err(ReplayError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlaybackConfig::from_json(r#"{ "particles": { "jitter_deg": -30.0 } }"#),
            Err(ReplayError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlaybackConfig::from_json(r#"{ "particles": { "min_distance": -5.0 } }"#),
            Err(ReplayError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlaybackConfig::from_json(r#"{ "particles": { "min_distance": 50.0, "max_distance": 40.0 } }"#),
            Err(ReplayError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlaybackConfig::from_json(r#"{ "particles": { "max_particles": 1000000 } }"#),
            Err(ReplayError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlaybackConfig::from_json("{ not json"),
            Err(ReplayError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_line_thickness_adjustment_clamps() {
        let mut config = PlaybackConfig::default();
        assert!(!config.adjust_line_thickness(-1));
        assert_eq!(config.line_thickness, 1);
        assert!(config.adjust_line_thickness(1));
        assert_eq!(config.line_thickness, 2);
        config.adjust_line_thickness(50);
        assert_eq!(config.line_thickness, 10);
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = PlaybackConfig {
            seed: Some(7),
            ..PlaybackConfig::default()
        };
        let text = config.to_json_pretty().unwrap();
        assert_eq!(PlaybackConfig::from_json(&text).unwrap(), config);
    }
}
