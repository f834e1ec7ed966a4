//! Per-tick frame composition.

use std::sync::Arc;

use flyback_core::{
    heading_angle, InversionPolicy, PlaybackCursor, RotationAnimator, RotationPhase,
    ScreenProjector,
};
use nalgebra::Point2;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::{ParticleConfig, PlaybackConfig};
use crate::error::Result;
use crate::particles::{emit_particles, Particle};
use crate::telemetry::{Sample, TelemetryStore};

/// Everything needed to draw one tick on top of the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub index: usize,
    pub sample: Sample,
    /// Icon center in screen pixels.
    pub position: Point2<f64>,
    /// Heading from the velocity components (degrees).
    pub heading: f64,
    /// Eased angle the icon is drawn at (degrees).
    pub displayed_angle: f64,
    pub rotation: RotationPhase,
    pub inverted: bool,
    /// Icon nose in screen pixels.
    pub top: Point2<f64>,
    pub particles: Vec<Particle>,
}

/// Flat per-frame row for CSV logs.
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub index: usize,
    pub time: f64,
    pub altitude: f64,
    pub downrange: f64,
    pub speed: f64,
    pub mach: f64,
    pub dynamic_pressure: f64,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub displayed_angle: f64,
    pub rotation: &'static str,
    pub inverted: bool,
    pub top_x: f64,
    pub top_y: f64,
    pub particles: usize,
}

impl From<&Frame> for FrameRecord {
    fn from(f: &Frame) -> Self {
        Self {
            index: f.index,
            time: f.sample.time,
            altitude: f.sample.altitude,
            downrange: f.sample.downrange,
            speed: f.sample.speed,
            mach: f.sample.mach,
            dynamic_pressure: f.sample.dynamic_pressure,
            x: f.position.x,
            y: f.position.y,
            heading: f.heading,
            displayed_angle: f.displayed_angle,
            rotation: f.rotation.label(),
            inverted: f.inverted,
            top_x: f.top.x,
            top_y: f.top.y,
            particles: f.particles.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

pub struct Compositor<R> {
    store: Arc<TelemetryStore>,
    projector: ScreenProjector,
    cursor: PlaybackCursor,
    animator: RotationAnimator,
    policy: InversionPolicy,
    separation_time: f64,
    /// Latched once the flip has been started.
    separation_started: bool,
    half_height: f64,
    particles: ParticleConfig,
    rng: R,
}

impl<R: Rng> Compositor<R> {
    /// Fails when `config` does not validate.
    pub fn new(store: Arc<TelemetryStore>, config: &PlaybackConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let projector = ScreenProjector::new(
            config.width as f64,
            config.height as f64,
            store.max_downrange(),
            store.max_altitude(),
        );

        Ok(Self {
            cursor: PlaybackCursor::new(store.len()),
            store,
            projector,
            animator: RotationAnimator::new(config.rotation_step),
            policy: config.inversion,
            separation_time: config.separation_time,
            separation_started: false,
            half_height: config.icon.drawn_height() / 2.0,
            particles: config.particles,
            rng,
        })
    }

    /// Advances playback one sample and composes the resulting frame.
    ///
    /// On the last sample the cursor stays put and the same sample is
    /// composed again.
    pub fn tick(&mut self) -> Frame {
        // 1. Cursor first
        self.cursor.tick();
        let index = self.cursor.index();
        let sample = self.store.samples()[index];

        // 2. Screen placement
        let position = self.projector.project(sample.downrange, sample.altitude);
        let heading = heading_angle(sample.horizontal_speed, sample.vertical_speed);

        // 3. Flip after separation, once
        if !self.separation_started && sample.time >= self.separation_time {
            self.separation_started = true;
            self.animator.start(heading + 180.0);
            debug!(
                index,
                time_s = sample.time,
                target_deg = heading + 180.0,
                "separation reached, starting flip"
            );
        }

        // 4. Rotation second
        let rotation = self.animator.tick();
        let displayed_angle = self.animator.current_angle();

        let top = self
            .policy
            .top_position(position, displayed_angle, self.half_height, sample.time);

        let particles = emit_particles(
            &mut self.rng,
            position,
            displayed_angle,
            sample.speed,
            &self.particles,
        );

        Frame {
            index,
            sample,
            position,
            heading,
            displayed_angle,
            rotation,
            inverted: self.policy.is_inverted(sample.time),
            top,
            particles,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor.is_finished()
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn animator(&self) -> &RotationAnimator {
        &self.animator
    }

    pub fn projector(&self) -> &ScreenProjector {
        &self.projector
    }

    pub fn current_sample(&self) -> &Sample {
        &self.store.samples()[self.cursor.index()]
    }

    pub fn separation_started(&self) -> bool {
        self.separation_started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn climbing_store(times: &[f64]) -> Arc<TelemetryStore> {
        let samples = times
            .iter()
            .enumerate()
            .map(|(i, &t)| Sample {
                time: t,
                altitude: 1.0 + i as f64,
                downrange: 1.0 + i as f64,
                horizontal_speed: 0.0,
                vertical_speed: 100.0,
                speed: 100.0,
                ..Sample::default()
            })
            .collect();
        Arc::new(TelemetryStore::from_samples(samples).unwrap())
    }

    #[test]
    fn test_three_rows_land_on_peak() {
        let store = climbing_store(&[0.0, 1.0, 2.0]);
        let config = PlaybackConfig::default();
        let mut comp = Compositor::new(store, &config, rng()).unwrap();

        let mut last = None;
        for _ in 0..2 {
            last = Some(comp.tick());
        }
        let frame = last.unwrap();

        assert!(comp.is_finished());
        assert_eq!(frame.index, 2);
        assert!((frame.position.x - 1000.0 * 0.9).abs() < 1e-9);
        assert!((frame.position.y - 600.0 * 0.1).abs() < 1e-9);
        assert_eq!(frame.particles.len(), 10);
    }

    #[test]
    fn test_terminal_tick_repeats_last_sample() {
        let store = climbing_store(&[0.0, 1.0]);
        let mut comp = Compositor::new(store, &PlaybackConfig::default(), rng()).unwrap();

        let first = comp.tick();
        for _ in 0..5 {
            let again = comp.tick();
            assert_eq!(again.index, first.index);
            assert_eq!(again.sample, first.sample);
        }
        assert_eq!(comp.current_sample().time, 1.0);
    }

    #[test]
    fn test_flip_triggers_once_at_separation() {
        let times: Vec<f64> = (0..100).map(|i| 160.0 + i as f64).collect();
        let store = climbing_store(&times);
        let mut comp = Compositor::new(store, &PlaybackConfig::default(), rng()).unwrap();

        // Samples 1..=7 are before 168 s
        for _ in 0..7 {
            let frame = comp.tick();
            assert_eq!(frame.rotation, RotationPhase::Idle);
            assert_eq!(frame.displayed_angle, 0.0);
        }
        assert!(!comp.separation_started());

        // Sample 8 is exactly 168 s
        let frame = comp.tick();
        assert!(comp.separation_started());
        assert_eq!(frame.rotation, RotationPhase::Easing);
        // Heading is -90 (straight up), so the target is 90
        assert_eq!(comp.animator().target_angle(), 90.0);
        assert_eq!(frame.displayed_angle, 5.0);

        // Settles at the target and never restarts
        let mut settled = None;
        for _ in 0..40 {
            let frame = comp.tick();
            if frame.rotation == RotationPhase::Idle {
                settled.get_or_insert(frame.index);
                assert_eq!(frame.displayed_angle, 90.0);
            }
        }
        assert_eq!(settled, Some(8 + 17));
    }

    #[test]
    fn test_top_point_follows_displayed_angle() {
        let store = climbing_store(&[0.0, 1.0]);
        let config = PlaybackConfig::default();
        let mut comp = Compositor::new(store, &config, rng()).unwrap();

        let frame = comp.tick();
        let half = config.icon.drawn_height() / 2.0;
        assert!((frame.top.x - frame.position.x).abs() < 1e-9);
        assert!((frame.top.y - (frame.position.y - half)).abs() < 1e-9);
        assert!(!frame.inverted);
    }

    #[test]
    fn test_rejects_unvalidated_config() {
        let store = climbing_store(&[0.0, 1.0]);
        let config = PlaybackConfig {
            rotation_step: 0.0,
            ..PlaybackConfig::default()
        };
        assert!(matches!(
            Compositor::new(store, &config, rng()),
            Err(crate::ReplayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_frame_record_flattens() {
        let store = climbing_store(&[0.0, 1.0]);
        let mut comp = Compositor::new(store, &PlaybackConfig::default(), rng()).unwrap();
        let frame = comp.tick();
        let record = FrameRecord::from(&frame);
        assert_eq!(record.index, 1);
        assert_eq!(record.rotation, "Idle");
        assert_eq!(record.particles, frame.particles.len());
    }
}
