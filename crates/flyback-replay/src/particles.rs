//! Cosmetic exhaust particles. Nothing here carries state between ticks.

use nalgebra::{Point2, Vector2};
use rand::Rng;
use serde::Serialize;

use crate::canvas::Color;
use crate::config::ParticleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleColor {
    Red,
    Orange,
}

impl ParticleColor {
    pub fn color(self) -> Color {
        match self {
            Self::Red => Color::RED,
            Self::Orange => Color::ORANGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub position: Point2<f64>,
    pub radius: u8,
    pub color: ParticleColor,
}

/// `floor(speed / speed_per_particle)`, capped at `max_particles`; zero for
/// non-positive speeds.
pub fn particle_count(speed: f64, cfg: &ParticleConfig) -> usize {
    if speed > 0.0 && speed.is_finite() {
        let count = (speed / cfg.speed_per_particle).floor();
        count.min(cfg.max_particles as f64) as usize
    } else {
        0
    }
}

/// Scatters particles behind the icon, opposite its nose.
///
/// `angle_deg` follows the icon convention (clockwise from screen-up).
pub fn emit_particles<R: Rng + ?Sized>(
    rng: &mut R,
    origin: Point2<f64>,
    angle_deg: f64,
    speed: f64,
    cfg: &ParticleConfig,
) -> Vec<Particle> {
    let count = particle_count(speed, cfg);
    let mut particles = Vec::with_capacity(count);

    for _ in 0..count {
        let jitter = rng.gen_range(-cfg.jitter_deg..=cfg.jitter_deg);
        let distance = rng.gen_range(cfg.min_distance..=cfg.max_distance);
        let rad = (angle_deg + jitter).to_radians();

        let color = if rng.gen_bool(0.5) {
            ParticleColor::Red
        } else {
            ParticleColor::Orange
        };

        particles.push(Particle {
            position: origin + Vector2::new(-rad.sin(), rad.cos()) * distance,
            radius: rng.gen_range(1..=3),
            color,
        });
    }

    particles
}
