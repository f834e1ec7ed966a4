//! Flyback Replay Library
//!
//! Loads recorded booster telemetry and turns it into drawable frames:
//! telemetry store, per-tick compositor, static overlay, canvas rendering
//! and the replay session that drives them.

pub mod canvas;
pub mod clock;
pub mod compositor;
pub mod config;
pub mod error;
pub mod overlay;
pub mod particles;
pub mod session;
pub mod telemetry;

// Re-export main types
pub use canvas::{render_frame, render_svg, Canvas, Color, SvgCanvas};
pub use clock::FrameClock;
pub use compositor::{Compositor, Frame, FrameRecord};
pub use config::{limits, EventMarkerSpec, IconSpec, ParamSpec, ParticleConfig, PlaybackConfig};
pub use error::{ReplayError, Result};
pub use overlay::Overlay;
pub use particles::{emit_particles, particle_count, Particle, ParticleColor};
pub use session::{RunSummary, Session};
pub use telemetry::{Sample, TelemetryStore};
