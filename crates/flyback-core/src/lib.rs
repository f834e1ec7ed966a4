//! # Flyback Core
//!
//! Closed-form arithmetic behind the booster replay. Nothing in here touches
//! files, clocks or randomness:
//! - Screen mapping (linear interpolation into the plot area)
//! - Heading and inversion-aware icon geometry
//! - Rotation easing state machine
//! - Playback cursor
//! - Named flight events

pub mod events;
pub mod mapping;
pub mod orientation;
pub mod playback;
pub mod rotation;

// Re-export core types
pub use events::{FlightEvent, ALL_EVENTS, BOOSTBACK_END_TIME, STAGE_SEPARATION_TIME};
pub use mapping::{map_value, ScreenProjector};
pub use orientation::{heading_angle, rotate_point, InversionPolicy, InversionPreset, SignConvention};
pub use playback::PlaybackCursor;
pub use rotation::{RotationAnimator, RotationPhase, DEFAULT_ROTATION_STEP};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
