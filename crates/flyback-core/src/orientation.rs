use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::events::{BOOSTBACK_END_TIME, STAGE_SEPARATION_TIME};

// ---------------------------------------------------------------------------
// Heading
// ---------------------------------------------------------------------------

/// Heading in degrees from the velocity components.
///
/// Screen y grows downward, so the atan2 result is negated: a purely vertical
/// climb reads -90°, level flight 0°.
#[inline]
pub fn heading_angle(horizontal_speed: f64, vertical_speed: f64) -> f64 {
    -vertical_speed.atan2(horizontal_speed).to_degrees()
}

/// Rotates `point` about `center` by `angle_deg` (clockwise on screen).
pub fn rotate_point(point: Point2<f64>, center: Point2<f64>, angle_deg: f64) -> Point2<f64> {
    let rot = Rotation2::new(angle_deg.to_radians());
    center + rot * (point - center)
}

// ---------------------------------------------------------------------------
// Inversion policy
// ---------------------------------------------------------------------------

/// Which way the icon's nose points at angle zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// Nose up: top point is `(x + h·sin, y − h·cos)`.
    Standard,
    /// Asset drawn nose down: top point is `(x − h·sin, y + h·cos)`.
    Mirrored,
}

/// Named inversion rules found in earlier replay scripts.
///
/// They disagree on both the threshold and the offset; `Separation` is the
/// default used by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InversionPreset {
    /// Stage separation threshold, no offset.
    Separation,
    /// Boostback-end threshold, half-turn offset.
    BoostbackFlip,
    /// Boostback-end threshold, quarter-turn offset (-90°).
    BoostbackQuarterTurn,
}

impl InversionPreset {
    pub fn label(self) -> &'static str {
        match self {
            Self::Separation => "separation",
            Self::BoostbackFlip => "boostback-flip",
            Self::BoostbackQuarterTurn => "boostback-quarter-turn",
        }
    }
}

/// Decides when the vehicle counts as inverted and how that bends the
/// top-point geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InversionPolicy {
    /// Inverted strictly after this time (s).
    pub threshold_time: f64,
    /// Added to the angle while inverted (degrees).
    pub offset_degrees: f64,
    pub sign_convention: SignConvention,
}

impl Default for InversionPolicy {
    fn default() -> Self {
        Self::from_preset(InversionPreset::Separation)
    }
}

impl InversionPolicy {
    pub fn from_preset(preset: InversionPreset) -> Self {
        match preset {
            InversionPreset::Separation => Self {
                threshold_time: STAGE_SEPARATION_TIME,
                offset_degrees: 0.0,
                sign_convention: SignConvention::Standard,
            },
            InversionPreset::BoostbackFlip => Self {
                threshold_time: BOOSTBACK_END_TIME,
                offset_degrees: 180.0,
                sign_convention: SignConvention::Standard,
            },
            InversionPreset::BoostbackQuarterTurn => Self {
                threshold_time: BOOSTBACK_END_TIME,
                offset_degrees: -90.0,
                sign_convention: SignConvention::Standard,
            },
        }
    }

    pub fn is_inverted(&self, time: f64) -> bool {
        time > self.threshold_time
    }

    /// Angle after applying the inversion offset for `time`.
    pub fn effective_angle(&self, angle_deg: f64, time: f64) -> f64 {
        if self.is_inverted(time) {
            angle_deg + self.offset_degrees
        } else {
            angle_deg
        }
    }

    /// Screen position of the icon's nose.
    ///
    /// `angle_deg` is measured clockwise from screen-up; `half_height` is
    /// the distance from the icon center to its nose.
    pub fn top_position(
        &self,
        center: Point2<f64>,
        angle_deg: f64,
        half_height: f64,
        time: f64,
    ) -> Point2<f64> {
        let rad = self.effective_angle(angle_deg, time).to_radians();
        let nose = Vector2::new(rad.sin(), -rad.cos()) * half_height;
        match self.sign_convention {
            SignConvention::Standard => center + nose,
            SignConvention::Mirrored => center - nose,
        }
    }
}
