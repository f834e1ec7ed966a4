use serde::Serialize;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Degrees the displayed angle moves per tick while easing.
pub const DEFAULT_ROTATION_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPhase {
    Idle,
    Easing,
}

impl RotationPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Easing => "Easing",
        }
    }
}

// ---------------------------------------------------------------------------
// Animator
// ---------------------------------------------------------------------------

/// Eases the icon's displayed angle toward a target at a fixed step per
/// tick, always along the shorter arc.
///
/// When the target is exactly half a turn away the animator turns in the
/// negative direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationAnimator {
    step: f64,
    current: f64,
    target: f64,
    phase: RotationPhase,
}

impl Default for RotationAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION_STEP)
    }
}

impl RotationAnimator {
    /// # Panics
    ///
    /// Panics unless `step` is positive and finite; a zero step never
    /// settles.
    pub fn new(step: f64) -> Self {
        assert!(
            step > 0.0 && step.is_finite(),
            "rotation step must be positive and finite, got {step}"
        );
        Self {
            step,
            current: 0.0,
            target: 0.0,
            phase: RotationPhase::Idle,
        }
    }

    pub fn start(&mut self, target: f64) {
        self.target = target;
        self.phase = RotationPhase::Easing;
    }

    /// Advances one step. A no-op while idle.
    pub fn tick(&mut self) -> RotationPhase {
        if self.phase == RotationPhase::Idle {
            return self.phase;
        }

        // Clockwise offset to the target in [0, 360)
        let delta = (self.target - self.current).rem_euclid(360.0);
        let distance = delta.min(360.0 - delta);

        if distance <= self.step {
            self.current = self.target;
            self.phase = RotationPhase::Idle;
        } else {
            let direction = if delta < 180.0 { 1.0 } else { -1.0 };
            self.current = (self.current + direction * self.step).rem_euclid(360.0);
        }

        self.phase
    }

    pub fn current_angle(&self) -> f64 {
        self.current
    }

    pub fn target_angle(&self) -> f64 {
        self.target
    }

    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    pub fn is_easing(&self) -> bool {
        self.phase == RotationPhase::Easing
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_tick_is_noop() {
        let mut anim = RotationAnimator::default();
        assert_eq!(anim.tick(), RotationPhase::Idle);
        assert_eq!(anim.current_angle(), 0.0);
    }

    #[test]
    fn test_reaches_target_in_two_steps() {
        let mut anim = RotationAnimator::new(5.0);
        anim.start(10.0);

        assert_eq!(anim.tick(), RotationPhase::Easing);
        assert_eq!(anim.current_angle(), 5.0);

        assert_eq!(anim.tick(), RotationPhase::Idle);
        assert_eq!(anim.current_angle(), 10.0);
    }

    #[test]
    fn test_takes_shorter_arc_counter_direction() {
        let mut anim = RotationAnimator::new(5.0);
        anim.start(181.0);
        anim.tick();
        assert_eq!(anim.current_angle(), 355.0);
        assert!(anim.is_easing());
    }

    #[test]
    fn test_half_turn_tie_breaks_negative() {
        let mut anim = RotationAnimator::new(5.0);
        anim.start(180.0);
        anim.tick();
        assert_eq!(anim.current_angle(), 355.0);
    }

    #[test]
    fn test_wraps_across_zero_and_settles() {
        let mut anim = RotationAnimator::new(5.0);
        anim.start(181.0);

        let mut ticks = 0;
        while anim.tick() == RotationPhase::Easing {
            ticks += 1;
            assert!(ticks < 100, "animator never settled");
            assert!((0.0..360.0).contains(&anim.current_angle()));
        }
        assert_eq!(anim.current_angle(), 181.0);
        // 179° of travel: 35 full steps, then the snap
        assert_eq!(ticks, 35);
    }

    #[test]
    #[should_panic(expected = "rotation step")]
    fn test_zero_step_rejected() {
        RotationAnimator::new(0.0);
    }

    #[test]
    #[should_panic(expected = "rotation step")]
    fn test_negative_step_rejected() {
        RotationAnimator::new(-5.0);
    }

    #[test]
    fn test_restart_retargets() {
        let mut anim = RotationAnimator::new(5.0);
        anim.start(20.0);
        anim.tick();
        anim.start(-10.0);
        anim.tick();
        assert_eq!(anim.current_angle(), 0.0);
        assert_eq!(anim.tick(), RotationPhase::Easing);
        assert_eq!(anim.current_angle(), 355.0);
        // Snaps to the raw target, not its wrapped form
        assert_eq!(anim.tick(), RotationPhase::Idle);
        assert_eq!(anim.current_angle(), -10.0);
    }
}
