use nalgebra::Point2;

// ---------------------------------------------------------------------------
// Linear mapping
// ---------------------------------------------------------------------------

/// Linearly maps `value` from `[domain_low, domain_high]` onto
/// `[range_low, range_high]`.
///
/// The domain must not be degenerate; `domain_high == domain_low` yields an
/// infinite or NaN result. Callers validate bounds before mapping.
#[inline]
pub fn map_value(
    value: f64,
    domain_low: f64,
    domain_high: f64,
    range_low: f64,
    range_high: f64,
) -> f64 {
    range_low + (range_high - range_low) * ((value - domain_low) / (domain_high - domain_low))
}

// ---------------------------------------------------------------------------
// Screen projection
// ---------------------------------------------------------------------------

/// Fraction of the surface kept free on each side of the plot.
pub const PLOT_MARGIN: f64 = 0.1;

/// Projects (downrange, altitude) pairs into screen pixels.
///
/// Downrange grows to the right, altitude grows upward (screen y shrinks).
/// Both domains start at zero and end at the telemetry maxima.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenProjector {
    pub width: f64,
    pub height: f64,
    pub max_downrange: f64,
    pub max_altitude: f64,
}

impl ScreenProjector {
    pub fn new(width: f64, height: f64, max_downrange: f64, max_altitude: f64) -> Self {
        Self {
            width,
            height,
            max_downrange,
            max_altitude,
        }
    }

    pub fn x(&self, downrange: f64) -> f64 {
        map_value(
            downrange,
            0.0,
            self.max_downrange,
            self.width * PLOT_MARGIN,
            self.width * (1.0 - PLOT_MARGIN),
        )
    }

    pub fn y(&self, altitude: f64) -> f64 {
        map_value(
            altitude,
            0.0,
            self.max_altitude,
            self.height * (1.0 - PLOT_MARGIN),
            self.height * PLOT_MARGIN,
        )
    }

    pub fn project(&self, downrange: f64, altitude: f64) -> Point2<f64> {
        Point2::new(self.x(downrange), self.y(altitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_endpoints() {
        assert_eq!(map_value(2.0, 2.0, 6.0, 10.0, 30.0), 10.0);
        assert_eq!(map_value(6.0, 2.0, 6.0, 10.0, 30.0), 30.0);
        assert_eq!(map_value(4.0, 2.0, 6.0, 10.0, 30.0), 20.0);
    }

    #[test]
    fn test_map_monotonic_follows_slope_sign() {
        // Increasing range
        let a = map_value(1.0, 0.0, 10.0, 0.0, 100.0);
        let b = map_value(2.0, 0.0, 10.0, 0.0, 100.0);
        assert!(b > a);

        // Inverted range (screen y axis)
        let a = map_value(1.0, 0.0, 10.0, 540.0, 60.0);
        let b = map_value(2.0, 0.0, 10.0, 540.0, 60.0);
        assert!(b < a);
    }

    #[test]
    fn test_degenerate_domain_is_not_finite() {
        assert!(!map_value(1.0, 3.0, 3.0, 0.0, 1.0).is_finite());
    }

    #[test]
    fn test_projector_corners() {
        let proj = ScreenProjector::new(1000.0, 600.0, 80.0, 120.0);

        let origin = proj.project(0.0, 0.0);
        assert!((origin.x - 100.0).abs() < 1e-9);
        assert!((origin.y - 540.0).abs() < 1e-9);

        let peak = proj.project(80.0, 120.0);
        assert!((peak.x - 900.0).abs() < 1e-9);
        assert!((peak.y - 60.0).abs() < 1e-9);
    }
}
