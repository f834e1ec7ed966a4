// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

/// Stage separation, seconds after liftoff. Triggers the flip rotation.
pub const STAGE_SEPARATION_TIME: f64 = 60.0 * 2.0 + 48.0;

/// End of the boostback burn, seconds after liftoff.
pub const BOOSTBACK_END_TIME: f64 = 60.0 * 3.0 + 48.0;

/// Named events annotated on the trajectory overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FlightEvent {
    MaxQ = 0,
    Meco = 1,
    StageSeparation = 2,
    BoostbackStart = 3,
    BoostbackEnd = 4,
    GridfinsLive = 5,
    LandingBurn = 6,
}

impl FlightEvent {
    pub fn label(self) -> &'static str {
        match self {
            Self::MaxQ => "Max Q",
            Self::Meco => "MECO",
            Self::StageSeparation => "Stage sep",
            Self::BoostbackStart => "Boostback start",
            Self::BoostbackEnd => "Boostback end",
            Self::GridfinsLive => "Gridfins live",
            Self::LandingBurn => "Landing burn",
        }
    }

    /// Seconds after liftoff.
    pub fn time(self) -> f64 {
        match self {
            Self::MaxQ => 60.0,
            Self::Meco => 60.0 * 2.0 + 42.0,
            Self::StageSeparation => STAGE_SEPARATION_TIME,
            Self::BoostbackStart => 60.0 * 2.0 + 54.0,
            Self::BoostbackEnd => BOOSTBACK_END_TIME,
            Self::GridfinsLive => 60.0 * 6.0 + 5.0,
            Self::LandingBurn => 60.0 * 6.0 + 54.0,
        }
    }
}

pub const NUM_EVENTS: usize = 7;

/// Events in chronological order.
pub const ALL_EVENTS: [FlightEvent; NUM_EVENTS] = [
    FlightEvent::MaxQ,
    FlightEvent::Meco,
    FlightEvent::StageSeparation,
    FlightEvent::BoostbackStart,
    FlightEvent::BoostbackEnd,
    FlightEvent::GridfinsLive,
    FlightEvent::LandingBurn,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_chronological() {
        for pair in ALL_EVENTS.windows(2) {
            assert!(pair[0].time() < pair[1].time(), "{:?}", pair);
        }
    }

    #[test]
    fn test_named_thresholds() {
        assert_eq!(STAGE_SEPARATION_TIME, 168.0);
        assert_eq!(BOOSTBACK_END_TIME, 228.0);
        assert_eq!(FlightEvent::StageSeparation.label(), "Stage sep");
    }
}
