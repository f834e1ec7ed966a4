//! Recorded flight telemetry and its load-time checks.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ReplayError, Result};

/// CSV header names of the recorded booster telemetry.
pub mod columns {
    pub const TIME: &str = "Time [s]";
    pub const ALTITUDE: &str = "Smoothed altitude [km]";
    pub const DOWNRANGE: &str = "Downrange distance [km]";
    pub const HORIZONTAL_SPEED: &str = "Horizontal speed [m/s]";
    pub const VERTICAL_SPEED: &str = "Vertical speed [m/s]";
    pub const SPEED: &str = "Smoothed speed [m/s]";
    pub const MACH: &str = "Mach number";
    pub const DYNAMIC_PRESSURE: &str = "Dynamic pressure [kPa]";
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// One time-stamped telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Sample {
    pub time: f64,             // s
    pub altitude: f64,         // km
    pub downrange: f64,        // km
    pub horizontal_speed: f64, // m/s
    pub vertical_speed: f64,   // m/s
    pub speed: f64,            // m/s
    pub mach: f64,
    pub dynamic_pressure: f64, // kPa
}

/// Row as it appears on disk. Blank cells and absent columns are `None`.
#[derive(Debug, Deserialize)]
struct RawSample {
    #[serde(rename = "Time [s]", default)]
    time: Option<f64>,
    #[serde(rename = "Smoothed altitude [km]", default)]
    altitude: Option<f64>,
    #[serde(rename = "Downrange distance [km]", default)]
    downrange: Option<f64>,
    #[serde(rename = "Horizontal speed [m/s]", default)]
    horizontal_speed: Option<f64>,
    #[serde(rename = "Vertical speed [m/s]", default)]
    vertical_speed: Option<f64>,
    #[serde(rename = "Smoothed speed [m/s]", default)]
    speed: Option<f64>,
    #[serde(rename = "Mach number", default)]
    mach: Option<f64>,
    #[serde(rename = "Dynamic pressure [kPa]", default)]
    dynamic_pressure: Option<f64>,
}

impl From<RawSample> for Sample {
    fn from(raw: RawSample) -> Self {
        Self {
            time: raw.time.unwrap_or(0.0),
            altitude: raw.altitude.unwrap_or(0.0),
            downrange: raw.downrange.unwrap_or(0.0),
            horizontal_speed: raw.horizontal_speed.unwrap_or(0.0),
            vertical_speed: raw.vertical_speed.unwrap_or(0.0),
            speed: raw.speed.unwrap_or(0.0),
            mach: raw.mach.unwrap_or(0.0),
            dynamic_pressure: raw.dynamic_pressure.unwrap_or(0.0),
        }
    }
}

impl Sample {
    /// Every field paired with its column name.
    pub fn fields(&self) -> [(&'static str, f64); 8] {
        [
            (columns::TIME, self.time),
            (columns::ALTITUDE, self.altitude),
            (columns::DOWNRANGE, self.downrange),
            (columns::HORIZONTAL_SPEED, self.horizontal_speed),
            (columns::VERTICAL_SPEED, self.vertical_speed),
            (columns::SPEED, self.speed),
            (columns::MACH, self.mach),
            (columns::DYNAMIC_PRESSURE, self.dynamic_pressure),
        ]
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Ordered, read-only telemetry with the extrema used for plot scaling.
#[derive(Debug, Clone)]
pub struct TelemetryStore {
    samples: Vec<Sample>,
    max_altitude: f64,
    max_downrange: f64,
}

impl TelemetryStore {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let store = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            samples = store.len(),
            duration_s = store.duration(),
            "telemetry loaded"
        );
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut samples = Vec::new();
        for record in rdr.deserialize::<RawSample>() {
            samples.push(Sample::from(record?));
        }
        debug!(rows = samples.len(), "parsed telemetry rows");

        Self::from_samples(samples)
    }

    /// Validates finiteness, ordering and plot bounds. Rows are reported
    /// 1-based, not counting the header.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(ReplayError::Empty);
        }

        for (i, sample) in samples.iter().enumerate() {
            if let Some((field, _)) = sample.fields().into_iter().find(|(_, v)| !v.is_finite()) {
                return Err(ReplayError::NonFinite { row: i + 1, field });
            }
        }

        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1].time < pair[0].time {
                return Err(ReplayError::TimeNotMonotonic {
                    row: i + 2,
                    previous: pair[0].time,
                    current: pair[1].time,
                });
            }
        }

        let max_altitude = samples
            .iter()
            .map(|s| s.altitude)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_downrange = samples
            .iter()
            .map(|s| s.downrange)
            .fold(f64::NEG_INFINITY, f64::max);

        // Both axes start at zero, so a zero maximum collapses the domain
        check_domain("altitude", max_altitude)?;
        check_domain("downrange", max_downrange)?;

        Ok(Self {
            samples,
            max_altitude,
            max_downrange,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; a store holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }

    pub fn last(&self) -> &Sample {
        &self.samples[self.samples.len() - 1]
    }

    pub fn max_altitude(&self) -> f64 {
        self.max_altitude
    }

    pub fn max_downrange(&self) -> f64 {
        self.max_downrange
    }

    pub fn max_speed(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.speed)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Elapsed time between first and last sample (s).
    pub fn duration(&self) -> f64 {
        self.last().time - self.first().time
    }

    /// First sample recorded at or after `time`.
    pub fn first_at_or_after(&self, time: f64) -> Option<(usize, &Sample)> {
        self.samples.iter().enumerate().find(|(_, s)| s.time >= time)
    }
}

fn check_domain(field: &'static str, max: f64) -> Result<()> {
    if max == 0.0 || !max.is_finite() {
        return Err(ReplayError::DegenerateDomain { field, max });
    }
    Ok(())
}
