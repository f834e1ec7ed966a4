//! The replay context: one owned object holding everything the tick loop
//! touches.

use std::convert::Infallible;
use std::ops::ControlFlow;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::clock::FrameClock;
use crate::compositor::{Compositor, Frame};
use crate::config::PlaybackConfig;
use crate::error::Result;
use crate::overlay::Overlay;
use crate::telemetry::TelemetryStore;

/// Outcome of a completed or interrupted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub last_index: usize,
    pub stopped_early: bool,
}

pub struct Session<R = StdRng> {
    config: PlaybackConfig,
    store: Arc<TelemetryStore>,
    overlay: Overlay,
    compositor: Compositor<R>,
    clock: Option<FrameClock>,
}

impl Session<StdRng> {
    /// Builds a session seeded from `config.seed`, or from entropy when no
    /// seed is set.
    pub fn new(store: Arc<TelemetryStore>, config: PlaybackConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(store, config, rng)
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(store: Arc<TelemetryStore>, config: PlaybackConfig, rng: R) -> Result<Self> {
        let compositor = Compositor::new(store.clone(), &config, rng)?;
        let overlay = Overlay::build(&store, compositor.projector(), &config);

        Ok(Self {
            config,
            store,
            overlay,
            compositor,
            clock: None,
        })
    }

    /// Paces `run` at the configured tick rate.
    pub fn paced(mut self) -> Self {
        self.clock = Some(FrameClock::new(self.config.fps));
        self
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn store(&self) -> &TelemetryStore {
        &self.store
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn compositor(&self) -> &Compositor<R> {
        &self.compositor
    }

    /// Changes the trajectory line thickness and rebuilds the overlay.
    pub fn adjust_line_thickness(&mut self, delta: i32) -> bool {
        if !self.config.adjust_line_thickness(delta) {
            return false;
        }
        self.overlay = Overlay::build(&self.store, self.compositor.projector(), &self.config);
        true
    }

    /// Advances a single tick.
    pub fn tick(&mut self) -> Frame {
        self.compositor.tick()
    }

    /// Ticks until the last sample has been shown, handing every frame to
    /// `sink`. The sink stops the loop early by returning `Break`.
    pub fn run<E, F>(&mut self, mut sink: F) -> std::result::Result<RunSummary, E>
    where
        F: FnMut(&Overlay, &Frame) -> std::result::Result<ControlFlow<()>, E>,
    {
        let mut frames = 0;
        let mut stopped_early = false;

        loop {
            if let Some(clock) = &mut self.clock {
                clock.wait();
            }

            let frame = self.compositor.tick();
            frames += 1;

            if sink(&self.overlay, &frame)?.is_break() {
                stopped_early = true;
                break;
            }
            if self.compositor.is_finished() {
                break;
            }
        }

        let summary = RunSummary {
            frames,
            last_index: self.compositor.cursor().index(),
            stopped_early,
        };
        info!(
            frames = summary.frames,
            last_index = summary.last_index,
            stopped_early,
            "replay finished"
        );
        Ok(summary)
    }

    /// Runs to the end and keeps every frame.
    pub fn collect_frames(&mut self) -> Vec<Frame> {
        let mut out = Vec::with_capacity(self.store.len());
        let result = self.run::<Infallible, _>(|_, frame| {
            out.push(frame.clone());
            Ok(ControlFlow::Continue(()))
        });
        match result {
            Ok(_) => out,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Sample;

    fn store(n: usize) -> Arc<TelemetryStore> {
        let samples = (0..n)
            .map(|i| Sample {
                time: i as f64,
                altitude: 1.0 + i as f64,
                downrange: 1.0 + i as f64,
                speed: 50.0,
                ..Sample::default()
            })
            .collect();
        Arc::new(TelemetryStore::from_samples(samples).unwrap())
    }

    fn seeded() -> PlaybackConfig {
        PlaybackConfig {
            seed: Some(3),
            ..PlaybackConfig::default()
        }
    }

    #[test]
    fn test_runs_n_minus_one_ticks() {
        let mut session = Session::new(store(10), seeded()).unwrap();
        let summary = session
            .run::<(), _>(|_, _| Ok(ControlFlow::Continue(())))
            .unwrap();
        assert_eq!(summary.frames, 9);
        assert_eq!(summary.last_index, 9);
        assert!(!summary.stopped_early);
    }

    #[test]
    fn test_huge_speed_is_capped_not_fatal() {
        let csv = "Time [s],Smoothed altitude [km],Downrange distance [km],Smoothed speed [m/s]\n\
                   0,1,1,0\n\
                   1,2,2,1e300\n";
        let store = Arc::new(TelemetryStore::from_reader(csv.as_bytes()).unwrap());
        let mut session = Session::new(store, seeded()).unwrap();
        let frame = session.tick();
        assert_eq!(frame.particles.len(), session.config().particles.max_particles);
    }

    #[test]
    fn test_rejects_config_that_would_panic_mid_run() {
        let config = PlaybackConfig::from_json(r#"{ "particles": { "jitter_deg": -30.0 } }"#);
        assert!(config.is_err());

        let mut bad = seeded();
        bad.particles.jitter_deg = -30.0;
        assert!(Session::new(store(3), bad).is_err());
    }

    #[test]
    fn test_single_sample_yields_one_frame() {
        let mut session = Session::new(store(1), seeded()).unwrap();
        let frames = session.collect_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].index, 0);
    }

    #[test]
    fn test_sink_can_stop_early_and_fail() {
        let mut session = Session::new(store(10), seeded()).unwrap();
        let summary = session
            .run::<(), _>(|_, frame| {
                Ok(if frame.index == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                })
            })
            .unwrap();
        assert_eq!(summary.frames, 3);
        assert!(summary.stopped_early);

        let err = session.run(|_, _| Err("disk full")).unwrap_err();
        assert_eq!(err, "disk full");
    }

    #[test]
    fn test_seeded_sessions_are_reproducible() {
        let a = Session::new(store(5), seeded()).unwrap().collect_frames();
        let b = Session::new(store(5), seeded()).unwrap().collect_frames();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = PlaybackConfig {
            width: 0,
            ..seeded()
        };
        assert!(Session::new(store(3), config).is_err());
    }

    #[test]
    fn test_thickness_change_rebuilds_overlay() {
        let mut session = Session::new(store(3), seeded()).unwrap();
        assert_eq!(session.overlay().line_thickness, 1);
        assert!(session.adjust_line_thickness(2));
        assert_eq!(session.overlay().line_thickness, 3);
        assert!(session.adjust_line_thickness(-10));
        assert_eq!(session.overlay().line_thickness, 1);
        assert!(!session.adjust_line_thickness(-1));
    }
}
