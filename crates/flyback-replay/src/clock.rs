use std::time::{Duration, Instant};

/// Fixed-rate pacing for the tick loop.
///
/// `wait` blocks until one period has passed since the previous deadline.
/// A loop that falls behind is not made to catch up.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Duration,
    next: Option<Instant>,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            next: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns how long the call slept.
    pub fn wait(&mut self) -> Duration {
        let now = Instant::now();
        let slept = match self.next {
            Some(deadline) if deadline > now => {
                let d = deadline - now;
                std::thread::sleep(d);
                d
            }
            _ => Duration::ZERO,
        };
        self.next = Some(Instant::now() + self.period);
        slept
    }
}
