/// Frame cursor over a fixed-length telemetry sequence.
///
/// Advances by exactly one per tick and freezes on the last sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor {
    index: usize,
    len: usize,
}

impl PlaybackCursor {
    /// `len` is clamped to at least one sample.
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len: len.max(1),
        }
    }

    /// Moves to the next sample unless already on the last one.
    /// Returns whether the cursor moved.
    pub fn tick(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.len - 1
    }

    /// Fraction of the replay already shown, in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.len <= 1 {
            return 1.0;
        }
        self.index as f64 / (self.len - 1) as f64
    }
}
