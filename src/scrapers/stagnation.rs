/// What one height observation meant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagnationSignal {
    /// Height differs from the previous tick; new baseline recorded
    Grew,
    /// Height unchanged for this many consecutive ticks
    Unchanged(u32),
    /// Threshold reached; counter reset. Soft signal only, the loop keeps going.
    Backoff,
}

/// Counts consecutive ticks in which the document height did not change
#[derive(Debug, Clone)]
pub struct StagnationTracker {
    threshold: u32,
    baseline: Option<u64>,
    unchanged: u32,
    backoffs: u64,
}

impl StagnationTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            baseline: None,
            unchanged: 0,
            backoffs: 0,
        }
    }

    /// Start comparing against `height`, forgetting any previous run
    pub fn arm(&mut self, height: u64) {
        self.baseline = Some(height);
        self.unchanged = 0;
        self.backoffs = 0;
    }

    pub fn disarm(&mut self) {
        self.baseline = None;
        self.unchanged = 0;
        self.backoffs = 0;
    }

    pub fn observe(&mut self, height: u64) -> StagnationSignal {
        if self.baseline == Some(height) {
            self.unchanged += 1;
            if self.unchanged >= self.threshold {
                self.unchanged = 0;
                self.backoffs += 1;
                StagnationSignal::Backoff
            } else {
                StagnationSignal::Unchanged(self.unchanged)
            }
        } else {
            self.unchanged = 0;
            self.baseline = Some(height);
            StagnationSignal::Grew
        }
    }

    pub fn unchanged(&self) -> u32 {
        self.unchanged
    }

    pub fn baseline(&self) -> Option<u64> {
        self.baseline
    }

    pub fn backoffs(&self) -> u64 {
        self.backoffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_after_exactly_threshold_unchanged_ticks() {
        let mut tracker = StagnationTracker::new(5);
        tracker.arm(1000);

        for expected in 1..5 {
            assert_eq!(tracker.observe(1000), StagnationSignal::Unchanged(expected));
        }
        assert_eq!(tracker.observe(1000), StagnationSignal::Backoff);
        assert_eq!(tracker.unchanged(), 0);
        assert_eq!(tracker.backoffs(), 1);

        // Not terminal: counting starts over.
        assert_eq!(tracker.observe(1000), StagnationSignal::Unchanged(1));
    }

    #[test]
    fn height_change_resets_the_counter() {
        let mut tracker = StagnationTracker::new(5);
        tracker.arm(1000);

        tracker.observe(1000);
        tracker.observe(1000);
        tracker.observe(1000);
        assert_eq!(tracker.unchanged(), 3);

        assert_eq!(tracker.observe(1600), StagnationSignal::Grew);
        assert_eq!(tracker.unchanged(), 0);
        assert_eq!(tracker.baseline(), Some(1600));
        assert_eq!(tracker.observe(1600), StagnationSignal::Unchanged(1));
    }

    #[test]
    fn unarmed_tracker_treats_first_height_as_growth() {
        let mut tracker = StagnationTracker::new(5);
        assert_eq!(tracker.observe(800), StagnationSignal::Grew);
        assert_eq!(tracker.baseline(), Some(800));
    }

    #[test]
    fn zero_threshold_is_clamped() {
        let mut tracker = StagnationTracker::new(0);
        tracker.arm(10);
        assert_eq!(tracker.observe(10), StagnationSignal::Backoff);
    }
}
