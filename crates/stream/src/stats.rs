/// Rolling statistics for the streaming loop.
///
/// `record` counts a completed submission into the current one-second
/// window; `roll` closes the window and publishes its count as the
/// displayed rate. The most recent face count outlives window boundaries.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    completed_in_window: usize,
    displayed_fps: usize,
    last_face_count: usize,
    total_completed: usize,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, face_count: usize) {
        self.completed_in_window += 1;
        self.total_completed += 1;
        self.last_face_count = face_count;
    }

    pub fn roll(&mut self) {
        self.displayed_fps = self.completed_in_window;
        self.completed_in_window = 0;
    }

    /// Completions during the last full one-second window.
    pub fn displayed_fps(&self) -> usize {
        self.displayed_fps
    }

    pub fn last_face_count(&self) -> usize {
        self.last_face_count
    }

    pub fn total_completed(&self) -> usize {
        self.total_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_publishes_window_count() {
        let mut stats = StatsAggregator::new();
        stats.record(1);
        stats.record(0);
        stats.record(2);
        assert_eq!(stats.displayed_fps(), 0, "nothing published before a roll");

        stats.roll();
        assert_eq!(stats.displayed_fps(), 3);
        assert_eq!(stats.total_completed(), 3);
    }

    #[test]
    fn test_empty_window_rolls_to_zero() {
        let mut stats = StatsAggregator::new();
        stats.record(1);
        stats.roll();
        stats.roll();
        assert_eq!(stats.displayed_fps(), 0);
    }

    #[test]
    fn test_last_face_count_survives_roll() {
        let mut stats = StatsAggregator::new();
        stats.record(4);
        stats.roll();
        assert_eq!(stats.last_face_count(), 4);
    }
}
