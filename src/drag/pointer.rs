use std::time::{Duration, Instant};

/// Press/release pairs shorter than this count as a click.
pub const DEFAULT_CLICK_THRESHOLD: Duration = Duration::from_millis(200);

/// Classification of a completed pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerGesture {
    /// Short press: open the block settings instead of dragging.
    Click,
    Drag,
}

/// Tracks pointer-down time so a release can be classified.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    threshold: Duration,
    pressed_at: Option<Instant>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_THRESHOLD)
    }
}

impl PointerTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pressed_at: None,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn pointer_down(&mut self, at: Instant) {
        self.pressed_at = Some(at);
    }

    /// Classify the release. A release without a matching press yields `None`.
    pub fn pointer_up(&mut self, at: Instant) -> Option<PointerGesture> {
        let pressed_at = self.pressed_at.take()?;
        let held = at.saturating_duration_since(pressed_at);
        if held < self.threshold {
            Some(PointerGesture::Click)
        } else {
            Some(PointerGesture::Drag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_press_is_a_click() {
        let mut tracker = PointerTracker::default();
        let start = Instant::now();
        tracker.pointer_down(start);
        let gesture = tracker.pointer_up(start + Duration::from_millis(120));
        assert_eq!(gesture, Some(PointerGesture::Click));
    }

    #[test]
    fn long_press_is_a_drag() {
        let mut tracker = PointerTracker::default();
        let start = Instant::now();
        tracker.pointer_down(start);
        let gesture = tracker.pointer_up(start + Duration::from_millis(200));
        assert_eq!(gesture, Some(PointerGesture::Drag));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut tracker = PointerTracker::new(Duration::from_millis(50));
        assert_eq!(tracker.pointer_up(Instant::now()), None);

        let start = Instant::now();
        tracker.pointer_down(start);
        tracker.pointer_up(start);
        assert_eq!(tracker.pointer_up(start), None);
    }
}
