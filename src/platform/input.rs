//! Raw input to gesture decoding
//!
//! Keyboard arrows map one-to-one onto gestures. Touch input goes through
//! `SwipeTracker`: touching holds a slide, a horizontal swipe shifts lanes,
//! an upward swipe jumps, and dragging sideways cancels the hold.

pub use crate::sim::Gesture;

/// Minimum travel in pixels before a touch counts as a swipe
pub const SWIPE_THRESHOLD_PX: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
}

/// Gesture for a key transition, if any
pub fn key_gesture(key: Key, pressed: bool) -> Option<Gesture> {
    match (key, pressed) {
        (Key::Left, true) => Some(Gesture::LaneShift(-1)),
        (Key::Right, true) => Some(Gesture::LaneShift(1)),
        (Key::Up, true) => Some(Gesture::Jump),
        (Key::Down, true) => Some(Gesture::SlideStart),
        (Key::Down, false) => Some(Gesture::SlideEnd),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
    holding: bool,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Finger down: the hold (slide) starts immediately
    pub fn touch_start(&mut self, x: f32, y: f32) -> Vec<Gesture> {
        self.start = Some((x, y));
        self.holding = true;
        vec![Gesture::SlideStart]
    }

    /// A sideways drag past the threshold releases the hold
    pub fn touch_move(&mut self, x: f32, _y: f32) -> Vec<Gesture> {
        match self.start {
            Some((sx, _)) if self.holding && (x - sx).abs() > SWIPE_THRESHOLD_PX => {
                self.holding = false;
                vec![Gesture::SlideEnd]
            }
            _ => Vec::new(),
        }
    }

    /// Finger up: release any hold, then classify the swipe
    pub fn touch_end(&mut self, x: f32, y: f32) -> Vec<Gesture> {
        let mut gestures = Vec::new();
        if std::mem::take(&mut self.holding) {
            gestures.push(Gesture::SlideEnd);
        }
        let Some((sx, sy)) = self.start.take() else {
            return gestures;
        };

        let (dx, dy) = (x - sx, y - sy);
        if dx.abs() > dy.abs() {
            if dx.abs() > SWIPE_THRESHOLD_PX {
                gestures.push(Gesture::LaneShift(if dx > 0.0 { 1 } else { -1 }));
            }
        } else if dy < -SWIPE_THRESHOLD_PX {
            // Screen y grows downward
            gestures.push(Gesture::Jump);
        }
        gestures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(key_gesture(Key::Left, true), Some(Gesture::LaneShift(-1)));
        assert_eq!(key_gesture(Key::Down, false), Some(Gesture::SlideEnd));
        assert_eq!(key_gesture(Key::Up, false), None);
    }

    #[test]
    fn test_tap_is_a_short_slide() {
        let mut tracker = SwipeTracker::new();
        assert_eq!(tracker.touch_start(100.0, 100.0), vec![Gesture::SlideStart]);
        assert!(tracker.is_holding());
        assert_eq!(tracker.touch_end(105.0, 102.0), vec![Gesture::SlideEnd]);
    }

    #[test]
    fn test_horizontal_swipe_shifts_lane() {
        let mut tracker = SwipeTracker::new();
        tracker.touch_start(100.0, 100.0);
        assert_eq!(tracker.touch_move(140.0, 100.0), vec![Gesture::SlideEnd]);
        assert!(tracker.touch_move(160.0, 100.0).is_empty());
        assert_eq!(tracker.touch_end(160.0, 105.0), vec![Gesture::LaneShift(1)]);

        tracker.touch_start(100.0, 100.0);
        let gestures = tracker.touch_end(50.0, 100.0);
        assert_eq!(gestures, vec![Gesture::SlideEnd, Gesture::LaneShift(-1)]);
    }

    #[test]
    fn test_upward_swipe_jumps() {
        let mut tracker = SwipeTracker::new();
        tracker.touch_start(100.0, 300.0);
        let gestures = tracker.touch_end(105.0, 200.0);
        assert_eq!(gestures, vec![Gesture::SlideEnd, Gesture::Jump]);

        // Downward swipe does nothing beyond releasing the hold
        tracker.touch_start(100.0, 100.0);
        assert_eq!(tracker.touch_end(100.0, 200.0), vec![Gesture::SlideEnd]);
    }
}
