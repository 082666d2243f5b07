use faerie_engine::core::EventResponse;
use faerie_engine::input::{InputEvent, Key, KeyState};

/// Held state of the two rotation keys.
///
/// Only the current physical state matters: no queue, no repeat count.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct InputLatch {
    pub left_held: bool,
    pub right_held: bool,
}

impl InputLatch {
    /// Updates the latch from an input event.
    ///
    /// Arrow key events are consumed; everything else is left to the host.
    pub fn apply(&mut self, event: &InputEvent) -> EventResponse {
        match event {
            InputEvent::Key { key, state, .. } => {
                let held = *state == KeyState::Pressed;
                match key {
                    Key::ArrowLeft => self.left_held = held,
                    Key::ArrowRight => self.right_held = held,
                    _ => return EventResponse::Ignored,
                }
                EventResponse::Consumed
            }

            // Releases are not delivered to an unfocused window.
            InputEvent::Focused(false) => {
                *self = Self::default();
                EventResponse::Ignored
            }

            InputEvent::Focused(true) => EventResponse::Ignored,
        }
    }

    /// Net rotation direction: `-1.0` left, `1.0` right, `0.0` for both or neither.
    pub fn direction(&self) -> f64 {
        match (self.left_held, self.right_held) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            repeat: false,
        }
    }

    #[test]
    fn press_and_release_toggle_each_flag() {
        let mut latch = InputLatch::default();

        latch.apply(&key(Key::ArrowLeft, KeyState::Pressed));
        assert!(latch.left_held);
        assert!(!latch.right_held);

        latch.apply(&key(Key::ArrowRight, KeyState::Pressed));
        assert!(latch.right_held);

        latch.apply(&key(Key::ArrowLeft, KeyState::Released));
        assert!(!latch.left_held);
        assert!(latch.right_held);
    }

    #[test]
    fn arrow_keys_are_consumed_and_others_ignored() {
        let mut latch = InputLatch::default();
        assert_eq!(
            latch.apply(&key(Key::ArrowLeft, KeyState::Pressed)),
            EventResponse::Consumed
        );
        assert_eq!(
            latch.apply(&key(Key::ArrowRight, KeyState::Released)),
            EventResponse::Consumed
        );
        assert_eq!(
            latch.apply(&key(Key::ArrowUp, KeyState::Pressed)),
            EventResponse::Ignored
        );
        assert_eq!(
            latch,
            InputLatch {
                left_held: true,
                right_held: false,
            }
        );
    }

    #[test]
    fn repeats_do_not_accumulate() {
        let mut latch = InputLatch::default();
        for _ in 0..5 {
            latch.apply(&InputEvent::Key {
                key: Key::ArrowRight,
                state: KeyState::Pressed,
                repeat: true,
            });
        }
        latch.apply(&key(Key::ArrowRight, KeyState::Released));
        assert!(!latch.right_held);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut latch = InputLatch::default();
        assert_eq!(latch.direction(), 0.0);

        latch.apply(&key(Key::ArrowLeft, KeyState::Pressed));
        assert_eq!(latch.direction(), -1.0);

        latch.apply(&key(Key::ArrowRight, KeyState::Pressed));
        assert_eq!(latch.direction(), 0.0);

        latch.apply(&key(Key::ArrowLeft, KeyState::Released));
        assert_eq!(latch.direction(), 1.0);
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut latch = InputLatch {
            left_held: true,
            right_held: true,
        };
        latch.apply(&InputEvent::Focused(false));
        assert_eq!(latch, InputLatch::default());
    }
}
