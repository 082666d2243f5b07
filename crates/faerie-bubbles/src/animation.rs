//! Rotation kinematics.
//!
//! Everything here is pure so a frame can be stepped without a GPU.

use std::f64::consts::PI;

use crate::latch::InputLatch;

pub const MIN_ANGLE: f64 = -3.0 * PI / 8.0;
pub const MAX_ANGLE: f64 = 3.0 * PI / 8.0;

/// Radians per second while a single direction is held.
pub const ANGULAR_RATE: f64 = PI / 2.0;

/// Angle change for `dt_ms` milliseconds of input.
pub fn angle_delta(latch: InputLatch, dt_ms: f64) -> f64 {
    latch.direction() * ANGULAR_RATE * dt_ms / 1000.0
}

/// Mutable per-frame state of the quad.
///
/// Invariant: `current_angle` stays within `[MIN_ANGLE, MAX_ANGLE]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct AnimationState {
    current_angle: f64,
    previous_frame_time: f64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_angle(&self) -> f64 {
        self.current_angle
    }

    pub fn previous_frame_time(&self) -> f64 {
        self.previous_frame_time
    }

    /// Advances to the frame stamped `now_ms` and returns the new angle.
    pub fn tick(&mut self, latch: InputLatch, now_ms: f64) -> f64 {
        let dt = now_ms - self.previous_frame_time;
        self.current_angle =
            (self.current_angle + angle_delta(latch, dt)).clamp(MIN_ANGLE, MAX_ANGLE);
        self.previous_frame_time = now_ms;
        self.current_angle
    }

    /// `(sin θ, cos θ)` as consumed by the vertex stage.
    pub fn rotation_vector(&self) -> [f32; 2] {
        let (sin, cos) = self.current_angle.sin_cos();
        [sin as f32, cos as f32]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    const NONE: InputLatch = InputLatch {
        left_held: false,
        right_held: false,
    };
    const LEFT: InputLatch = InputLatch {
        left_held: true,
        right_held: false,
    };
    const RIGHT: InputLatch = InputLatch {
        left_held: false,
        right_held: true,
    };
    const BOTH: InputLatch = InputLatch {
        left_held: true,
        right_held: true,
    };

    fn at(angle: f64, time: f64) -> AnimationState {
        AnimationState {
            current_angle: angle,
            previous_frame_time: time,
        }
    }

    #[test]
    fn rate_is_quarter_turn_per_second() {
        assert!((angle_delta(RIGHT, 1000.0) - PI / 2.0).abs() < EPS);
        assert!((angle_delta(LEFT, 500.0) + PI / 4.0).abs() < EPS);
        assert_eq!(angle_delta(NONE, 1000.0), 0.0);
        assert_eq!(angle_delta(BOTH, 1000.0), 0.0);
    }

    #[test]
    fn holding_right_for_a_second_clamps_to_max() {
        let mut s = AnimationState::new();
        let angle = s.tick(RIGHT, 1000.0);
        assert!((angle - MAX_ANGLE).abs() < EPS);
        assert!((angle - 1.178_097_245).abs() < 1e-6);
        assert_eq!(s.previous_frame_time(), 1000.0);
    }

    #[test]
    fn small_steps_integrate_linearly() {
        let mut s = AnimationState::new();
        s.tick(LEFT, 100.0);
        s.tick(LEFT, 200.0);
        assert!((s.current_angle() + PI / 10.0).abs() < EPS);
    }

    #[test]
    fn both_or_neither_leave_angle_unchanged() {
        for latch in [NONE, BOTH] {
            for dt in [0.0, 16.0, 1000.0, 1.0e7] {
                let mut s = at(0.3, 50.0);
                s.tick(latch, 50.0 + dt);
                assert_eq!(s.current_angle(), 0.3);
            }
        }
    }

    #[test]
    fn zero_elapsed_time_is_a_no_op() {
        for latch in [NONE, LEFT, RIGHT, BOTH] {
            let mut s = at(-0.7, 120.0);
            s.tick(latch, 120.0);
            assert_eq!(s, at(-0.7, 120.0));
        }
    }

    #[test]
    fn angle_never_leaves_bounds() {
        let latches = [NONE, LEFT, RIGHT, BOTH, RIGHT, RIGHT, LEFT, LEFT, LEFT];
        let mut s = AnimationState::new();
        let mut now = 0.0;
        for i in 0..500 {
            now += (i % 7) as f64 * 37.0;
            s.tick(latches[i % latches.len()], now);
            let a = s.current_angle();
            assert!((MIN_ANGLE..=MAX_ANGLE).contains(&a), "angle {a} out of range");
        }
    }

    #[test]
    fn left_clamps_to_min() {
        let mut s = AnimationState::new();
        s.tick(LEFT, 60_000.0);
        assert_eq!(s.current_angle(), MIN_ANGLE);
    }

    #[test]
    fn press_left_then_right_cancels() {
        use faerie_engine::input::{InputEvent, Key, KeyState};

        let mut latch = InputLatch::default();
        for key in [Key::ArrowLeft, Key::ArrowRight] {
            latch.apply(&InputEvent::Key {
                key,
                state: KeyState::Pressed,
                repeat: false,
            });
        }

        let mut s = at(0.25, 0.0);
        s.tick(latch, 800.0);
        assert_eq!(s.current_angle(), 0.25);
    }

    #[test]
    fn rotation_vector_is_sin_cos() {
        let s = at(0.0, 0.0);
        assert_eq!(s.rotation_vector(), [0.0, 1.0]);

        let s = at(MAX_ANGLE, 0.0);
        let [sin, cos] = s.rotation_vector();
        assert!((sin as f64 - MAX_ANGLE.sin()).abs() < 1e-6);
        assert!((cos as f64 - MAX_ANGLE.cos()).abs() < 1e-6);
    }
}
