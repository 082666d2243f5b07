use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the clock origin, taken at the tick.
    pub now_ms: f64,

    /// Milliseconds since the previous tick (since the origin for the first tick).
    pub dt_ms: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing page-style timestamps.
///
/// Timestamps are monotonic milliseconds relative to the moment the clock was
/// created. Deltas are reported as measured; consumers that integrate over time
/// own any clamping policy.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
    last_ms: f64,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock whose zero is `origin`.
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            last_ms: 0.0,
            frame_index: 0,
        }
    }

    /// Advances the clock to the current instant.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    ///
    /// Instants earlier than the origin or the previous tick do not move time backwards.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let now_ms = (now.saturating_duration_since(self.origin).as_secs_f64() * 1000.0)
            .max(self.last_ms);

        let ft = FrameTime {
            now_ms,
            dt_ms: now_ms - self.last_ms,
            frame_index: self.frame_index,
        };

        self.last_ms = now_ms;
        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timestamps_are_relative_to_origin() {
        let origin = Instant::now();
        let mut clock = FrameClock::starting_at(origin);

        let first = clock.tick_at(origin + Duration::from_millis(16));
        assert!((first.now_ms - 16.0).abs() < 1e-6);
        assert!((first.dt_ms - 16.0).abs() < 1e-6);
        assert_eq!(first.frame_index, 0);

        let second = clock.tick_at(origin + Duration::from_millis(1016));
        assert!((second.now_ms - 1016.0).abs() < 1e-6);
        assert!((second.dt_ms - 1000.0).abs() < 1e-6);
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn never_runs_backwards() {
        let origin = Instant::now();
        let mut clock = FrameClock::starting_at(origin);

        clock.tick_at(origin + Duration::from_millis(50));
        let stale = clock.tick_at(origin + Duration::from_millis(10));
        assert!((stale.now_ms - 50.0).abs() < 1e-6);
        assert_eq!(stale.dt_ms, 0.0);
    }
}
