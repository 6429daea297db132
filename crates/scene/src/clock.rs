use std::time::Instant;

/// Monotonic frame clock.
///
/// `elapsed` drives the cube spin; `delta` feeds frame-rate readouts.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
    last: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    /// Seconds since the clock started.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Seconds since the previous call to `delta` (or since start).
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn elapsed_is_monotonic() {
        let clock = Clock::new();
        let a = clock.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.elapsed();
        assert!(b > a);
    }

    #[test]
    fn delta_resets_each_call() {
        let mut clock = Clock::new();
        std::thread::sleep(Duration::from_millis(5));
        let first = clock.delta();
        let second = clock.delta();
        assert!(first >= 0.005);
        assert!(second < first);
    }
}
