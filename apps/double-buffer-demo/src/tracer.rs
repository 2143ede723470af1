use std::time::{Duration, Instant};

/// Named checkpoints within a tick, timed against the previous checkpoint.
#[derive(Debug)]
pub struct Tracer {
    /// Marks slower than this are logged at `debug`.
    pub time_threshold: Duration,
    tick_start: Instant,
    last_mark: Instant,
    last_tick: Duration,
    slowest: Option<(String, Duration)>,
}

impl Default for Tracer {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            time_threshold: Duration::from_millis(20),
            tick_start: now,
            last_mark: now,
            last_tick: Duration::ZERO,
            slowest: None,
        }
    }
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_tick(&mut self) {
        let now = Instant::now();
        self.tick_start = now;
        self.last_mark = now;
        self.slowest = None;
    }

    /// Record the time since the previous mark under `name`.
    pub fn mark(&mut self, name: &str) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_mark);
        self.last_mark = now;

        if elapsed > self.time_threshold {
            log::debug!("{name}: {:.3} ms", elapsed.as_secs_f64() * 1000.0);
        }
        if self.slowest.as_ref().map_or(true, |(_, d)| elapsed > *d) {
            self.slowest = Some((name.to_string(), elapsed));
        }
        elapsed
    }

    pub fn end_tick(&mut self) -> Duration {
        self.last_tick = self.tick_start.elapsed();
        self.last_tick
    }

    pub fn last_tick_ms(&self) -> f64 {
        self.last_tick.as_secs_f64() * 1000.0
    }

    /// Slowest mark of the current (or last finished) tick.
    pub fn slowest_mark(&self) -> Option<(&str, Duration)> {
        self.slowest.as_ref().map(|(name, d)| (name.as_str(), *d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slowest_mark_tracks_maximum() {
        let mut tracer = Tracer::new();
        tracer.begin_tick();
        tracer.mark("a");
        std::thread::sleep(Duration::from_millis(5));
        tracer.mark("b");
        tracer.mark("c");
        tracer.end_tick();

        let (name, elapsed) = tracer.slowest_mark().unwrap();
        assert_eq!(name, "b");
        assert!(elapsed >= Duration::from_millis(5));
        assert!(tracer.last_tick_ms() >= 5.0);
    }

    #[test]
    fn test_begin_tick_resets_slowest() {
        let mut tracer = Tracer::new();
        tracer.mark("a");
        tracer.begin_tick();
        assert!(tracer.slowest_mark().is_none());
    }
}
