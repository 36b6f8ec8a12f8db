use std::time::Instant;

/// Lap timer feeding the FPS report.
pub trait LapTimer {
    /// Sets the baseline to now, discarding any previous lap.
    fn reset(&mut self);
    /// Seconds since the previous call (or reset), and starts the next lap.
    fn elapsed(&mut self) -> f64;
}

/// Lap timer backed by the system monotonic clock.
///
/// Before any baseline exists the first lap is reported as `0.0`; callers
/// should `reset` before relying on the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElapsedTimer {
    previous: Option<Instant>,
}

impl ElapsedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timer whose baseline is `now`.
    pub fn started_at(now: Instant) -> Self {
        Self {
            previous: Some(now),
        }
    }

    /// Ends the current lap at `now`.
    pub fn elapsed_at(&mut self, now: Instant) -> f64 {
        let seconds = self
            .previous
            .map(|previous| now.saturating_duration_since(previous).as_secs_f64())
            .unwrap_or(0.0);
        self.previous = Some(now);
        seconds
    }
}

impl LapTimer for ElapsedTimer {
    fn reset(&mut self) {
        self.previous = Some(Instant::now());
    }

    fn elapsed(&mut self) -> f64 {
        self.elapsed_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn laps_measure_time_between_calls() {
        let start = Instant::now();
        let mut timer = ElapsedTimer::started_at(start);
        let first = timer.elapsed_at(start + Duration::from_millis(250));
        let second = timer.elapsed_at(start + Duration::from_millis(1250));
        assert!((first - 0.25).abs() < 1e-9);
        assert!((second - 1.0).abs() < 1e-9);
    }

    #[test]
    fn resolves_sub_millisecond_laps() {
        let start = Instant::now();
        let mut timer = ElapsedTimer::started_at(start);
        let lap = timer.elapsed_at(start + Duration::from_micros(150));
        assert!((lap - 0.000_15).abs() < 1e-9);
    }

    #[test]
    fn first_lap_without_baseline_is_zero() {
        let mut timer = ElapsedTimer::new();
        assert_eq!(timer.elapsed_at(Instant::now()), 0.0);
    }

    #[test]
    fn reset_moves_the_baseline() {
        let earlier = Instant::now()
            .checked_sub(Duration::from_secs(60))
            .unwrap_or_else(Instant::now);
        let mut timer = ElapsedTimer::started_at(earlier);
        timer.reset();
        assert!(timer.elapsed() < 30.0);
    }
}
