use std::time::Instant;

use crate::config::NOMINAL_FRAME_MS;
use crate::signal::{Signal, SubscriptionId};

/// Timing of one tick, in milliseconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockSample {
    /// Time since the clock was created
    pub elapsed_ms: f64,
    /// Time since the previous tick
    pub delta_ms: f64,
}

/// Render clock driven by display refresh.
///
/// The owner calls `tick` once per redraw; there is no timer of its own, so a
/// slow frame delays the next tick instead of queueing one.
pub struct Clock {
    start: Instant,
    last: Option<Instant>,
    sample: ClockSample,
    on_tick: Signal<ClockSample>,
}

impl Clock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: None,
            sample: ClockSample {
                elapsed_ms: 0.0,
                delta_ms: NOMINAL_FRAME_MS,
            },
            on_tick: Signal::new(),
        }
    }

    pub fn on_tick(&mut self, listener: impl FnMut(&ClockSample) + 'static) -> SubscriptionId {
        self.on_tick.subscribe(listener)
    }

    pub fn tick(&mut self) -> ClockSample {
        self.tick_at(Instant::now())
    }

    /// Advance to `now` and notify subscribers
    pub fn tick_at(&mut self, now: Instant) -> ClockSample {
        // The first tick has no predecessor; report one nominal frame
        let delta_ms = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f64() * 1000.0,
            None => NOMINAL_FRAME_MS,
        };
        self.last = Some(now);
        self.sample = ClockSample {
            elapsed_ms: now.saturating_duration_since(self.start).as_secs_f64() * 1000.0,
            delta_ms,
        };
        self.on_tick.emit(&self.sample);
        self.sample
    }

    /// Most recent sample
    pub fn sample(&self) -> ClockSample {
        self.sample
    }

    pub fn subscriber_count(&self) -> usize {
        self.on_tick.len()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn test_first_tick_reports_nominal_frame() {
        let start = Instant::now();
        let mut clock = Clock::starting_at(start);
        let sample = clock.tick_at(start + Duration::from_millis(250));
        assert_eq!(sample.delta_ms, NOMINAL_FRAME_MS);
        assert!((sample.elapsed_ms - 250.0).abs() < 1e-6);
    }

    #[test]
    fn test_delta_and_elapsed() {
        let start = Instant::now();
        let mut clock = Clock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(10));
        let sample = clock.tick_at(start + Duration::from_millis(43));
        assert!((sample.delta_ms - 33.0).abs() < 1e-6);
        assert!((sample.elapsed_ms - 43.0).abs() < 1e-6);
        assert_eq!(clock.sample(), sample);
    }

    #[test]
    fn test_subscribers_receive_each_tick() {
        let start = Instant::now();
        let mut clock = Clock::starting_at(start);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        clock.on_tick(move |sample| sink.borrow_mut().push(sample.elapsed_ms));
        assert_eq!(clock.subscriber_count(), 1);

        clock.tick_at(start + Duration::from_millis(16));
        clock.tick_at(start + Duration::from_millis(32));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!((seen[1] - 32.0).abs() < 1e-6);
    }
}
