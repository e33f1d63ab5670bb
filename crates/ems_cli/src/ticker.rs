//! Fixed-rate ticker for the scheduled report.
//!
//! Ticks are anchored to the start instant, not to the end of the previous
//! run. A run that overruns one or more periods skips the missed ticks
//! instead of firing them back to back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct FixedRateTicker {
    period: Duration,
    next_tick: Instant,
}

impl FixedRateTicker {
    /// First tick fires at `start`. `period` must be non-zero.
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next_tick: start,
        }
    }

    pub fn next_tick(&self) -> Instant {
        self.next_tick
    }

    /// Moves past the tick that just fired. Returns how many ticks were
    /// skipped because `now` is already beyond them.
    pub fn advance(&mut self, now: Instant) -> u32 {
        self.next_tick += self.period;
        let mut skipped = 0;
        while self.next_tick <= now {
            self.next_tick += self.period;
            skipped += 1;
        }
        skipped
    }
}

/// Runs `job` on every tick until `running` turns false.
///
/// The stop flag is checked between ticks, never during a run.
pub fn run_fixed_rate(period: Duration, running: &AtomicBool, mut job: impl FnMut()) -> u64 {
    let mut ticker = FixedRateTicker::new(period, Instant::now());
    let mut runs = 0;

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        let deadline = ticker.next_tick();
        if now < deadline {
            thread::sleep((deadline - now).min(STOP_POLL_INTERVAL));
            continue;
        }

        job();
        runs += 1;

        let skipped = ticker.advance(Instant::now());
        if skipped > 0 {
            log::warn!("event=report_tick module=cli status=skipped missed_ticks={skipped}");
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::{run_fixed_rate, FixedRateTicker};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};

    #[test]
    fn advance_moves_one_period_when_on_time() {
        let start = Instant::now();
        let period = Duration::from_secs(60);
        let mut ticker = FixedRateTicker::new(period, start);

        let skipped = ticker.advance(start + Duration::from_secs(1));
        assert_eq!(skipped, 0);
        assert_eq!(ticker.next_tick(), start + period);
    }

    #[test]
    fn advance_skips_ticks_missed_by_a_long_run() {
        let start = Instant::now();
        let period = Duration::from_secs(10);
        let mut ticker = FixedRateTicker::new(period, start);

        let skipped = ticker.advance(start + Duration::from_secs(35));
        assert_eq!(skipped, 3);
        assert_eq!(ticker.next_tick(), start + Duration::from_secs(40));
    }

    #[test]
    fn loop_stops_when_flag_clears() {
        let running = AtomicBool::new(true);
        let mut calls = 0;

        let runs = run_fixed_rate(Duration::from_millis(1), &running, || {
            calls += 1;
            if calls == 3 {
                running.store(false, Ordering::SeqCst);
            }
        });

        assert_eq!(runs, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn cleared_flag_never_runs_the_job() {
        let running = AtomicBool::new(false);
        let runs = run_fixed_rate(Duration::from_millis(1), &running, || {
            panic!("job must not run");
        });
        assert_eq!(runs, 0);
    }
}
