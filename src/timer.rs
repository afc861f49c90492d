use std::time::{Duration, Instant};

/// The delay and sound timers. Both count down toward zero, one step per `tick`, and only
/// move up when an instruction (or the host) sets them
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// Decrement each running timer by at most `step`, stopping at zero
    pub fn tick(&mut self, step: u8) {
        self.delay -= self.delay.min(step);
        self.sound -= self.sound.min(step);
    }

    pub fn is_sound_active(&self) -> bool {
        self.sound > 0
    }
}

/// Converts wall clock time into whole timer ticks. The host asks it after every cycle how
/// many ticks came due; leftover time carries over to the next call so no ticks are lost
#[derive(Debug, Clone, Copy)]
pub struct TimerClock {
    interval: Duration,
    last_tick: Instant,
}

impl TimerClock {
    pub fn new(interval: Duration) -> Self {
        TimerClock {
            interval,
            last_tick: Instant::now(),
        }
    }

    /// Return how many intervals have elapsed since the last tick we accounted for
    pub fn elapsed_ticks(&mut self) -> u32 {
        self.elapsed_ticks_at(Instant::now())
    }

    fn elapsed_ticks_at(&mut self, now: Instant) -> u32 {
        if self.interval == Duration::from_secs(0) {
            return 0;
        }

        let mut ticks = 0;
        while now.duration_since(self.last_tick) >= self.interval {
            self.last_tick += self.interval;
            ticks += 1;
        }
        ticks
    }

    /// Start counting from now, forgetting any partial interval
    pub fn restart(&mut self) {
        self.last_tick = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_clamps_at_zero() {
        let mut timers = Timers { delay: 61, sound: 59 };

        timers.tick(60);
        assert_eq!(timers, Timers { delay: 1, sound: 0 });

        timers.tick(60);
        assert_eq!(timers, Timers { delay: 0, sound: 0 });

        timers.tick(60);
        assert_eq!(timers, Timers { delay: 0, sound: 0 });
    }

    #[test]
    fn tick_by_one() {
        let mut timers = Timers { delay: 2, sound: 4 };
        timers.tick(1);
        assert_eq!(timers, Timers { delay: 1, sound: 3 });
        assert!(timers.is_sound_active());
    }

    #[test]
    fn clock_counts_whole_intervals() {
        let mut clock = TimerClock::new(Duration::from_millis(10));
        let start = clock.last_tick;

        assert_eq!(clock.elapsed_ticks_at(start + Duration::from_millis(5)), 0);
        assert_eq!(clock.elapsed_ticks_at(start + Duration::from_millis(25)), 2);
        // the 5ms remainder from above is not lost
        assert_eq!(clock.elapsed_ticks_at(start + Duration::from_millis(30)), 1);
    }

    #[test]
    fn zero_interval_never_ticks() {
        let mut clock = TimerClock::new(Duration::from_millis(0));
        assert_eq!(clock.elapsed_ticks(), 0);
    }
}
