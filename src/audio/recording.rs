//! Recording clock
//!
//! A voice sample is capped at a fixed number of seconds. The view ticks the
//! clock once per second; the tick that reaches the ceiling tells the caller
//! to stop.

/// Outcome of one clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running,
    /// Ceiling reached; the recording must stop now
    LimitReached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingClock {
    elapsed: u32,
    max: u32,
}

impl RecordingClock {
    pub fn new(max_seconds: u32) -> Self {
        Self {
            elapsed: 0,
            max: max_seconds,
        }
    }

    pub fn tick(&mut self) -> Tick {
        if self.elapsed < self.max {
            self.elapsed += 1;
        }
        if self.elapsed >= self.max {
            Tick::LimitReached
        } else {
            Tick::Running
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// e.g. `0:07 / 1:00`
    pub fn label(&self) -> String {
        format!("{} / {}", format_clock(self.elapsed), format_clock(self.max))
    }
}

/// Seconds as `m:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(7), "0:07");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(125), "2:05");
    }

    #[test]
    fn test_limit_reached_on_sixtieth_tick() {
        let mut clock = RecordingClock::new(60);
        for _ in 0..59 {
            assert_eq!(clock.tick(), Tick::Running);
        }
        assert_eq!(clock.tick(), Tick::LimitReached);
        assert_eq!(clock.label(), "1:00 / 1:00");

        // Never counts past the ceiling
        assert_eq!(clock.tick(), Tick::LimitReached);
        assert_eq!(clock.elapsed(), 60);
    }

    #[test]
    fn test_reset() {
        let mut clock = RecordingClock::new(60);
        clock.tick();
        clock.tick();
        assert_eq!(clock.label(), "0:02 / 1:00");
        clock.reset();
        assert_eq!(clock.elapsed(), 0);
    }
}
