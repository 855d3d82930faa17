//! The Scatter/Chase alternation of a level.

use std::time::Duration;

use crate::agent::mode::Mode;

/// Alternating Scatter and Chase periods, followed by Chase forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSchedule {
    entries: Vec<(Mode, Duration)>,
}

impl ModeSchedule {
    /// Scatter lasts `6 - i - (level - 1)` seconds and Chase `15 + 2i + (level - 1)` for
    /// alternation `i`, until a Scatter period would not be positive.
    pub fn for_level(level: u32) -> Self {
        let bias = i64::from(level.max(1) - 1);
        let mut entries = Vec::new();
        for i in 0i64.. {
            let scatter = 6 - i - bias;
            if scatter <= 0 {
                break;
            }
            let chase = 15 + 2 * i + bias;
            entries.push((Mode::Scatter, Duration::from_secs(scatter as u64)));
            entries.push((Mode::Chase, Duration::from_secs(chase as u64)));
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[(Mode, Duration)] {
        &self.entries
    }

    /// The mode of entry `index`; past the end this is Chase.
    pub fn mode_at(&self, index: usize) -> Mode {
        self.entries.get(index).map_or(Mode::Chase, |(mode, _)| *mode)
    }

    /// How long entry `index` lasts, or `None` for the final unbounded Chase.
    pub fn duration_at(&self, index: usize) -> Option<Duration> {
        self.entries.get(index).map(|(_, duration)| *duration)
    }
}

/// Position within a [`ModeSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleClock {
    pub index: usize,
    pub started_at: Duration,
}

impl ScheduleClock {
    pub fn starting_at(now: Duration) -> Self {
        Self { index: 0, started_at: now }
    }

    /// Moves through every period that has ended by `now`. Each transition lands
    /// on the exact end of the previous period, so no time is lost to tick size.
    ///
    /// Returns the number of transitions taken.
    pub fn advance(&mut self, schedule: &ModeSchedule, now: Duration) -> usize {
        let mut transitions = 0;
        while let Some(duration) = schedule.duration_at(self.index) {
            let ends_at = self.started_at + duration;
            if now < ends_at {
                break;
            }
            self.started_at = ends_at;
            self.index += 1;
            transitions += 1;
        }
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_sequence() {
        let secs: Vec<u64> = ModeSchedule::for_level(1)
            .entries()
            .iter()
            .map(|(_, d)| d.as_secs())
            .collect();
        assert_eq!(secs, vec![6, 15, 5, 17, 4, 19, 3, 21, 2, 23, 1, 25]);
    }

    #[test]
    fn test_high_level_is_chase_only() {
        let schedule = ModeSchedule::for_level(7);
        assert!(schedule.entries().is_empty());
        assert_eq!(schedule.mode_at(0), Mode::Chase);
        assert_eq!(schedule.duration_at(0), None);
    }

    #[test]
    fn test_clock_lands_on_exact_offsets() {
        let schedule = ModeSchedule::for_level(1);
        let mut clock = ScheduleClock::starting_at(Duration::ZERO);
        assert_eq!(clock.advance(&schedule, Duration::from_millis(5_999)), 0);
        assert_eq!(clock.advance(&schedule, Duration::from_millis(6_250)), 1);
        assert_eq!(clock.started_at, Duration::from_secs(6));
        assert_eq!(schedule.mode_at(clock.index), Mode::Chase);
        // A long stall crosses several periods at once: 6 + 15 + 5 = 26.
        assert_eq!(clock.advance(&schedule, Duration::from_secs(27)), 2);
        assert_eq!(clock.started_at, Duration::from_secs(26));
        assert_eq!(clock.index, 3);
        assert_eq!(schedule.mode_at(clock.index), Mode::Chase);
    }
}
