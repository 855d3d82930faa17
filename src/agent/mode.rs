use std::time::Duration;

use strum_macros::AsRefStr;

use crate::map::point::Point;

/// What a ghost is currently trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
pub enum Mode {
    /// Heading for its home corner.
    Scatter,
    /// Heading for its strategy's target.
    Chase,
    /// Wandering at random and vulnerable.
    Frighten,
    /// Caught; returning to the chamber.
    Dying,
    /// Back in the chamber, waiting to revive.
    Dead,
}

impl Mode {
    /// Whether touching the player costs the player a life.
    pub fn is_hostile(self) -> bool {
        matches!(self, Mode::Scatter | Mode::Chase)
    }
}

/// Whether an agent is between cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    #[default]
    Idle,
    Animating {
        from: Point,
        to: Point,
        started_at: Duration,
    },
}

impl Motion {
    /// The time this motion completes, if it is animating.
    pub fn arrival(self, step: Duration) -> Option<Duration> {
        match self {
            Motion::Idle => None,
            Motion::Animating { started_at, .. } => Some(started_at + step),
        }
    }

    /// Fraction of the current step covered at `now`, in `[0, 1]`.
    pub fn progress(self, now: Duration, step: Duration) -> f32 {
        match self {
            Motion::Idle => 0.0,
            Motion::Animating { started_at, .. } => {
                if step.is_zero() {
                    return 1.0;
                }
                (now.saturating_sub(started_at).as_secs_f32() / step.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }

    pub fn shifted(self, by: Duration) -> Motion {
        match self {
            Motion::Idle => Motion::Idle,
            Motion::Animating { from, to, started_at } => Motion::Animating {
                from,
                to,
                started_at: started_at + by,
            },
        }
    }
}

/// Mode and motion together. The two vary independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentState {
    pub mode: Mode,
    pub motion: Motion,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            mode: Mode::Scatter,
            motion: Motion::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamps() {
        let motion = Motion::Animating {
            from: Point::new(1, 1),
            to: Point::new(1, 2),
            started_at: Duration::from_millis(100),
        };
        let step = Duration::from_millis(200);
        assert_eq!(motion.progress(Duration::from_millis(50), step), 0.0);
        assert_eq!(motion.progress(Duration::from_millis(200), step), 0.5);
        assert_eq!(motion.progress(Duration::from_secs(5), step), 1.0);
        assert_eq!(motion.arrival(step), Some(Duration::from_millis(300)));
    }

    #[test]
    fn test_hostile_modes() {
        assert!(Mode::Chase.is_hostile());
        assert!(!Mode::Frighten.is_hostile());
        assert!(!Mode::Dead.is_hostile());
    }
}
