//! Wall-clock limits in the scheduler's `D-HH:MM:SS` notation.

use serde::{Deserialize, Serialize};

/// Formats a wall time as `D-HH:MM:SS`.
///
/// Days are unpadded. Hours, minutes and seconds are padded to two digits when
/// below ten and otherwise printed as-is, so `48` hours stays `48` and is not
/// folded into days.
pub fn to_duration(days: u32, hours: u32, minutes: u32, seconds: u32) -> String {
    format!("{days}-{hours:02}:{minutes:02}:{seconds:02}")
}

/// Requested wall time for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WallTime {
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
}

impl WallTime {
    pub const fn new(days: u32, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    /// Scheduler notation, see [`to_duration`].
    pub fn render(&self) -> String {
        to_duration(self.days, self.hours, self.minutes, self.seconds)
    }
}

impl Default for WallTime {
    fn default() -> Self {
        Self::new(0, 48, 0, 0)
    }
}
