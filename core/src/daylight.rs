//! Day/night decision for a given local hour.
//!
//! Both bounds are exclusive: with the default window of `8..18` the hours
//! 8 and 18 are night, so the light theme is active from 9:00 through 17:59.
//! Minutes and seconds are never consulted.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::clock::Clock;

pub const DEFAULT_DAY_START_HOUR: u32 = 8;
pub const DEFAULT_DAY_END_HOUR: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Day,
    Night,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Day => f.write_str("day"),
            Theme::Night => f.write_str("night"),
        }
    }
}

/// Hours strictly between `start` and `end` count as day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: u32,
    pub end: u32,
}

impl Default for DayWindow {
    fn default() -> Self {
        Self {
            start: DEFAULT_DAY_START_HOUR,
            end: DEFAULT_DAY_END_HOUR,
        }
    }
}

impl DayWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_day_time(&self, hour: u32) -> bool {
        hour > self.start && hour < self.end
    }

    pub fn theme_at(&self, hour: u32) -> Theme {
        if self.is_day_time(hour) {
            Theme::Day
        } else {
            Theme::Night
        }
    }

    /// Reads the clock once and classifies the current hour.
    pub fn current_theme(&self, clock: &dyn Clock) -> Theme {
        self.theme_at(clock.local_hour())
    }
}
