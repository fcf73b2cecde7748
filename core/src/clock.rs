use std::sync::Arc;

use chrono::Local;
use chrono::Timelike;

/// Source of the local wall-clock hour.
pub trait Clock: Send + Sync {
    /// Hour of the day in local time, `0..=23`.
    fn local_hour(&self) -> u32;
}

/// Reads the system clock in the local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn local_hour(&self) -> u32 {
        (**self).local_hour()
    }
}
