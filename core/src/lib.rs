//! Root of the `autotheme-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the tracing stack or the CLI.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod clock;
pub mod config;
pub mod daylight;
pub mod error;
pub mod host;
pub mod scheduler;

pub use clock::Clock;
pub use clock::SystemClock;
pub use daylight::DayWindow;
pub use daylight::Theme;
pub use error::AutoThemeErr;
pub use error::Result;
pub use host::TerminalHost;
pub use scheduler::CycleReport;
pub use scheduler::RunningScheduler;
pub use scheduler::ThemeScheduler;
