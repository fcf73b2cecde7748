//! Periodic day/night theme switching.
//!
//! [`ThemeScheduler::initialize`] performs the startup checks (application
//! present, both presets in the catalog) and hands back a
//! [`RunningScheduler`], which owns the polling loop. Each cycle re-reads the
//! clock, the preset and the window hierarchy from scratch.

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::config::ThemeSchedule;
use crate::daylight::Theme;
use crate::error::AutoThemeErr;
use crate::error::Result;
use crate::host::AppHandle;
use crate::host::ColorPreset;
use crate::host::SessionId;
use crate::host::TerminalHost;
use crate::host::sessions_in;

/// Fetch the session's current profile and overwrite its colors with
/// `preset`.
pub async fn apply_theme<H>(host: &H, session: &SessionId, preset: &ColorPreset) -> Result<()>
where
    H: TerminalHost + ?Sized,
{
    let profile = host.get_profile(session).await?;
    host.set_color_preset(&profile, preset).await
}

/// Outcome of a single polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub theme: Theme,
    pub preset: String,
    pub applied: usize,
    pub failed: Vec<SessionId>,
}

impl CycleReport {
    fn new(theme: Theme, preset: &str) -> Self {
        Self {
            theme,
            preset: preset.to_string(),
            applied: 0,
            failed: Vec::new(),
        }
    }
}

/// Scheduler that has not yet validated the host.
pub struct ThemeScheduler<H, C = SystemClock> {
    host: H,
    clock: C,
    schedule: ThemeSchedule,
}

impl<H: TerminalHost> ThemeScheduler<H, SystemClock> {
    pub fn with_system_clock(host: H, schedule: ThemeSchedule) -> Self {
        Self::new(host, SystemClock, schedule)
    }
}

impl<H: TerminalHost, C: Clock> ThemeScheduler<H, C> {
    pub fn new(host: H, clock: C, schedule: ThemeSchedule) -> Self {
        Self {
            host,
            clock,
            schedule,
        }
    }

    pub fn schedule(&self) -> &ThemeSchedule {
        &self.schedule
    }

    /// Acquire the application handle and verify that both configured presets
    /// exist. Nothing is applied when either check fails.
    pub async fn initialize(self) -> Result<RunningScheduler<H, C>> {
        info!("starting theme scheduler");

        let Some(app) = self.host.get_app().await? else {
            warn!("terminal application is unavailable");
            return Err(AutoThemeErr::AppUnavailable);
        };

        let available = self.host.list_color_presets().await?;
        let missing: Vec<String> = self
            .schedule
            .required_presets()
            .into_iter()
            .filter(|name| !available.iter().any(|known| known.as_str() == *name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            warn!("expected color presets not present: {available:?}");
            return Err(AutoThemeErr::MissingPresets { missing, available });
        }

        debug!("application {} ready, presets verified", app.id);
        Ok(RunningScheduler {
            host: self.host,
            clock: self.clock,
            schedule: self.schedule,
            app,
        })
    }
}

/// Scheduler in the polling state.
pub struct RunningScheduler<H, C = SystemClock> {
    host: H,
    clock: C,
    schedule: ThemeSchedule,
    app: AppHandle,
}

impl<H: TerminalHost, C: Clock> RunningScheduler<H, C> {
    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    pub fn current_theme(&self) -> Theme {
        self.schedule.window.current_theme(&self.clock)
    }

    /// Decide the theme, look the preset up again and apply it to every
    /// session currently open. A failure on one session is logged and does
    /// not stop the remaining ones, unless the host connection is gone.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let theme = self.current_theme();
        let preset_name = self.schedule.preset_for(theme);
        info!("will set {theme} time theme ({preset_name})");

        let preset = self.host.get_color_preset(preset_name).await?;
        let windows = self.host.list_windows(&self.app).await?;

        let mut report = CycleReport::new(theme, preset_name);
        for session in sessions_in(&windows) {
            match apply_theme(&self.host, session, &preset).await {
                Ok(()) => report.applied += 1,
                Err(err) if err.is_connection_lost() => return Err(err),
                Err(err) => {
                    warn!("failed to apply {preset_name} to session {session}: {err}");
                    report.failed.push(session.clone());
                }
            }
        }

        info!(
            "applied {preset_name} to {} session(s), {} failed",
            report.applied,
            report.failed.len()
        );
        Ok(report)
    }

    /// Poll until the host connection is lost. Other errors inside a cycle
    /// are logged and the loop moves on to the next sleep.
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.run_cycle().await {
                Ok(_) => {}
                Err(err) if err.is_connection_lost() => {
                    error!("lost connection to terminal host: {err}");
                    return Err(err);
                }
                Err(err) => warn!("theme cycle failed: {err}"),
            }
            tokio::time::sleep(self.schedule.poll_interval).await;
        }
    }
}
