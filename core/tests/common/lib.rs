#![allow(clippy::expect_used, clippy::unwrap_used)]

//! In-memory stand-ins for the terminal host and the wall clock.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use autotheme_core::AutoThemeErr;
use autotheme_core::Clock;
use autotheme_core::Result;
use autotheme_core::TerminalHost;
use autotheme_core::host::AppHandle;
use autotheme_core::host::ColorPreset;
use autotheme_core::host::PresetColor;
use autotheme_core::host::Profile;
use autotheme_core::host::SessionId;
use autotheme_core::host::SessionSnapshot;
use autotheme_core::host::TabSnapshot;
use autotheme_core::host::WindowSnapshot;

/// Clock whose hour is set by the test.
#[derive(Debug)]
pub struct ManualClock {
    hour: AtomicU32,
}

impl ManualClock {
    pub fn at_hour(hour: u32) -> Self {
        Self {
            hour: AtomicU32::new(hour),
        }
    }

    pub fn set_hour(&self, hour: u32) {
        self.hour.store(hour, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn local_hour(&self) -> u32 {
        self.hour.load(Ordering::SeqCst)
    }
}

/// Every call the scheduler made against a [`FakeHost`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    GetApp,
    ListColorPresets,
    GetColorPreset(String),
    ListWindows,
    GetProfile(SessionId),
    SetColorPreset { session: SessionId, preset: String },
}

pub fn preset(name: &str) -> ColorPreset {
    let (red, green, blue) = if name.contains("Light") {
        (0.98, 0.95, 0.78)
    } else {
        (0.16, 0.16, 0.16)
    };
    ColorPreset {
        name: name.to_string(),
        colors: vec![PresetColor {
            key: "Background Color".to_string(),
            red,
            green,
            blue,
            alpha: 1.0,
            color_space: Default::default(),
        }],
    }
}

/// Builds `windows` x `tabs` x `sessions` with ids like `w0t1s2`.
pub fn grid(windows: usize, tabs: usize, sessions: usize) -> Vec<WindowSnapshot> {
    (0..windows)
        .map(|w| WindowSnapshot {
            id: format!("w{w}"),
            tabs: (0..tabs)
                .map(|t| TabSnapshot {
                    id: format!("w{w}t{t}"),
                    sessions: (0..sessions)
                        .map(|s| SessionSnapshot {
                            id: SessionId::new(format!("w{w}t{t}s{s}")),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Scripted host with a fixed preset catalog and a mutable window tree.
pub struct FakeHost {
    app: Option<AppHandle>,
    presets: Vec<ColorPreset>,
    windows: Mutex<Vec<WindowSnapshot>>,
    stale: Mutex<HashSet<SessionId>>,
    hung_up: AtomicBool,
    hang_up_after_applies: Mutex<Option<usize>>,
    calls: Mutex<Vec<HostCall>>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    /// Application present, both Gruvbox presets known, no windows.
    pub fn new() -> Self {
        Self {
            app: Some(AppHandle {
                id: "app-1".to_string(),
            }),
            presets: vec![preset("GruvboxLight"), preset("GruvboxDark")],
            windows: Mutex::new(Vec::new()),
            stale: Mutex::new(HashSet::new()),
            hung_up: AtomicBool::new(false),
            hang_up_after_applies: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn without_app(mut self) -> Self {
        self.app = None;
        self
    }

    pub fn with_presets(mut self, names: &[&str]) -> Self {
        self.presets = names.iter().map(|name| preset(name)).collect();
        self
    }

    pub fn with_windows(self, windows: Vec<WindowSnapshot>) -> Self {
        self.set_windows(windows);
        self
    }

    pub fn set_windows(&self, windows: Vec<WindowSnapshot>) {
        *self.windows.lock().unwrap() = windows;
    }

    /// Subsequent profile lookups for `session` fail as if it were closed.
    pub fn close_session(&self, session: &str) {
        self.stale.lock().unwrap().insert(SessionId::new(session));
    }

    /// Every later call fails with `Disconnected`.
    pub fn hang_up(&self) {
        self.hung_up.store(true, Ordering::SeqCst);
    }

    /// Hang up right after the `count`-th successful `set_color_preset`.
    pub fn hang_up_after_applies(&self, count: usize) {
        *self.hang_up_after_applies.lock().unwrap() = Some(count);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    /// Preset names passed to `set_color_preset`, in call order.
    pub fn applied_presets(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                HostCall::SetColorPreset { preset, .. } => Some(preset.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.hung_up.load(Ordering::SeqCst) {
            return Err(AutoThemeErr::Disconnected);
        }
        Ok(())
    }
}

#[async_trait]
impl TerminalHost for FakeHost {
    async fn get_app(&self) -> Result<Option<AppHandle>> {
        self.record(HostCall::GetApp)?;
        Ok(self.app.clone())
    }

    async fn list_color_presets(&self) -> Result<Vec<String>> {
        self.record(HostCall::ListColorPresets)?;
        Ok(self.presets.iter().map(|p| p.name.clone()).collect())
    }

    async fn get_color_preset(&self, name: &str) -> Result<ColorPreset> {
        self.record(HostCall::GetColorPreset(name.to_string()))?;
        self.presets
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| AutoThemeErr::UnknownPreset(name.to_string()))
    }

    async fn list_windows(&self, _app: &AppHandle) -> Result<Vec<WindowSnapshot>> {
        self.record(HostCall::ListWindows)?;
        Ok(self.windows.lock().unwrap().clone())
    }

    async fn get_profile(&self, session: &SessionId) -> Result<Profile> {
        self.record(HostCall::GetProfile(session.clone()))?;
        if self.stale.lock().unwrap().contains(session) {
            return Err(AutoThemeErr::StaleSession(session.clone()));
        }
        Ok(Profile {
            session_id: session.clone(),
            guid: format!("profile-{session}"),
            name: "Default".to_string(),
        })
    }

    async fn set_color_preset(&self, profile: &Profile, preset: &ColorPreset) -> Result<()> {
        self.record(HostCall::SetColorPreset {
            session: profile.session_id.clone(),
            preset: preset.name.clone(),
        })?;
        let limit = *self.hang_up_after_applies.lock().unwrap();
        if limit.is_some_and(|limit| self.applied_presets().len() >= limit) {
            self.hang_up();
        }
        Ok(())
    }
}
