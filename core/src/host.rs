//! Narrow view of the terminal application's scripting interface.
//!
//! Everything behind [`TerminalHost`] is owned by the host application. The
//! scheduler only holds the snapshots returned here for the duration of a
//! single cycle and re-reads them on the next one.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Root handle of the running terminal application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppHandle {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub id: String,
    #[serde(default)]
    pub tabs: Vec<TabSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub id: String,
    #[serde(default)]
    pub sessions: Vec<SessionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
}

impl WindowSnapshot {
    pub fn sessions(&self) -> impl Iterator<Item = &SessionId> {
        self.tabs
            .iter()
            .flat_map(|tab| tab.sessions.iter().map(|session| &session.id))
    }
}

/// Every session in `windows`, outer to inner: windows, then tabs, then
/// sessions.
pub fn sessions_in(windows: &[WindowSnapshot]) -> impl Iterator<Item = &SessionId> {
    windows.iter().flat_map(WindowSnapshot::sessions)
}

/// Per-session configuration that owns the applied colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub session_id: SessionId,
    pub guid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    #[serde(rename = "sRGB")]
    Srgb,
    Calibrated,
}

/// A single named color inside a preset, components in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetColor {
    pub key: String,
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    #[serde(default = "opaque")]
    pub alpha: f64,
    #[serde(default)]
    pub color_space: ColorSpace,
}

fn opaque() -> f64 {
    1.0
}

/// Named, read-only bundle of colors known to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPreset {
    pub name: String,
    #[serde(default)]
    pub colors: Vec<PresetColor>,
}

#[async_trait]
pub trait TerminalHost: Send + Sync {
    /// `None` when the host has no application object to hand out.
    async fn get_app(&self) -> Result<Option<AppHandle>>;

    async fn list_color_presets(&self) -> Result<Vec<String>>;

    /// Fails with [`crate::AutoThemeErr::UnknownPreset`] for names not in the
    /// catalog.
    async fn get_color_preset(&self, name: &str) -> Result<ColorPreset>;

    async fn list_windows(&self, app: &AppHandle) -> Result<Vec<WindowSnapshot>>;

    /// Fails with [`crate::AutoThemeErr::StaleSession`] once the session has
    /// been closed.
    async fn get_profile(&self, session: &SessionId) -> Result<Profile>;

    async fn set_color_preset(&self, profile: &Profile, preset: &ColorPreset) -> Result<()>;
}

#[async_trait]
impl<T: TerminalHost + ?Sized> TerminalHost for Arc<T> {
    async fn get_app(&self) -> Result<Option<AppHandle>> {
        (**self).get_app().await
    }

    async fn list_color_presets(&self) -> Result<Vec<String>> {
        (**self).list_color_presets().await
    }

    async fn get_color_preset(&self, name: &str) -> Result<ColorPreset> {
        (**self).get_color_preset(name).await
    }

    async fn list_windows(&self, app: &AppHandle) -> Result<Vec<WindowSnapshot>> {
        (**self).list_windows(app).await
    }

    async fn get_profile(&self, session: &SessionId) -> Result<Profile> {
        (**self).get_profile(session).await
    }

    async fn set_color_preset(&self, profile: &Profile, preset: &ColorPreset) -> Result<()> {
        (**self).set_color_preset(profile, preset).await
    }
}
