use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use autotheme_core::AutoThemeErr;
use autotheme_core::Result;
use autotheme_core::TerminalHost;
use autotheme_core::host::AppHandle;
use autotheme_core::host::ColorPreset;
use autotheme_core::host::Profile;
use autotheme_core::host::SessionId;
use autotheme_core::host::WindowSnapshot;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::protocol::GET_APP_METHOD;
use crate::protocol::GET_COLOR_PRESET_METHOD;
use crate::protocol::GET_PROFILE_METHOD;
use crate::protocol::GetAppResult;
use crate::protocol::GetColorPresetParams;
use crate::protocol::GetProfileParams;
use crate::protocol::JSONRPC_VERSION;
use crate::protocol::JsonRpcMessage;
use crate::protocol::JsonRpcRequest;
use crate::protocol::LIST_COLOR_PRESETS_METHOD;
use crate::protocol::LIST_WINDOWS_METHOD;
use crate::protocol::ListColorPresetsResult;
use crate::protocol::ListWindowsParams;
use crate::protocol::ListWindowsResult;
use crate::protocol::SET_COLOR_PRESET_METHOD;
use crate::protocol::STALE_SESSION_ERROR_CODE;
use crate::protocol::SetColorPresetParams;
use crate::protocol::UNKNOWN_PRESET_ERROR_CODE;

type BoxedReader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

struct Transport {
    reader: BoxedReader,
    writer: BoxedWriter,
}

/// Client for the host bridge. Requests are serialized: each call writes one
/// line and waits for the matching response before the next call may start.
pub struct HostRpcClient {
    next_request_id: AtomicI64,
    transport: Mutex<Transport>,
}

impl HostRpcClient {
    /// Connect to the bridge listening at `socket_path`.
    #[cfg(unix)]
    pub async fn connect(socket_path: &Path) -> Result<Self> {
        let stream = tokio::net::UnixStream::connect(socket_path).await?;
        info!("connected to terminal host at {}", socket_path.display());
        Ok(Self::from_stream(stream))
    }

    #[cfg(not(unix))]
    pub async fn connect(socket_path: &Path) -> Result<Self> {
        Err(AutoThemeErr::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!(
                "unix domain sockets are not available on this platform: {}",
                socket_path.display()
            ),
        )))
    }

    /// Wrap an already-connected byte stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(read_half);
        Self {
            next_request_id: AtomicI64::new(0),
            transport: Mutex::new(Transport {
                reader: BufReader::new(reader),
                writer: Box::new(write_half),
            }),
        }
    }

    /// Send `method` and decode the `result` of the matching response.
    pub async fn request<P, R>(&self, method: &str, params: Option<P>) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.to_string(),
            params: params.map(serde_json::to_value).transpose()?,
        };
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        let mut transport = self.transport.lock().await;
        debug!("-> {method} (id {id})");
        transport
            .writer
            .write_all(line.as_bytes())
            .await
            .map_err(connection_error)?;
        transport.writer.flush().await.map_err(connection_error)?;

        let mut buf = String::new();
        loop {
            buf.clear();
            let n = transport
                .reader
                .read_line(&mut buf)
                .await
                .map_err(connection_error)?;
            if n == 0 {
                return Err(AutoThemeErr::Disconnected);
            }
            let text = buf.trim();
            if text.is_empty() {
                continue;
            }

            let message = match serde_json::from_str::<JsonRpcMessage>(text) {
                Ok(message) => message,
                Err(err) => {
                    warn!("skipping unreadable line from host while waiting for {id}: {err}");
                    continue;
                }
            };
            match message {
                JsonRpcMessage::Response {
                    id: response_id,
                    result,
                    ..
                } if response_id == id => {
                    debug!("<- {method} (id {id})");
                    return Ok(serde_json::from_value(result)?);
                }
                JsonRpcMessage::Error {
                    id: error_id,
                    error,
                    ..
                } if error_id.is_none() || error_id == Some(id) => {
                    debug!("<- {method} (id {id}) error {}", error.code);
                    return Err(AutoThemeErr::Host {
                        code: error.code,
                        message: error.message,
                    });
                }
                JsonRpcMessage::Notification { method, .. } => {
                    debug!("ignoring host notification {method}");
                }
                other => {
                    warn!("discarding response that does not match request {id}: {other:?}");
                }
            }
        }
    }
}

/// A peer that hung up shows up as EOF on read but usually as a broken pipe
/// or reset on write; all of them mean the bridge is gone.
fn connection_error(err: std::io::Error) -> AutoThemeErr {
    match err.kind() {
        ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::UnexpectedEof => AutoThemeErr::Disconnected,
        _ => AutoThemeErr::Io(err),
    }
}

#[async_trait]
impl TerminalHost for HostRpcClient {
    async fn get_app(&self) -> Result<Option<AppHandle>> {
        let result: GetAppResult = self.request(GET_APP_METHOD, None::<()>).await?;
        Ok(result.app)
    }

    async fn list_color_presets(&self) -> Result<Vec<String>> {
        let result: ListColorPresetsResult =
            self.request(LIST_COLOR_PRESETS_METHOD, None::<()>).await?;
        Ok(result.names)
    }

    async fn get_color_preset(&self, name: &str) -> Result<ColorPreset> {
        let params = GetColorPresetParams {
            name: name.to_string(),
        };
        match self.request(GET_COLOR_PRESET_METHOD, Some(params)).await {
            Err(AutoThemeErr::Host { code, .. }) if code == UNKNOWN_PRESET_ERROR_CODE => {
                Err(AutoThemeErr::UnknownPreset(name.to_string()))
            }
            other => other,
        }
    }

    async fn list_windows(&self, app: &AppHandle) -> Result<Vec<WindowSnapshot>> {
        let params = ListWindowsParams {
            app_id: app.id.clone(),
        };
        let result: ListWindowsResult = self.request(LIST_WINDOWS_METHOD, Some(params)).await?;
        Ok(result.windows)
    }

    async fn get_profile(&self, session: &SessionId) -> Result<Profile> {
        let params = GetProfileParams {
            session_id: session.clone(),
        };
        match self.request(GET_PROFILE_METHOD, Some(params)).await {
            Err(AutoThemeErr::Host { code, .. }) if code == STALE_SESSION_ERROR_CODE => {
                Err(AutoThemeErr::StaleSession(session.clone()))
            }
            other => other,
        }
    }

    async fn set_color_preset(&self, profile: &Profile, preset: &ColorPreset) -> Result<()> {
        let params = SetColorPresetParams {
            session_id: profile.session_id.clone(),
            guid: profile.guid.clone(),
            preset: preset.clone(),
        };
        match self
            .request::<_, serde_json::Value>(SET_COLOR_PRESET_METHOD, Some(params))
            .await
        {
            Ok(_) => Ok(()),
            Err(AutoThemeErr::Host { code, .. }) if code == STALE_SESSION_ERROR_CODE => {
                Err(AutoThemeErr::StaleSession(profile.session_id.clone()))
            }
            Err(err) => Err(err),
        }
    }
}
