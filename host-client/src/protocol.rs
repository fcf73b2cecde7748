//! Wire types for the host bridge.

use autotheme_core::host::AppHandle;
use autotheme_core::host::ColorPreset;
use autotheme_core::host::SessionId;
use autotheme_core::host::WindowSnapshot;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const GET_APP_METHOD: &str = "app/get";
pub const LIST_WINDOWS_METHOD: &str = "app/windows";
pub const LIST_COLOR_PRESETS_METHOD: &str = "colorPresets/list";
pub const GET_COLOR_PRESET_METHOD: &str = "colorPresets/get";
pub const GET_PROFILE_METHOD: &str = "session/getProfile";
pub const SET_COLOR_PRESET_METHOD: &str = "profile/setColorPreset";

pub const UNKNOWN_PRESET_ERROR_CODE: i64 = -32001;
pub const STALE_SESSION_ERROR_CODE: i64 = -32002;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: i64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Anything the bridge may write on the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Error {
        jsonrpc: String,
        id: Option<i64>,
        error: JsonRpcErrorObject,
    },
    Response {
        jsonrpc: String,
        id: i64,
        result: Value,
    },
    Notification {
        jsonrpc: String,
        method: String,
        #[serde(default)]
        params: Option<Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetAppResult {
    pub app: Option<AppHandle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListColorPresetsResult {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetColorPresetParams {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWindowsParams {
    pub app_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListWindowsResult {
    pub windows: Vec<WindowSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProfileParams {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetColorPresetParams {
    pub session_id: SessionId,
    pub guid: String,
    pub preset: ColorPreset,
}
