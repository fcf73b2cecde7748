//! JSON-RPC client for the terminal host bridge.
//!
//! The bridge runs inside the terminal application and listens on a Unix
//! domain socket. Messages are newline-delimited JSON-RPC 2.0 objects.

mod client;
pub mod protocol;

pub use client::HostRpcClient;
