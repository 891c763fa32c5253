//! Adapters: HTTP backend client, mock backend, terminal UI.

pub mod http;
pub mod mock;
pub mod ui;
