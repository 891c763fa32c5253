//! HTTP adapter. One `ApiClient` implements all three outbound gateways;
//! errors are mapped into `DomainError` at this boundary.

mod analytics;
mod chat;
pub mod client;
mod data;
mod sse;

pub use client::ApiClient;
