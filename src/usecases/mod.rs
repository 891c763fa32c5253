//! Application use cases. Orchestrate domain logic via ports.

pub mod chat_service;
pub mod dashboard_service;

pub use chat_service::{ChatService, FALLBACK_REPLY};
pub use dashboard_service::DashboardService;
