//! apr-console: terminal client for the APR pharmaceutical quality
//! analytics backend. Hexagonal architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
