//! Command implementations.

pub mod activity;
pub mod attention;
pub mod config;
pub mod dashboard;
pub mod gate;
pub mod session;
pub mod sla;
pub mod version;
pub mod workload;
