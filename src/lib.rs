//! `hdms_desk` - Helpdesk moderator dashboard library
//!
//! This crate provides the `hdms` CLI on top of `hdms-core`.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Layered YAML configuration
//! - [`fetch`] - Ticket sources (HTTP feed, snapshot file, fallback)
//! - [`guard`] - Async inactivity guard task
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - tracing subscriber setup

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod fetch;
pub mod format;
pub mod guard;
pub mod logging;

pub use cli::run;
