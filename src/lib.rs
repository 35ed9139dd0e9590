//! DriveDesk: a tabbed desktop shell for a web document/storage service,
//! with a local download manager.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod engine;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
