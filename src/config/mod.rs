//! Configuration management
//!
//! Handles the fixed database target and user settings.

pub mod connections;
pub mod settings;

pub use connections::{DatabaseTarget, SslMode};
pub use settings::{LogFormat, LoggingSettings, Settings, load_settings};
