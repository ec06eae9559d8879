//! Node configuration

pub mod settings;

pub use settings::{Settings, SettingsError, DEFAULT_API_MAX_RESULTS, DEFAULT_API_PORT};
