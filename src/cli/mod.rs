//! Command-line interface

pub mod commands;

pub use commands::{
    cmd_convert, cmd_generate, cmd_reward_share_key, cmd_serve, cmd_validate, load_settings,
    CliResult, SettingsOverrides,
};
