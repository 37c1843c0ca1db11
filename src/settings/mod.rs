//! Settings module
//!
//! Configuration is read from a TOML file into a global [`Settings`]
//! snapshot. Every section and field has a default, so an empty file (or
//! none at all) yields a working configuration.

pub mod settings_struct;

pub use settings_struct::{
    init_settings, normalize_base_path, update_settings_from_content, ConverterSettings,
    DatabaseSettings, DefaultUserSettings, GithubSettings, LogSettings, ServerSettings, Settings,
};
