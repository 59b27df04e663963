//! Tool configuration: pinned defaults, porosdjango.toml and name validation

pub mod defaults;
pub mod porosdjango_toml;
pub mod validation;

pub use porosdjango_toml::ToolConfig;
