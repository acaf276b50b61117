//! Configuration management for specbars.
//!
//! Analysis constants, the capture device and the display width are read from
//! a TOML file in the user's config directory. A missing file means defaults.

pub mod file;

pub use file::{config_path, AnalysisConfig, AudioConfig, DisplayConfig, SpecbarsConfig};
