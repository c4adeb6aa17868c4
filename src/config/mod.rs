//! Configuration loading and management.

mod file;
mod paths;
pub mod resolve;
mod types;
mod validate;

pub use file::{load_config_file, load_default_config, save_config, save_default_config};
pub use paths::{config_dir, config_file_path};
pub use resolve::{ClipSettings, SegmentSettings, resolve_clip_settings, resolve_segment_settings};
pub use types::{ClipConfig, Config, OutputConfig, OutputFormat, SegmentConfig};
pub use validate::validate_config;
