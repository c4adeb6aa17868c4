//! CLI argument parsing and command handling.

mod args;
mod clip;
mod validators;

pub use args::{Cli, Command, ConfigAction, SegmentArgs};
pub use clip::ClipArgs;
