//! CLI command handling module
//!
//! Subcommand handlers, logging setup and report rendering used by the
//! binary.

mod commands;
mod logging;
mod output;
mod version;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
pub use output::{OutputFormat, render_markdown, render_report, render_text};
pub use version::display_version;
