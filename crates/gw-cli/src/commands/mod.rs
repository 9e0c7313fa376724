//! CLI command implementations

mod assign;
mod config;
mod list;
mod show;
mod watch;

pub use assign::assign_command;
pub use config::{config_path, config_show, load_or_default};
pub use list::list_command;
pub use show::show_command;
pub use watch::watch_command;
