mod args;
mod commands;
mod context;
mod handlers;
mod output;
mod tui;

pub use args::{Cli, Commands, OutputFormat, ServiceCommand};
pub use commands::run;
