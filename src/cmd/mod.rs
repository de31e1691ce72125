pub mod cli;
pub mod render;
pub mod tui;

pub use cli::CliApp;
