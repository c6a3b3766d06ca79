//! Command-line front end: argument parsing, the interactive prompt and
//! terminal rendering.

mod args;
mod commands;
mod render;
mod repl;

pub use args::Cli;
pub use commands::execute;
