pub mod config;
pub mod deposits;
pub mod repl;

mod render;
