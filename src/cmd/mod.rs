pub mod config;
pub mod prompt;
pub mod shell;
pub mod tickets;
