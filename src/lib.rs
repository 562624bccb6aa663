pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod process;
