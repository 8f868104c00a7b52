// Re-export main modules for use by the binary and integration tests
pub mod command;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod install;
pub mod io;
pub mod paths;
