//! Command implementations

pub mod autoload;
pub mod cleanup;
pub mod config;
pub mod history;
pub mod init;
pub mod scan;
pub mod status;
pub mod variations;
