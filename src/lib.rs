//! dsrun library exports.
//!
//! The binary is a thin CLI over [`commands::dispatch`]; the modules are
//! public so integration tests can drive individual phases with stub tools.

pub mod apt;
pub mod builder;
pub mod commands;
pub mod common;
pub mod config;
pub mod environment;
pub mod error;
pub mod identity;
pub mod logging;
pub mod privilege;
pub mod process;
pub mod qa;
pub mod repo;
pub mod timing;

#[cfg(test)]
mod testing;

pub use error::Error;
