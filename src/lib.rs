pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod launch;
pub mod logging;
pub mod profile;
pub mod registry;
pub mod storage;

pub use error::{Error, Result};
