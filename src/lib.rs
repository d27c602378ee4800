pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod launcher;
pub mod observability;
pub mod profile;

pub use error::{Error, ErrorKind, Result};
