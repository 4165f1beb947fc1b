pub mod config;
pub mod error;
pub mod remote;
pub mod session;

// Re-export common error type
pub use error::{DocchatError, ErrorKind, Result};
