//! Common types for the internship tracker tools

mod secret;
mod error;

pub use secret::Secret;
pub use error::{Error, Result};
