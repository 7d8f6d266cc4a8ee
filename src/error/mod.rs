//! Error taxonomy shared by every router module.

mod types;

pub use types::{Result, RouterError};
