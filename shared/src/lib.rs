//! Hooktap Shared Library
//!
//! Service configuration, webhook wire types, and the pre-send decision
//! logic shared by the server and the launcher.

pub mod config;
pub mod decision;
pub mod error;
pub mod protocol;
pub mod validator;

pub use error::{Error, Result};
