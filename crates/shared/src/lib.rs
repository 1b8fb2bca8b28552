pub mod config;
pub mod error;
pub mod format;
pub mod links;
pub mod models;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{TokenAccountView, TokenMetadata};
