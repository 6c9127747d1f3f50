pub mod config;
pub mod configs;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry_center;
pub mod service;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
