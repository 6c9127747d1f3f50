mod log_config;

pub use log_config::*;
