//! Infrastructure layer: product storage, the asynchronous update queue, config.

pub mod config;
pub mod jobs;
pub mod repository;

pub use config::Config;
