pub mod config;
pub mod error;
pub mod models;
pub mod predictor;
pub mod scrapers;
pub mod server;

pub use error::{Error, Result};
