pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::CheckError;
pub use service::{CheckReport, CheckRequest, CheckService, SheetInput};
