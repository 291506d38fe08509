pub mod handlers;

pub use handlers::{check, export_csv, health_check, suggest_mapping};
