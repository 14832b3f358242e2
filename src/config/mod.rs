/// Application settings loaded from config.toml
pub mod app;

/// Record store connection and table creation
pub mod database;

/// Seed fixtures used to populate an empty store
pub mod seed;

pub use app::{AppConfig, FacadeConfig, ServerConfig, TemplatesConfig, load_app_configuration};
pub use seed::SeedData;
