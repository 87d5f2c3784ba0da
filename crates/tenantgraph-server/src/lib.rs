pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::{AppConfig, LoggingConfig, ServerConfig, TenantsConfig};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{ServerBuilder, TenantgraphServer, build_app, load_fixtures};
