pub mod config;
pub mod lookup;
pub mod telegram;

pub use config::{Config, ConfigError, SourceConfig, SourceKind};
