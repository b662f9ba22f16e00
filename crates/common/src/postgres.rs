mod asset_mapping_repository;
mod client;
mod config;
mod migrations;
mod tenant_config_repository;

pub use asset_mapping_repository::*;
pub use client::*;
pub use config::*;
pub use migrations::*;
pub use tenant_config_repository::*;
