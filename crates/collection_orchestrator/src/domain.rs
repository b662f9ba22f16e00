mod asset_type_registration;
mod bearer_token;
mod collection_cycle;
mod derived_fields;
mod hierarchy_mapper;
mod in_flight_store;
mod in_memory_token_store;
mod payloads;
mod scheduler;
mod scheduler_config;
mod token_cache;

pub use asset_type_registration::*;
pub use bearer_token::*;
pub use collection_cycle::*;
pub use derived_fields::*;
pub use hierarchy_mapper::*;
pub use in_flight_store::*;
pub use in_memory_token_store::*;
pub use payloads::*;
pub use scheduler::*;
pub use scheduler_config::*;
pub use token_cache::*;
