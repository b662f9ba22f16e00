mod asset;
mod asset_type;
mod device;
mod result;
mod telemetry;
mod tenant_config;

pub use asset::*;
pub use asset_type::*;
pub use device::*;
pub use result::*;
pub use telemetry::*;
pub use tenant_config::*;
