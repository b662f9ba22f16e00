mod eliona_asset_sink;

pub use eliona_asset_sink::*;
