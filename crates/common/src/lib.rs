pub mod domain;
pub mod http;
pub mod postgres;
pub mod telemetry;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockAssetMappingRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockAssetSink;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockDeviceDataSource;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockTenantConfigRepository;
