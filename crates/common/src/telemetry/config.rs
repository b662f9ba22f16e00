use opentelemetry_sdk::trace::TracerProvider as SdkTracerProvider;

/// Logging and trace export settings
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub otel_endpoint: String,
    pub otel_enabled: bool,
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "fds-connector".to_string(),
            otel_endpoint: "http://localhost:4317".to_string(),
            otel_enabled: false,
            log_level: "info".to_string(),
        }
    }
}

/// Held until shutdown so pending spans can be flushed
pub struct TelemetryProviders {
    pub tracer_provider: SdkTracerProvider,
}
