use crate::domain::{as_percent, days_since, hours_since, is_active};
use chrono::{DateTime, Utc};
use common::domain::{
    ContainerInputPayload, ContainerStatusPayload, DeviceDiagnostics, DeviceInfoPayload,
    DeviceSpec, DeviceStatus, StationInputPayload,
};
use tracing::warn;

pub fn device_info_payload(spec: &DeviceSpec) -> DeviceInfoPayload {
    DeviceInfoPayload {
        registration_date: spec.generic.registration_date.clone(),
        volume: spec.effective_volume(),
    }
}

pub fn station_input_payload(
    status: &DeviceStatus,
    now: DateTime<Utc>,
    inactivity_threshold_secs: i64,
) -> StationInputPayload {
    let values = &status.device_type_specific;
    let last_contact = hours_since(&status.generic.last_contact, now);

    StationInputPayload {
        battery_level: as_percent(values.average_battery_level),
        last_contact,
        total_openings: values.total_inputs_count,
        volume_percent: as_percent(values.average_filling_level),
        active: is_active(last_contact, inactivity_threshold_secs),
    }
}

pub fn container_input_payload(
    status: &DeviceStatus,
    diagnostics: &DeviceDiagnostics,
    now: DateTime<Utc>,
    inactivity_threshold_secs: i64,
) -> ContainerInputPayload {
    let values = &status.device_type_specific;
    let last_contact = hours_since(&status.generic.last_contact, now);
    let fill_level = status.fill_level().unwrap_or_else(|| {
        warn!(device_id = %status.device_id, "status without filling level, reporting 0");
        0.0
    });

    ContainerInputPayload {
        battery_level: as_percent(values.battery_level),
        openings: values.last_empty_count,
        last_contact,
        alarm: values.bin_alarm,
        total_openings: values.inputs_count,
        volume_percent: as_percent(fill_level),
        next_service_days: days_since(
            &diagnostics.device_type_specific.expected_next_service,
            now,
        ),
        last_service_days: days_since(&diagnostics.generic.last_service, now),
        active: is_active(last_contact, inactivity_threshold_secs),
    }
}

pub fn container_status_payload(diagnostics: &DeviceDiagnostics) -> ContainerStatusPayload {
    ContainerStatusPayload {
        expected_percent: as_percent(diagnostics.device_type_specific.expected_filling_level),
    }
}
