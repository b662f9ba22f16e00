use crate::domain::asset::{CONTAINER_ASSET_TYPE, STATION_ASSET_TYPE};
use crate::domain::telemetry::TelemetrySubtype;
use serde::Serialize;

const VENDOR: &str = "Hailo";
const DOCUMENTATION_URL: &str = "https://www.hailodigitalhub.de/";
const ICON: &str = "trash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub de: &'static str,
    pub en: &'static str,
}

/// One attribute an asset type declares for its telemetry payload keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTypeAttribute {
    /// Payload key the attribute is read from
    pub name: &'static str,
    pub attribute_type: &'static str,
    pub subtype: TelemetrySubtype,
    pub translation: Translation,
    pub unit: Option<&'static str>,
    pub precision: Option<i16>,
    /// Averaged over quarter hours, hours and days
    pub averaged: bool,
}

/// Asset type that has to exist downstream before assets of it are created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTypeDefinition {
    pub name: &'static str,
    pub vendor: &'static str,
    pub translation: Translation,
    pub documentation_url: &'static str,
    pub icon: &'static str,
    pub attributes: Vec<AssetTypeAttribute>,
}

fn attribute(
    name: &'static str,
    attribute_type: &'static str,
    subtype: TelemetrySubtype,
    de: &'static str,
    en: &'static str,
) -> AssetTypeAttribute {
    AssetTypeAttribute {
        name,
        attribute_type,
        subtype,
        translation: Translation { de, en },
        unit: None,
        precision: None,
        averaged: false,
    }
}

impl AssetTypeAttribute {
    fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    fn precision(mut self, precision: i16) -> Self {
        self.precision = Some(precision);
        self
    }

    fn averaged(mut self) -> Self {
        self.averaged = true;
        self
    }
}

/// The container type, covering the info, input and status payload keys
pub fn container_asset_type() -> AssetTypeDefinition {
    use TelemetrySubtype::{Info, Input, Status};

    AssetTypeDefinition {
        name: CONTAINER_ASSET_TYPE,
        vendor: VENDOR,
        translation: Translation {
            de: "FDS Web-API from Hailo",
            en: "Recycling station using FDS Web-API from Hailo",
        },
        documentation_url: DOCUMENTATION_URL,
        icon: ICON,
        attributes: vec![
            attribute(
                "openings",
                "device-status",
                Input,
                "Öffnungen seit Leerung",
                "Openings since emptying",
            )
            .precision(0)
            .averaged(),
            attribute("bat_level", "battery-voltage", Input, "Batteriestand", "Battery Level")
                .averaged(),
            attribute("volume", "device-info", Info, "Gesamtvolumen", "Total Volume").unit("l"),
            attribute("alarm", "device-status", Input, "Alarm", "Alarm"),
            attribute(
                "totalopenings",
                "device-status",
                Input,
                "Total Öffnungen",
                "Total Openings",
            )
            .averaged(),
            attribute("volumepercent", "level", Input, "Füllstand", "Fill Level")
                .unit("%")
                .averaged(),
            attribute(
                "exp_percent",
                "device-info",
                Status,
                "Erwarteter Füllstand Leerung",
                "Expected fill level emptying",
            )
            .unit("%"),
            attribute("reg_data", "device-info", Info, "Registrationsdatum", "Registration Date"),
            attribute("lastclean", "device-info", Input, "Letzte Leerung", "Last emptying")
                .unit("d")
                .precision(0),
            attribute("time", "device-info", Input, "Nächste Leerung", "Next emptying")
                .unit("d")
                .precision(0),
            attribute("last_contact", "device-info", Input, "Letzter Kontakt", "Last Contact")
                .unit("h")
                .precision(0),
            attribute("active", "device-status", Input, "Aktiv", "Active"),
        ],
    }
}

/// The station type, covering the aggregated payload keys
pub fn station_asset_type() -> AssetTypeDefinition {
    use TelemetrySubtype::{Info, Input};

    AssetTypeDefinition {
        name: STATION_ASSET_TYPE,
        vendor: VENDOR,
        translation: Translation {
            de: "Recycling Station über FDS Web-API from Hailo",
            en: "Recycling station using FDS Web-API from Hailo",
        },
        documentation_url: DOCUMENTATION_URL,
        icon: ICON,
        attributes: vec![
            attribute("reg_data", "device-info", Info, "Registrationsdatum", "Registration Date"),
            attribute(
                "bat_level",
                "battery-voltage",
                Input,
                "Durchschnittlicher Batteriestand",
                "Average Battery Level",
            )
            .unit("%")
            .averaged(),
            attribute("last_contact", "device-info", Input, "Letzter Kontakt", "Last Contact")
                .unit("h")
                .precision(0),
            attribute(
                "volume",
                "device-info",
                Info,
                "Kombiniertes Gesamtvolumen",
                "Total Combined Volume",
            )
            .unit("l"),
            attribute(
                "totalopenings",
                "device-status",
                Input,
                "Total Öffnungen kombiniert",
                "Total Combined Openings",
            )
            .averaged(),
            attribute(
                "volumepercent",
                "level",
                Input,
                "Durchschnittlicher Füllstand",
                "Average Fill Level",
            )
            .unit("%")
            .averaged(),
            attribute("active", "device-status", Input, "Aktiv", "Active"),
        ],
    }
}

/// Every asset type the connector creates assets of
pub fn fds_asset_types() -> Vec<AssetTypeDefinition> {
    vec![station_asset_type(), container_asset_type()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ContainerInputPayload, ContainerStatusPayload, DeviceInfoPayload, StationInputPayload,
    };
    use std::collections::BTreeSet;

    fn keys(payload: &impl Serialize) -> BTreeSet<String> {
        match serde_json::to_value(payload).unwrap() {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("payload is not an object: {}", other),
        }
    }

    fn declared(definition: &AssetTypeDefinition, subtype: TelemetrySubtype) -> BTreeSet<String> {
        definition
            .attributes
            .iter()
            .filter(|a| a.subtype == subtype)
            .map(|a| a.name.to_string())
            .collect()
    }

    fn info() -> DeviceInfoPayload {
        DeviceInfoPayload {
            registration_date: String::new(),
            volume: 0,
        }
    }

    #[test]
    fn test_container_type_declares_every_written_key() {
        let container = container_asset_type();
        let input = ContainerInputPayload {
            battery_level: 0,
            openings: 0,
            last_contact: 0.0,
            alarm: false,
            total_openings: 0,
            volume_percent: 0,
            next_service_days: 0.0,
            last_service_days: 0.0,
            active: false,
        };
        let status = ContainerStatusPayload {
            expected_percent: 0,
        };

        assert_eq!(container.name, CONTAINER_ASSET_TYPE);
        assert_eq!(declared(&container, TelemetrySubtype::Info), keys(&info()));
        assert_eq!(declared(&container, TelemetrySubtype::Input), keys(&input));
        assert_eq!(declared(&container, TelemetrySubtype::Status), keys(&status));
    }

    #[test]
    fn test_station_type_declares_every_written_key() {
        let station = station_asset_type();
        let input = StationInputPayload {
            battery_level: 0,
            last_contact: 0.0,
            total_openings: 0,
            volume_percent: 0,
            active: false,
        };

        assert_eq!(station.name, STATION_ASSET_TYPE);
        assert_eq!(declared(&station, TelemetrySubtype::Info), keys(&info()));
        assert_eq!(declared(&station, TelemetrySubtype::Input), keys(&input));
        assert!(declared(&station, TelemetrySubtype::Status).is_empty());
    }

    #[test]
    fn test_all_types_listed_once() {
        let names: Vec<_> = fds_asset_types().iter().map(|t| t.name).collect();
        assert_eq!(names, vec![STATION_ASSET_TYPE, CONTAINER_ASSET_TYPE]);
    }
}
