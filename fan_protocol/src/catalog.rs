/*!
Static parameter catalog.

The catalog is the closed vocabulary of the client: only the addresses listed
here are ever requested, and response entries for any other address are
dropped by the decoder.
*/

/// One known protocol address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDefinition {
    pub address: u8,
    pub label: &'static str,
    /// Integer value to display label, empty when the value is shown as-is
    pub mapping: &'static [(i32, &'static str)],
}

impl ParameterDefinition {
    pub const fn new(address: u8, label: &'static str) -> Self {
        Self {
            address,
            label,
            mapping: &[],
        }
    }

    pub const fn with_mapping(
        address: u8,
        label: &'static str,
        mapping: &'static [(i32, &'static str)],
    ) -> Self {
        Self {
            address,
            label,
            mapping,
        }
    }

    /// Look up the display label for an integer value
    pub fn map_value(&self, value: i32) -> Option<&'static str> {
        self.mapping
            .iter()
            .find(|(key, _)| *key == value)
            .map(|(_, label)| *label)
    }
}

/// Well-known parameter addresses
pub mod address {
    pub const FAN_ON: u8 = 0x01;
    pub const MODE_24_HOURS: u8 = 0x03;
    pub const FAN_SPEED: u8 = 0x04;
    pub const BOOST_MODE: u8 = 0x05;
    pub const BOOST_COUNTDOWN: u8 = 0x06;
    pub const RUNNING_TIMER: u8 = 0x07;
    pub const RUNNING_HUMIDITY_SENSOR: u8 = 0x08;
    pub const RUNNING_TEMPERATURE_SENSOR: u8 = 0x0A;
    pub const RUNNING_EXTERNAL_SWITCH: u8 = 0x0C;
    pub const RUNNING_INTERVAL_MODE: u8 = 0x0D;
    pub const RUNNING_SILENT_MODE: u8 = 0x0E;
    pub const MAX_SPEED_SETPOINT: u8 = 0x18;
    pub const SILENT_SPEED_SETPOINT: u8 = 0x1A;
    pub const HUMIDITY: u8 = 0x2E;
    pub const TEMPERATURE: u8 = 0x31;
    pub const DEVICE_ID: u8 = 0x7C;
    pub const FIRMWARE: u8 = 0x86;
    pub const WIFI_MODE: u8 = 0x94;
    pub const WIFI_DHCP: u8 = 0x9B;
    pub const UNIT_TYPE: u8 = 0xB9;
}

const ON_OFF: &[(i32, &str)] = &[(0, "Off"), (1, "On")];

// Wi-Fi SSID (0x95), password (0x96) and encryption type (0x99) carry
// secrets and are never requested.
const STANDARD_PARAMETERS: &[ParameterDefinition] = &[
    ParameterDefinition::with_mapping(address::FAN_ON, "Fan On/Off", ON_OFF),
    ParameterDefinition::with_mapping(address::MODE_24_HOURS, "24 hours mode selection", ON_OFF),
    ParameterDefinition::new(address::FAN_SPEED, "Current fan speed (rpm)"),
    ParameterDefinition::with_mapping(address::BOOST_MODE, "BOOST mode On/Off", ON_OFF),
    ParameterDefinition::new(address::BOOST_COUNTDOWN, "Current BOOST timer countdown in seconds"),
    ParameterDefinition::new(address::RUNNING_TIMER, "Current status of the built-in timer"),
    ParameterDefinition::new(
        address::RUNNING_HUMIDITY_SENSOR,
        "Current status of fan operation by humidity sensor",
    ),
    ParameterDefinition::new(
        address::RUNNING_TEMPERATURE_SENSOR,
        "Current status of fan operation by temperature sensor",
    ),
    ParameterDefinition::new(
        address::RUNNING_EXTERNAL_SWITCH,
        "Current status of fan operation by signal from an external switch",
    ),
    ParameterDefinition::new(
        address::RUNNING_INTERVAL_MODE,
        "Current status of fan operation in interval ventilation mode",
    ),
    ParameterDefinition::new(
        address::RUNNING_SILENT_MODE,
        "Current status of fan operation in SILENT mode",
    ),
    ParameterDefinition::with_mapping(
        0x0F,
        "Permission of operation based on humidity sensor readings",
        ON_OFF,
    ),
    ParameterDefinition::new(0x11, "Param 17"),
    ParameterDefinition::new(0x13, "Param 19"),
    ParameterDefinition::new(0x14, "Param 20"),
    ParameterDefinition::new(0x16, "Param 22"),
    ParameterDefinition::new(0x17, "Param 23"),
    ParameterDefinition::new(address::MAX_SPEED_SETPOINT, "Max speed setpoint"),
    ParameterDefinition::new(address::SILENT_SPEED_SETPOINT, "Silent speed setpoint"),
    ParameterDefinition::new(0x1B, "Param 27"),
    ParameterDefinition::new(0x1D, "Param 29"),
    ParameterDefinition::new(0x1E, "Param 30"),
    ParameterDefinition::new(0x1F, "Param 31"),
    ParameterDefinition::new(0x20, "Param 32"),
    ParameterDefinition::new(0x21, "Param 33"),
    ParameterDefinition::new(0x23, "Param 35"),
    ParameterDefinition::new(0x24, "Param 36"),
    ParameterDefinition::new(address::HUMIDITY, "Humidity"),
    ParameterDefinition::new(address::TEMPERATURE, "Temperature"),
    ParameterDefinition::new(address::DEVICE_ID, "Device search on the local Ethernet network"),
    ParameterDefinition::new(address::FIRMWARE, "Controller base firmware version and date"),
    ParameterDefinition::with_mapping(
        address::WIFI_MODE,
        "Wi-Fi operation mode",
        &[(1, "Client"), (2, "Access point")],
    ),
    ParameterDefinition::new(0x9A, "Wi-Fi frequency channel"),
    ParameterDefinition::with_mapping(
        address::WIFI_DHCP,
        "Wi-Fi module DHCP",
        &[(0, "Static IP"), (1, "DHCP"), (2, "Invert")],
    ),
    ParameterDefinition::new(0x9C, "IP address assigned to Wi-Fi module"),
    ParameterDefinition::new(0x9D, "Wi-Fi module subnet mask"),
    ParameterDefinition::new(0x9E, "Wi-Fi module main gateway"),
    ParameterDefinition::new(0xA3, "Current Wi-Fi module IP address"),
    ParameterDefinition::new(address::UNIT_TYPE, "Unit type"),
];

static STANDARD: Catalog = Catalog::new(STANDARD_PARAMETERS);

/// Read-only table of known parameters
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    parameters: &'static [ParameterDefinition],
}

impl Catalog {
    /// Create a catalog over a static parameter list
    pub const fn new(parameters: &'static [ParameterDefinition]) -> Self {
        Self { parameters }
    }

    /// The process-wide catalog of parameters supported by the controller
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    pub fn lookup(&self, address: u8) -> Option<&'static ParameterDefinition> {
        self.parameters.iter().find(|p| p.address == address)
    }

    pub fn contains(&self, address: u8) -> bool {
        self.lookup(address).is_some()
    }

    /// Addresses in catalog order, as requested by a full status read
    pub fn addresses(&self) -> Vec<u8> {
        self.parameters.iter().map(|p| p.address).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ParameterDefinition> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}
