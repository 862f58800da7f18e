/*!
Status projection.

Maps decoded parameter values onto the flat snapshot published to the
home-automation bus. Field names are part of the bus contract.
*/

use crate::catalog::address;
use crate::error::Result;
use crate::value::ParameterValue;
use serde::{Deserialize, Serialize};

const ON: &str = "ON";
const OFF: &str = "OFF";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FanStatus {
    pub device_id: String,

    pub fan_running: String,
    pub mode24_hours: String,
    pub fan_speed: i32,

    pub mode_boost: String,
    pub mode_boost_seconds_remaining: i32,

    pub humidity: i32,
    pub temperature: i32,

    pub running_timer: String,
    pub running_humidity_sensor: String,
    pub running_temperature_sensor: String,
    pub running_external_switch: String,
    pub running_interval_mode: String,
    pub running_silent_mode: String,

    pub max_speed_setpoint: i32,
    pub silent_speed_setpoint: i32,
    pub firmware: String,
    pub unit_type: i32,
}

impl Default for FanStatus {
    fn default() -> Self {
        Self {
            device_id: String::new(),
            fan_running: OFF.to_string(),
            mode24_hours: OFF.to_string(),
            fan_speed: 0,
            mode_boost: OFF.to_string(),
            mode_boost_seconds_remaining: 0,
            humidity: 0,
            temperature: 0,
            running_timer: OFF.to_string(),
            running_humidity_sensor: OFF.to_string(),
            running_temperature_sensor: OFF.to_string(),
            running_external_switch: OFF.to_string(),
            running_interval_mode: OFF.to_string(),
            running_silent_mode: OFF.to_string(),
            max_speed_setpoint: 0,
            silent_speed_setpoint: 0,
            firmware: String::new(),
            unit_type: 0,
        }
    }
}

impl FanStatus {
    /// Build a snapshot; addresses missing from `parameters` keep their defaults
    pub fn from_parameters(parameters: &[ParameterValue]) -> Self {
        let find = |addr: u8| parameters.iter().find(|p| p.address == addr);
        let int = |addr: u8| find(addr).map_or(0, ParameterValue::as_int);
        let on_off = |addr: u8| {
            let state = if find(addr).is_some_and(ParameterValue::as_bool) {
                ON
            } else {
                OFF
            };
            state.to_string()
        };

        Self {
            device_id: find(address::DEVICE_ID)
                .map(ParameterValue::as_text)
                .unwrap_or_default(),
            fan_running: on_off(address::FAN_ON),
            mode24_hours: on_off(address::MODE_24_HOURS),
            fan_speed: int(address::FAN_SPEED),
            mode_boost: on_off(address::BOOST_MODE),
            mode_boost_seconds_remaining: int(address::BOOST_COUNTDOWN),
            humidity: int(address::HUMIDITY),
            temperature: int(address::TEMPERATURE),
            running_timer: on_off(address::RUNNING_TIMER),
            running_humidity_sensor: on_off(address::RUNNING_HUMIDITY_SENSOR),
            running_temperature_sensor: on_off(address::RUNNING_TEMPERATURE_SENSOR),
            running_external_switch: on_off(address::RUNNING_EXTERNAL_SWITCH),
            running_interval_mode: on_off(address::RUNNING_INTERVAL_MODE),
            running_silent_mode: on_off(address::RUNNING_SILENT_MODE),
            max_speed_setpoint: int(address::MAX_SPEED_SETPOINT),
            silent_speed_setpoint: int(address::SILENT_SPEED_SETPOINT),
            firmware: find(address::FIRMWARE)
                .map(format_firmware)
                .unwrap_or_default(),
            unit_type: int(address::UNIT_TYPE),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Firmware parameter: major, minor, day, month, then a little-endian year
fn format_firmware(value: &ParameterValue) -> String {
    match value.raw.as_slice() {
        [major, minor, day, month, year_lo, year_hi, ..] => format!(
            "{}.{} ({:02}.{:02}.{})",
            major,
            minor,
            day,
            month,
            u16::from_le_bytes([*year_lo, *year_hi])
        ),
        [major, minor, ..] => format!("{}.{}", major, minor),
        _ => String::new(),
    }
}
