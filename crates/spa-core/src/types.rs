//! Protocol types and message definitions

use bytes::Bytes;
use serde::Serialize;
use std::fmt;

/// Three-byte big-endian message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MessageId(pub u32);

impl MessageId {
    // Controller -> client
    pub const STATUS: MessageId = MessageId(0xFFAF13);
    pub const CONFIG_RESPONSE: MessageId = MessageId(0x0ABF94);
    pub const FILTER_CONFIG: MessageId = MessageId(0x0ABF23);
    pub const VERSION_INFO: MessageId = MessageId(0x0ABF24);
    pub const CONTROL_CONFIG_2: MessageId = MessageId(0x0ABF2E);
    pub const SET_TEMP_RANGE: MessageId = MessageId(0xFFAF26);

    // Client -> controller
    pub const CONFIG_REQUEST: MessageId = MessageId(0x0ABF04);
    /// Shared by the filter-config, version-info and control-config-2
    /// requests; the first payload bytes select which one is meant.
    pub const SETTINGS_REQUEST: MessageId = MessageId(0x0ABF22);
    pub const TOGGLE_ITEM: MessageId = MessageId(0x0ABF11);
    pub const SET_TEMP: MessageId = MessageId(0x0ABF20);
    pub const SET_TIME: MessageId = MessageId(0x0ABF21);
    pub const SET_FILTER_CONFIG: MessageId = MessageId(0x0ABF23);
    pub const SET_TEMP_SCALE: MessageId = MessageId(0x0ABF27);

    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        MessageId(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }

    pub fn to_bytes(self) -> [u8; 3] {
        let [_, a, b, c] = self.0.to_be_bytes();
        [a, b, c]
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

/// Raw temperature value the controller reports when no reading is available
pub const UNKNOWN_TEMP: u8 = 0xFF;

/// Time of day as reported by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SpaTime {
    pub hour: u8,
    pub minute: u8,
}

impl SpaTime {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

impl fmt::Display for SpaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Temperature scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TempScale {
    /// Whole degrees Fahrenheit
    #[default]
    Fahrenheit = 0,
    /// Half degrees Celsius (raw value is degrees × 2)
    CelsiusX2 = 1,
}

impl TempScale {
    /// Convert a raw temperature byte to degrees in this scale
    pub fn to_degrees(self, raw: u8) -> f32 {
        match self {
            TempScale::Fahrenheit => raw as f32,
            TempScale::CelsiusX2 => raw as f32 / 2.0,
        }
    }

    /// Convert degrees in this scale to the raw byte the controller expects
    pub fn to_raw(self, degrees: f32) -> u8 {
        let raw = match self {
            TempScale::Fahrenheit => degrees.round(),
            TempScale::CelsiusX2 => (degrees * 2.0).round(),
        };
        raw.clamp(0.0, 254.0) as u8
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TempScale::Fahrenheit => "°F",
            TempScale::CelsiusX2 => "°C",
        }
    }
}

/// Heater mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingMode {
    Ready,
    Rest,
    ReadyInRest,
    /// Bit pattern with no documented meaning
    Unknown(u8),
}

impl HeatingMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => HeatingMode::Ready,
            1 => HeatingMode::Rest,
            3 => HeatingMode::ReadyInRest,
            other => HeatingMode::Unknown(other),
        }
    }
}

/// Heater temperature range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatingRange {
    Low,
    High,
}

/// Pump speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpStatus {
    Off,
    Low,
    High,
    /// Bit pattern with no documented meaning
    Unknown(u8),
}

impl PumpStatus {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => PumpStatus::Off,
            1 => PumpStatus::Low,
            2 => PumpStatus::High,
            other => PumpStatus::Unknown(other),
        }
    }

    pub fn is_running(self) -> bool {
        !matches!(self, PumpStatus::Off)
    }
}

/// Items that can be toggled with a single command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ToggleItem {
    Pump1 = 0x04,
    Pump2 = 0x05,
    Lights = 0x11,
    TempRange = 0x50,
    HeatMode = 0x51,
}

impl ToggleItem {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pump1" => Some(ToggleItem::Pump1),
            "pump2" => Some(ToggleItem::Pump2),
            "lights" => Some(ToggleItem::Lights),
            "temp-range" | "temp_range" => Some(ToggleItem::TempRange),
            "heat-mode" | "heat_mode" => Some(ToggleItem::HeatMode),
            _ => None,
        }
    }
}

/// One daily filter cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterCycle {
    pub start: SpaTime,
    pub duration_minutes: u16,
}

/// Both filter cycles; the second one can be switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterSchedule {
    pub filter1: FilterCycle,
    pub filter2_enabled: bool,
    pub filter2: FilterCycle,
}

/// Periodic status broadcast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusMessage {
    #[serde(skip)]
    pub raw: Bytes,
    pub time: SpaTime,
    pub time_24h: bool,
    /// `None` while the controller has no reading
    pub current_temp: Option<u8>,
    pub set_point_temp: u8,
    pub temp_scale: TempScale,
    pub heating_range: HeatingRange,
    pub heating_mode: HeatingMode,
    pub pump1: PumpStatus,
    pub pump2: PumpStatus,
    pub priming: bool,
    pub heating: bool,
    pub circ_pump_running: bool,
    pub lights: bool,
}

impl StatusMessage {
    pub fn current_degrees(&self) -> Option<f32> {
        self.current_temp.map(|t| self.temp_scale.to_degrees(t))
    }

    pub fn set_point_degrees(&self) -> f32 {
        self.temp_scale.to_degrees(self.set_point_temp)
    }
}

/// Reply to a config request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigResponse {
    #[serde(skip)]
    pub raw: Bytes,
    pub mac_address: String,
}

/// Reply to a filter config request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterConfigResponse {
    #[serde(skip)]
    pub raw: Bytes,
    pub schedule: FilterSchedule,
}

/// Reply to a version info request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionInfoResponse {
    #[serde(skip)]
    pub raw: Bytes,
    pub model_name: String,
    pub software_id: [u8; 3],
    pub current_setup: u8,
    pub configuration_signature: u32,
}

/// Message whose payload layout is not decoded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawMessage {
    pub id: MessageId,
    #[serde(skip)]
    pub raw: Bytes,
}

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpaMessage {
    Status(StatusMessage),
    ConfigResponse(ConfigResponse),
    FilterConfig(FilterConfigResponse),
    VersionInfo(VersionInfoResponse),
    ControlConfig2(RawMessage),
    SetTempRange(RawMessage),
    /// Unknown identifier, or a known identifier with the wrong size
    Unknown(RawMessage),
}

impl SpaMessage {
    /// The complete frame this message was decoded from
    pub fn raw(&self) -> &Bytes {
        match self {
            SpaMessage::Status(m) => &m.raw,
            SpaMessage::ConfigResponse(m) => &m.raw,
            SpaMessage::FilterConfig(m) => &m.raw,
            SpaMessage::VersionInfo(m) => &m.raw,
            SpaMessage::ControlConfig2(m) => &m.raw,
            SpaMessage::SetTempRange(m) => &m.raw,
            SpaMessage::Unknown(m) => &m.raw,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpaMessage::Status(_) => "status",
            SpaMessage::ConfigResponse(_) => "config_response",
            SpaMessage::FilterConfig(_) => "filter_config",
            SpaMessage::VersionInfo(_) => "version_info",
            SpaMessage::ControlConfig2(_) => "control_config_2",
            SpaMessage::SetTempRange(_) => "set_temp_range",
            SpaMessage::Unknown(_) => "unknown",
        }
    }

    pub fn is_status(&self) -> bool {
        matches!(self, SpaMessage::Status(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_bytes() {
        let id = MessageId::from_bytes([0xFF, 0xAF, 0x13]);
        assert_eq!(id, MessageId::STATUS);
        assert_eq!(MessageId::CONFIG_RESPONSE.to_bytes(), [0x0A, 0xBF, 0x94]);
        assert_eq!(MessageId::STATUS.to_string(), "0xffaf13");
    }

    #[test]
    fn test_heating_mode_bits() {
        assert_eq!(HeatingMode::from_bits(0), HeatingMode::Ready);
        assert_eq!(HeatingMode::from_bits(1), HeatingMode::Rest);
        assert_eq!(HeatingMode::from_bits(3), HeatingMode::ReadyInRest);
        assert_eq!(HeatingMode::from_bits(2), HeatingMode::Unknown(2));
        // upper bits ignored
        assert_eq!(HeatingMode::from_bits(0xFD), HeatingMode::Rest);
    }

    #[test]
    fn test_pump_bits() {
        assert_eq!(PumpStatus::from_bits(2), PumpStatus::High);
        assert_eq!(PumpStatus::from_bits(3), PumpStatus::Unknown(3));
        assert!(!PumpStatus::Off.is_running());
        assert!(PumpStatus::Low.is_running());
    }

    #[test]
    fn test_temp_scale_conversion() {
        assert_eq!(TempScale::Fahrenheit.to_degrees(102), 102.0);
        assert_eq!(TempScale::CelsiusX2.to_degrees(75), 37.5);
        assert_eq!(TempScale::CelsiusX2.to_raw(37.5), 75);
        assert_eq!(TempScale::Fahrenheit.to_raw(101.6), 102);
    }

    #[test]
    fn test_toggle_item_names() {
        assert_eq!(ToggleItem::from_name("Lights"), Some(ToggleItem::Lights));
        assert_eq!(ToggleItem::from_name("heat-mode"), Some(ToggleItem::HeatMode));
        assert_eq!(ToggleItem::from_name("jets"), None);
        assert_eq!(ToggleItem::TempRange.code(), 0x50);
    }
}
