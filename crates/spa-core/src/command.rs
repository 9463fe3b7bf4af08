//! Outbound commands
//!
//! Every command has a fixed payload shape. Filter-config, version-info and
//! control-config-2 requests share [`MessageId::SETTINGS_REQUEST`] and are
//! told apart by their payload bytes.

use crate::types::*;
use crate::{Error, Frame, Result};

/// Marker byte preceding the scale code in a set-scale command
const TEMP_SCALE_MARKER: u8 = 0x01;

/// High bit of an hour byte: 24-hour clock (set time) or cycle enabled (filter 2)
const HOUR_FLAG: u8 = 0x80;

/// A command sent to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ConfigRequest,
    FilterConfigRequest,
    VersionInfoRequest,
    ControlConfig2Request,
    Toggle(ToggleItem),
    /// Raw target value in the controller's current scale
    SetTemperature(u8),
    SetTemperatureScale(TempScale),
    SetFilterSchedule(FilterSchedule),
    SetTime { time: SpaTime, time_24h: bool },
}

impl Command {
    pub fn id(&self) -> MessageId {
        match self {
            Command::ConfigRequest => MessageId::CONFIG_REQUEST,
            Command::FilterConfigRequest
            | Command::VersionInfoRequest
            | Command::ControlConfig2Request => MessageId::SETTINGS_REQUEST,
            Command::Toggle(_) => MessageId::TOGGLE_ITEM,
            Command::SetTemperature(_) => MessageId::SET_TEMP,
            Command::SetTemperatureScale(_) => MessageId::SET_TEMP_SCALE,
            Command::SetFilterSchedule(_) => MessageId::SET_FILTER_CONFIG,
            Command::SetTime { .. } => MessageId::SET_TIME,
        }
    }

    /// Payload bytes for this command
    pub fn payload(&self) -> Result<Vec<u8>> {
        let payload = match *self {
            Command::ConfigRequest => vec![],
            Command::FilterConfigRequest => vec![0x01, 0x00, 0x00],
            Command::VersionInfoRequest => vec![0x02, 0x00, 0x00],
            Command::ControlConfig2Request => vec![0x00, 0x00, 0x01],
            Command::Toggle(item) => vec![item.code(), 0x00],
            Command::SetTemperature(value) => vec![value],
            Command::SetTemperatureScale(scale) => vec![TEMP_SCALE_MARKER, scale as u8],
            Command::SetFilterSchedule(schedule) => encode_filter_schedule(&schedule)?,
            Command::SetTime { time, time_24h } => {
                check_time(time)?;
                let hour = if time_24h {
                    time.hour | HOUR_FLAG
                } else {
                    time.hour
                };
                vec![hour, time.minute]
            }
        };
        Ok(payload)
    }

    /// Build the wire frame for this command
    pub fn encode(&self) -> Result<Frame> {
        Frame::encode(self.id(), &self.payload()?)
    }
}

fn check_time(time: SpaTime) -> Result<()> {
    if time.hour >= 24 {
        return Err(Error::InvalidValue {
            field: "hour",
            value: time.hour as u32,
        });
    }
    if time.minute >= 60 {
        return Err(Error::InvalidValue {
            field: "minute",
            value: time.minute as u32,
        });
    }
    Ok(())
}

fn split_duration(minutes: u16) -> Result<[u8; 2]> {
    let hours = minutes / 60;
    if hours > u8::MAX as u16 {
        return Err(Error::InvalidValue {
            field: "duration",
            value: minutes as u32,
        });
    }
    Ok([hours as u8, (minutes % 60) as u8])
}

fn encode_filter_schedule(schedule: &FilterSchedule) -> Result<Vec<u8>> {
    let f1 = &schedule.filter1;
    let f2 = &schedule.filter2;
    check_time(f1.start)?;
    check_time(f2.start)?;

    let hour2 = if schedule.filter2_enabled {
        f2.start.hour | HOUR_FLAG
    } else {
        f2.start.hour
    };

    let mut payload = Vec::with_capacity(8);
    payload.extend_from_slice(&[f1.start.hour, f1.start.minute]);
    payload.extend_from_slice(&split_duration(f1.duration_minutes)?);
    payload.extend_from_slice(&[hour2, f2.start.minute]);
    payload.extend_from_slice(&split_duration(f2.duration_minutes)?);
    Ok(payload)
}
