//! Message dispatch
//!
//! Maps a validated [`Frame`] to a [`SpaMessage`]. Each known identifier has
//! an expected total frame size and a field decoder; a frame whose size does
//! not match is passed through as [`SpaMessage::Unknown`] rather than
//! partially decoded.

use crate::types::*;
use crate::Frame;
use bytes::Bytes;
use tracing::trace;

/// Expected size and decoder for one inbound identifier
struct Decoder {
    id: MessageId,
    /// Total frame size; `None` accepts any size
    size: Option<usize>,
    decode: fn(&Frame) -> SpaMessage,
}

const DECODERS: &[Decoder] = &[
    Decoder {
        id: MessageId::STATUS,
        size: Some(31),
        decode: decode_status,
    },
    Decoder {
        id: MessageId::CONFIG_RESPONSE,
        size: Some(32),
        decode: decode_config_response,
    },
    Decoder {
        id: MessageId::FILTER_CONFIG,
        size: Some(15),
        decode: decode_filter_config,
    },
    Decoder {
        id: MessageId::VERSION_INFO,
        size: Some(28),
        decode: decode_version_info,
    },
    Decoder {
        id: MessageId::CONTROL_CONFIG_2,
        size: Some(13),
        decode: decode_control_config_2,
    },
    Decoder {
        id: MessageId::SET_TEMP_RANGE,
        size: None,
        decode: decode_set_temp_range,
    },
];

/// Decode a frame into a message
pub fn decode(frame: &Frame) -> SpaMessage {
    let id = frame.id();

    match DECODERS.iter().find(|d| d.id == id) {
        Some(decoder) if decoder.size.map_or(true, |s| s == frame.len()) => {
            (decoder.decode)(frame)
        }
        Some(decoder) => {
            trace!(
                "Message {} has {} bytes, expected {:?}",
                id,
                frame.len(),
                decoder.size
            );
            SpaMessage::Unknown(raw_message(frame))
        }
        None => SpaMessage::Unknown(raw_message(frame)),
    }
}

fn raw_message(frame: &Frame) -> RawMessage {
    RawMessage {
        id: frame.id(),
        raw: frame.as_bytes().clone(),
    }
}

fn decode_control_config_2(frame: &Frame) -> SpaMessage {
    SpaMessage::ControlConfig2(raw_message(frame))
}

fn decode_set_temp_range(frame: &Frame) -> SpaMessage {
    SpaMessage::SetTempRange(raw_message(frame))
}

fn decode_status(frame: &Frame) -> SpaMessage {
    let m = frame.as_bytes();

    let current_temp = match m[7] {
        UNKNOWN_TEMP => None,
        t => Some(t),
    };

    SpaMessage::Status(StatusMessage {
        raw: m.clone(),
        time: SpaTime::new(m[8], m[9]),
        time_24h: m[14] & 0x02 != 0,
        current_temp,
        set_point_temp: m[25],
        temp_scale: if m[14] & 0x01 != 0 {
            TempScale::CelsiusX2
        } else {
            TempScale::Fahrenheit
        },
        heating_range: if m[15] & 0x04 != 0 {
            HeatingRange::High
        } else {
            HeatingRange::Low
        },
        heating_mode: HeatingMode::from_bits(m[10]),
        pump1: PumpStatus::from_bits(m[16]),
        pump2: PumpStatus::from_bits(m[16] >> 2),
        priming: m[6] & 0x01 != 0,
        heating: m[15] & 0x30 != 0,
        circ_pump_running: m[18] & 0x02 != 0,
        lights: m[19] & 0x03 != 0,
    })
}

fn decode_config_response(frame: &Frame) -> SpaMessage {
    let mac = &frame.payload()[3..9];
    let mac_address = mac
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join("-");

    SpaMessage::ConfigResponse(ConfigResponse {
        raw: frame.as_bytes().clone(),
        mac_address,
    })
}

fn decode_filter_config(frame: &Frame) -> SpaMessage {
    let p = frame.payload();
    let duration = |hours: u8, minutes: u8| hours as u16 * 60 + minutes as u16;

    SpaMessage::FilterConfig(FilterConfigResponse {
        raw: frame.as_bytes().clone(),
        schedule: FilterSchedule {
            filter1: FilterCycle {
                start: SpaTime::new(p[0], p[1]),
                duration_minutes: duration(p[2], p[3]),
            },
            filter2_enabled: p[4] & 0x80 != 0,
            filter2: FilterCycle {
                start: SpaTime::new(p[4] & 0x7F, p[5]),
                duration_minutes: duration(p[6], p[7]),
            },
        },
    })
}

fn decode_version_info(frame: &Frame) -> SpaMessage {
    let p = frame.payload();
    let model_name = String::from_utf8_lossy(&p[4..12])
        .trim_end_matches(' ')
        .to_string();

    SpaMessage::VersionInfo(VersionInfoResponse {
        raw: frame.as_bytes().clone(),
        model_name,
        software_id: [p[0], p[1], p[2]],
        current_setup: p[12],
        configuration_signature: u32::from_be_bytes([p[13], p[14], p[15], p[16]]),
    })
}

/// Decodes frames and optionally suppresses repeated status messages.
///
/// With coalescing enabled a status message is only returned when its raw
/// bytes differ from the last status message returned.
#[derive(Debug, Default)]
pub struct Dispatcher {
    coalesce: bool,
    last_status: Option<Bytes>,
}

impl Dispatcher {
    pub fn new(coalesce: bool) -> Self {
        Self {
            coalesce,
            last_status: None,
        }
    }

    pub fn coalescing(&self) -> bool {
        self.coalesce
    }

    /// Decode `frame`; `None` means a duplicate status was suppressed
    pub fn dispatch(&mut self, frame: &Frame) -> Option<SpaMessage> {
        let message = decode(frame);

        if self.coalesce && message.is_status() {
            if self.last_status.as_ref() == Some(frame.as_bytes()) {
                trace!("Suppressing unchanged status");
                return None;
            }
            self.last_status = Some(frame.as_bytes().clone());
        }

        Some(message)
    }
}
