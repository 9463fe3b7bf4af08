//! Terminal output

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use spa_core::hex::HexDump;
use spa_core::{
    FilterCycle, FilterSchedule, PumpStatus, SpaEndpoint, SpaMessage, StatusMessage,
    VersionInfoResponse,
};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn print_endpoint(spa: &SpaEndpoint) {
    println!(
        "  {} {}",
        spa.ip().to_string().green(),
        spa.mac_address().yellow()
    );
}

fn on_off(on: bool) -> colored::ColoredString {
    if on {
        "on".green()
    } else {
        "off".dimmed()
    }
}

fn pump(status: PumpStatus) -> colored::ColoredString {
    match status {
        PumpStatus::Off => "off".dimmed(),
        PumpStatus::Low => "low".green(),
        PumpStatus::High => "high".green().bold(),
        PumpStatus::Unknown(bits) => format!("?{:02b}", bits).red(),
    }
}

pub fn print_status(status: &StatusMessage) {
    let unit = status.temp_scale.symbol();
    let current = match status.current_degrees() {
        Some(t) => format!("{:.1}{}", t, unit),
        None => "--".to_string(),
    };

    println!(
        "{} {} temp {} set {:.1}{} {:?}/{:?} heat {} pump1 {} pump2 {} circ {} lights {}{}",
        "STATUS".cyan(),
        status.time,
        current.bold(),
        status.set_point_degrees(),
        unit,
        status.heating_mode,
        status.heating_range,
        on_off(status.heating),
        pump(status.pump1),
        pump(status.pump2),
        on_off(status.circ_pump_running),
        on_off(status.lights),
        if status.priming {
            " (priming)".yellow().to_string()
        } else {
            String::new()
        },
    );
}

fn print_cycle(label: &str, cycle: &FilterCycle, enabled: bool) {
    let state = if enabled { "".normal() } else { " (disabled)".dimmed() };
    println!(
        "  {} starts {} for {}h{:02}m{}",
        label,
        cycle.start,
        cycle.duration_minutes / 60,
        cycle.duration_minutes % 60,
        state
    );
}

pub fn print_schedule(schedule: &FilterSchedule) {
    println!("{}", "Filter cycles:".green());
    print_cycle("Filter 1", &schedule.filter1, true);
    print_cycle("Filter 2", &schedule.filter2, schedule.filter2_enabled);
}

pub fn print_version(info: &VersionInfoResponse) {
    println!("Model:      {}", info.model_name.bold());
    println!(
        "Software:   M{}_{} V{}.{}",
        info.software_id[0],
        info.software_id[1],
        info.software_id[2] / 10,
        info.software_id[2] % 10
    );
    println!("Setup:      {}", info.current_setup);
    println!("Signature:  {:08X}", info.configuration_signature);
}

pub fn print_message(message: &SpaMessage, raw: bool) {
    if raw {
        println!("{:<18} {}", message.name().cyan(), HexDump(&message.raw()[..]));
        return;
    }

    match message {
        SpaMessage::Status(status) => print_status(status),
        SpaMessage::ConfigResponse(config) => {
            println!("{} mac {}", "CONFIG".cyan(), config.mac_address.yellow())
        }
        SpaMessage::FilterConfig(filter) => print_schedule(&filter.schedule),
        SpaMessage::VersionInfo(info) => print_version(info),
        SpaMessage::ControlConfig2(m) | SpaMessage::SetTempRange(m) => {
            println!("{:<18} {}", message.name().cyan(), HexDump(&m.raw[..]))
        }
        SpaMessage::Unknown(m) => {
            println!("{} {} {}", "UNKNOWN".red(), m.id, HexDump(&m.raw[..]))
        }
    }
}
