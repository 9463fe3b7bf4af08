//! Spa CLI - Command-line interface for spa controllers
//!
//! Discover controllers on the LAN, watch their status stream and send
//! commands.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use spa_client::{MonitorConfig, MonitorEvent};
use spa_core::{
    FilterCycle, FilterSchedule, Frame, SpaEndpoint, SpaMessage, SpaTime, TempScale, ToggleItem,
};
use std::net::IpAddr;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod output;
mod session;

use config::FileConfig;
use session::Session;

/// Spa controller client
#[derive(Parser)]
#[command(name = "spa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SPA_CONFIG")]
    config: Option<PathBuf>,

    /// Control channel port (overrides the config file)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find controllers on the local network
    Discover {
        /// Broadcast address to send the request to
        #[arg(short, long)]
        target: Option<IpAddr>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print messages from a controller until interrupted
    Monitor {
        /// Controller address
        host: IpAddr,

        /// Print every frame as hex
        #[arg(long)]
        raw: bool,

        /// Print unchanged status messages too
        #[arg(long)]
        no_coalesce: bool,

        /// Print messages as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Toggle a pump, the lights, the temperature range or the heat mode
    Toggle {
        /// Controller address
        host: IpAddr,

        /// pump1, pump2, lights, temp-range or heat-mode
        #[arg(value_parser = parse_toggle_item)]
        item: ToggleItem,
    },

    /// Set the target temperature
    SetTemp {
        /// Controller address
        host: IpAddr,

        /// Target temperature in degrees
        value: f32,

        /// Value is in Celsius (default Fahrenheit)
        #[arg(long)]
        celsius: bool,
    },

    /// Set the controller's temperature scale
    SetScale {
        /// Controller address
        host: IpAddr,

        /// fahrenheit or celsius
        #[arg(value_parser = parse_scale)]
        scale: TempScale,
    },

    /// Set the controller clock
    SetTime {
        /// Controller address
        host: IpAddr,

        /// Time as HH:MM
        #[arg(value_parser = parse_time)]
        time: SpaTime,

        /// Show time on a 24-hour clock
        #[arg(long = "24h")]
        time_24h: bool,
    },

    /// Show the filter cycle schedule
    Filters {
        /// Controller address
        host: IpAddr,

        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the filter cycle schedule
    SetFilters {
        /// Controller address
        host: IpAddr,

        /// Filter 1 start as HH:MM
        #[arg(long, value_parser = parse_time)]
        start1: SpaTime,

        /// Filter 1 duration in minutes
        #[arg(long)]
        minutes1: u16,

        /// Filter 2 start as HH:MM (omit to disable filter 2)
        #[arg(long, value_parser = parse_time, requires = "minutes2")]
        start2: Option<SpaTime>,

        /// Filter 2 duration in minutes
        #[arg(long, requires = "start2")]
        minutes2: Option<u16>,
    },

    /// Show MAC address and firmware information
    Info {
        /// Controller address
        host: IpAddr,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate and decode a frame given as hex
    Hexdump {
        /// Frame bytes, e.g. "7e 05 0a bf 04 77 7e"
        hex: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.log_level, cli.json_logs)?;

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let mut monitor_config = file_config.monitor_config();
    if let Some(port) = cli.port {
        monitor_config.port = port;
    }

    // Handle Ctrl+C
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(()).await;
        }
    });

    match cli.command {
        Commands::Discover { target, json } => {
            let mut config = file_config.discovery_config();
            if let Some(target) = target {
                config.target = target;
            }
            run_discover(&config, json).await?;
        }

        Commands::Monitor {
            host,
            raw,
            no_coalesce,
            json,
        } => {
            if no_coalesce {
                monitor_config.coalesce_status = false;
            }
            run_monitor(host, monitor_config, raw, json, &mut shutdown_rx).await?;
        }

        Commands::Toggle { host, item } => {
            let session = Session::open(endpoint(host), monitor_config).await?;
            session.conn.send_toggle(item).await?;
            session.close().await;
            print_ok(&format!("Toggled {:?}", item));
        }

        Commands::SetTemp {
            host,
            value,
            celsius,
        } => {
            let scale = if celsius {
                TempScale::CelsiusX2
            } else {
                TempScale::Fahrenheit
            };
            let session = Session::open(endpoint(host), monitor_config).await?;
            session
                .conn
                .send_set_temperature(scale.to_raw(value), scale)
                .await?;
            session.close().await;
            print_ok(&format!("Target temperature set to {}{}", value, scale.symbol()));
        }

        Commands::SetScale { host, scale } => {
            let session = Session::open(endpoint(host), monitor_config).await?;
            session.conn.send_set_temperature_scale(scale).await?;
            session.close().await;
            print_ok(&format!("Temperature scale set to {}", scale.symbol()));
        }

        Commands::SetTime {
            host,
            time,
            time_24h,
        } => {
            let session = Session::open(endpoint(host), monitor_config).await?;
            session.conn.send_set_time(time, time_24h).await?;
            session.close().await;
            print_ok(&format!("Clock set to {}", time));
        }

        Commands::Filters { host, json } => {
            let mut session = Session::open(endpoint(host), monitor_config).await?;
            session.conn.send_filter_config_request().await?;
            let schedule = session
                .wait_for("filter configuration", |m| match m {
                    SpaMessage::FilterConfig(f) => Some(f.schedule),
                    _ => None,
                })
                .await?;
            session.close().await;

            if json {
                output::print_json(&schedule)?;
            } else {
                output::print_schedule(&schedule);
            }
        }

        Commands::SetFilters {
            host,
            start1,
            minutes1,
            start2,
            minutes2,
        } => {
            let schedule = FilterSchedule {
                filter1: FilterCycle {
                    start: start1,
                    duration_minutes: minutes1,
                },
                filter2_enabled: start2.is_some(),
                filter2: FilterCycle {
                    start: start2.unwrap_or_default(),
                    duration_minutes: minutes2.unwrap_or(0),
                },
            };

            let session = Session::open(endpoint(host), monitor_config).await?;
            session.conn.send_set_filter_schedule(schedule).await?;
            session.close().await;
            print_ok("Filter schedule updated");
            output::print_schedule(&schedule);
        }

        Commands::Info { host, json } => {
            run_info(host, monitor_config, json).await?;
        }

        Commands::Hexdump { hex } => {
            run_hexdump(&hex)?;
        }
    }

    Ok(())
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to parse log level")?;

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).compact())
            .init();
    }

    Ok(())
}

fn endpoint(host: IpAddr) -> SpaEndpoint {
    SpaEndpoint::from_ip(host)
}

fn print_ok(message: &str) {
    println!("{} {}", "OK".green().bold(), message);
}

fn parse_toggle_item(s: &str) -> std::result::Result<ToggleItem, String> {
    ToggleItem::from_name(s).ok_or_else(|| {
        format!(
            "unknown item '{}' (expected pump1, pump2, lights, temp-range or heat-mode)",
            s
        )
    })
}

fn parse_scale(s: &str) -> std::result::Result<TempScale, String> {
    match s.to_ascii_lowercase().as_str() {
        "f" | "fahrenheit" => Ok(TempScale::Fahrenheit),
        "c" | "celsius" => Ok(TempScale::CelsiusX2),
        _ => Err(format!("unknown scale '{}' (expected fahrenheit or celsius)", s)),
    }
}

fn parse_time(s: &str) -> std::result::Result<SpaTime, String> {
    let (hour, minute) = s
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{}'", s))?;

    let hour: u8 = hour.parse().map_err(|_| format!("invalid hour '{}'", hour))?;
    let minute: u8 = minute
        .parse()
        .map_err(|_| format!("invalid minute '{}'", minute))?;

    if hour >= 24 || minute >= 60 {
        return Err(format!("time out of range: {}", s));
    }
    Ok(SpaTime::new(hour, minute))
}

async fn run_discover(config: &spa_discovery::DiscoveryConfig, json: bool) -> Result<()> {
    if !json {
        println!(
            "{} Searching for spas on {}:{}",
            "SPA".cyan().bold(),
            config.target,
            config.port
        );
    }

    let spas = spa_discovery::discover(config)
        .await
        .context("Discovery failed")?;

    if json {
        return output::print_json(&spas);
    }

    if spas.is_empty() {
        println!("{}", "No spas found".yellow());
    } else {
        println!("{} Found {} spa(s)", "OK".green().bold(), spas.len());
        for spa in &spas {
            output::print_endpoint(spa);
        }
    }

    Ok(())
}

async fn run_monitor(
    host: IpAddr,
    config: MonitorConfig,
    raw: bool,
    json: bool,
    shutdown_rx: &mut mpsc::Receiver<()>,
) -> Result<()> {
    let mut session = Session::open(endpoint(host), config).await?;

    if !json {
        println!(
            "{} Monitoring {} (Ctrl+C to stop)",
            "SPA".cyan().bold(),
            host
        );
    }

    let result = loop {
        tokio::select! {
            event = session.events.recv() => match event {
                Some(MonitorEvent::Message(message)) => {
                    if json {
                        output::print_json(&message)?;
                    } else {
                        output::print_message(&message, raw);
                    }
                }
                Some(MonitorEvent::Fatal(e)) => break Err(anyhow!("Connection failed: {}", e)),
                Some(MonitorEvent::Disposed) | None => break Ok(()),
            },
            _ = shutdown_rx.recv() => break Ok(()),
        }
    };

    session.close().await;
    if result.is_ok() && !json {
        println!("{}", "Monitor stopped".yellow());
    }
    result
}

async fn run_info(host: IpAddr, config: MonitorConfig, json: bool) -> Result<()> {
    let mut session = Session::open(endpoint(host), config).await?;

    session.conn.send_config_request().await?;
    let mac = session
        .wait_for("configuration", |m| match m {
            SpaMessage::ConfigResponse(c) => Some(c.mac_address.clone()),
            _ => None,
        })
        .await?;

    session.conn.send_version_info_request().await?;
    let version = session
        .wait_for("version information", |m| match m {
            SpaMessage::VersionInfo(v) => Some(v.clone()),
            _ => None,
        })
        .await?;

    session.close().await;

    if json {
        return output::print_json(&serde_json::json!({
            "host": host,
            "mac_address": mac,
            "version": version,
        }));
    }

    println!("Host:       {}", host.to_string().green());
    println!("MAC:        {}", mac.yellow());
    output::print_version(&version);
    Ok(())
}

fn run_hexdump(hex: &str) -> Result<()> {
    let bytes = spa_core::hex::parse(hex).ok_or_else(|| anyhow!("Not valid hex: {}", hex))?;

    let frame = match Frame::parse(bytes) {
        Ok(frame) => frame,
        Err(e) => bail!("Invalid frame: {}", e),
    };

    println!(
        "{} id {} length {} checksum {:02x}",
        "FRAME".cyan(),
        frame.id(),
        frame.header().length,
        frame.header().checksum
    );
    println!("payload    {}", spa_core::hex::dump(frame.payload()));

    let message = spa_core::decode(&frame);
    println!("{:#?}", message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("07:30"), Ok(SpaTime::new(7, 30)));
        assert_eq!(parse_time("23:59"), Ok(SpaTime::new(23, 59)));
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("12").is_err());
        assert!(parse_time("ab:cd").is_err());
    }

    #[test]
    fn test_parse_scale_and_item() {
        assert_eq!(parse_scale("Celsius"), Ok(TempScale::CelsiusX2));
        assert_eq!(parse_scale("f"), Ok(TempScale::Fahrenheit));
        assert!(parse_scale("kelvin").is_err());
        assert_eq!(parse_toggle_item("lights"), Ok(ToggleItem::Lights));
        assert!(parse_toggle_item("jets").is_err());
    }

    #[test]
    fn test_set_filters_args() {
        let cli = Cli::try_parse_from([
            "spa",
            "set-filters",
            "10.0.0.5",
            "--start1",
            "20:00",
            "--minutes1",
            "120",
        ])
        .unwrap();

        match cli.command {
            Commands::SetFilters { start2, .. } => assert!(start2.is_none()),
            _ => panic!("expected set-filters"),
        }
    }

    #[test]
    fn test_set_filters_second_cycle_needs_both_halves() {
        let duration_only = Cli::try_parse_from([
            "spa",
            "set-filters",
            "10.0.0.5",
            "--start1",
            "20:00",
            "--minutes1",
            "120",
            "--minutes2",
            "30",
        ]);
        assert!(duration_only.is_err());

        let start_only = Cli::try_parse_from([
            "spa",
            "set-filters",
            "10.0.0.5",
            "--start1",
            "20:00",
            "--minutes1",
            "120",
            "--start2",
            "08:00",
        ]);
        assert!(start_only.is_err());

        let cli = Cli::try_parse_from([
            "spa",
            "set-filters",
            "10.0.0.5",
            "--start1",
            "20:00",
            "--minutes1",
            "120",
            "--start2",
            "08:00",
            "--minutes2",
            "30",
        ])
        .unwrap();
        match cli.command {
            Commands::SetFilters {
                start2, minutes2, ..
            } => {
                assert!(start2.is_some());
                assert_eq!(minutes2, Some(30));
            }
            _ => panic!("expected set-filters"),
        }
    }
}
