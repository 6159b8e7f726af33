//! Command-line Modbus RTU slave emulator

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use modsim::server::*;
use modsim::*;

mod config;

#[derive(Parser)]
#[command(name = "modsim-server")]
#[command(about = "Emulates the Modbus RTU slaves described in a YAML file")]
#[command(version)]
struct Cli {
    #[arg(short = 'c', long, default_value = "config.yaml", help = "Path to the YAML configuration")]
    config: PathBuf,

    #[arg(short = 'p', long, help = "Serial port, overrides the configured one")]
    port: Option<String>,

    #[arg(short = 'b', long, help = "Baud rate, overrides the configured one")]
    baud: Option<u32>,

    #[arg(long, default_value = "info", help = "Maximum log level (error, warn, info, debug, trace)")]
    log_level: tracing::Level,

    #[arg(long, value_enum, default_value_t = Decode::Nothing, help = "How much of each frame to log")]
    decode: Decode,

    #[arg(long, default_value_t = 500, help = "Milliseconds allowed for a multi-write frame to arrive")]
    frame_timeout: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Decode {
    /// Log nothing about frames
    Nothing,
    /// Log function codes and frame headers
    Header,
    /// Log values and raw bytes
    Payload,
}

impl From<Decode> for DecodeLevel {
    fn from(from: Decode) -> Self {
        match from {
            Decode::Nothing => DecodeLevel::nothing(),
            Decode::Header => DecodeLevel::new(
                AppDecodeLevel::DataHeaders,
                FrameDecodeLevel::Header,
                PhysDecodeLevel::Nothing,
            ),
            Decode::Payload => DecodeLevel::new(
                AppDecodeLevel::DataValues,
                FrameDecodeLevel::Payload,
                PhysDecodeLevel::Length,
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    run(cli).await.map_err(|err| {
        tracing::error!("{err}");
        err
    })
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_file(&cli.config)?;

    let port = cli
        .port
        .clone()
        .unwrap_or_else(|| config.connection().port.clone());
    let speed = cli.baud.unwrap_or(config.connection().speed);

    let (_, devices) = config.into_parts();
    println!(
        "Modbus bus on port {}, speed={}.\nActing as {} slaves.",
        port,
        speed,
        devices.len()
    );
    for device in &devices {
        tracing::info!(
            "slave {} ({}): {} registers",
            device.unit_id(),
            device.description(),
            device.store().len()
        );
    }

    let dispatcher = Dispatcher::new(devices)
        .with_decode_level(cli.decode.into())
        .with_frame_timeout(Duration::from_millis(cli.frame_timeout));

    let _server = spawn_rtu_server_task(
        &port,
        SerialSettings::with_baud_rate(speed),
        default_retry_strategy(),
        dispatcher,
        ServerOptions::default(),
    );

    println!("Press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("stopping");

    Ok(())
}
