pub mod device;
pub mod monitor;

use std::{
    error::Error,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use clap::{Parser, Subcommand};
use device::handle_devices;
use monitor::handle_monitor;

use crate::{
    config::{path::find_config_file, FeederConfig, LoadError},
    feeder::Feeder,
    input::{source::hidraw::HidApiTransport, target::uinput::UinputJoystick},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the feeder config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Virtual joystick device id (overrides the config file)
    #[arg(short, long)]
    pub joystick_id: Option<u8>,
    /// Vendor id of the board, e.g. 0x0ca3 (overrides the config file)
    #[arg(long, value_parser = parse_hex_u16)]
    pub vid: Option<u16>,
    /// Product id of the board, e.g. 0x0021 (overrides the config file)
    #[arg(long, value_parser = parse_hex_u16)]
    pub pid: Option<u16>,
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Feed the board into the virtual joystick (default)
    Run,
    /// List hidraw devices
    Devices,
    /// Print decoded input reports without feeding the virtual joystick
    Monitor {
        /// Stop after this many decoded reports
        #[arg(short = 'n', long)]
        count: Option<u64>,
    },
    /// Print the effective config as YAML
    Config,
}

pub async fn main_cli(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = load_config(&args)?;
    let cmd = args.cmd.unwrap_or(Commands::Run);

    match cmd {
        Commands::Run => run_feeder(config).await?,
        Commands::Devices => handle_devices(config).await?,
        Commands::Monitor { count } => handle_monitor(config, count).await?,
        Commands::Config => print!("{}", config.to_yaml()?),
    }

    Ok(())
}

/// Load the config from the given path, the first config file found, or
/// the defaults, and apply command line overrides.
pub fn load_config(args: &Args) -> Result<FeederConfig, LoadError> {
    let path = args.config.clone().or_else(find_config_file);
    let mut config = match path {
        Some(path) => {
            log::debug!("Loading config from {path:?}");
            FeederConfig::from_yaml_file(path)?
        }
        None => {
            log::debug!("No config file found. Using defaults.");
            FeederConfig::default()
        }
    };

    if let Some(id) = args.joystick_id {
        config.joystick_id = id;
    }
    if let Some(vid) = args.vid {
        config.device.vendor_id = vid;
    }
    if let Some(pid) = args.pid {
        config.device.product_id = pid;
    }
    config.validate()?;

    Ok(config)
}

/// Parse a 16-bit id given in hex (with or without 0x prefix)
fn parse_hex_u16(value: &str) -> Result<u16, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{value}': {e}"))
}

/// Run the feeder on a blocking thread until Ctrl+C or a fatal error
async fn run_feeder(config: FeederConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting io4feeder v{}", VERSION);

    // Setup CTRL+C handler
    let stop = Arc::new(AtomicBool::new(false));
    let ctrl_c_stop = stop.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Unable to listen for shutdown signal: {e:?}");
            return;
        }
        log::info!("Shutting down");
        ctrl_c_stop.store(true, Ordering::Relaxed);
    });

    let stats = tokio::task::spawn_blocking(move || {
        let feeder =
            Feeder::new(config, HidApiTransport::new(), UinputJoystick::new()).with_stop_handle(stop);
        feeder.run()
    })
    .await??;
    log::debug!("Final stats: {stats:?}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_hex_u16;

    #[test]
    fn test_parse_hex_u16() {
        assert_eq!(parse_hex_u16("0x0ca3"), Ok(0x0CA3));
        assert_eq!(parse_hex_u16("0X0021"), Ok(0x0021));
        assert_eq!(parse_hex_u16("ffff"), Ok(0xFFFF));
        assert!(parse_hex_u16("0x10000").is_err());
        assert!(parse_hex_u16("io4").is_err());
    }
}
