//! CLI application for controlling LIFX lights.
//!
//! Without `--ip`, commands apply to every light that answers discovery.
//!
//! Run with: cargo run --example lifx_cli -- --help

use clap::{Parser, Subcommand};
use lifx_lan_rs::wire::DEFAULT_PORT;
use lifx_lan_rs::{
    ColorArgs, Device, DeviceSet, MessageRouter, Operation, Property, Reply, RouterConfig,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lifx-cli")]
#[command(about = "Control LIFX lights from the command line", long_about = None)]
struct Cli {
    /// IP address of a single light (default: all discovered lights)
    #[arg(short, long, global = true)]
    ip: Option<IpAddr>,

    /// Discovery timeout in milliseconds
    #[arg(short, long, global = true, default_value = "1000")]
    timeout: u64,

    /// Give up on a light after this many milliseconds without a reply
    #[arg(long, global = true, default_value = "2000")]
    response_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover all lights on the network
    Discover,

    /// List label and power of each light
    List,

    /// Show the full state of each light
    Status,

    /// Turn the lights on
    On,

    /// Turn the lights off
    Off,

    /// Toggle the lights on/off
    Toggle,

    /// Set a color
    Color {
        /// Hue in degrees
        hue: f64,
        /// Saturation (0-1)
        #[arg(short, long, default_value = "1.0")]
        saturation: f64,
        /// Brightness (0-1)
        #[arg(short, long, default_value = "1.0")]
        brightness: f64,
        /// Temperature in Kelvin (1500-9000)
        #[arg(short, long, default_value = "3500")]
        kelvin: u16,
        /// Transition time in milliseconds
        #[arg(short, long, default_value = "0")]
        duration: u32,
    },

    /// Read a property or run an operation by name
    Call {
        /// Property or operation name (e.g. label, set_power, set_color)
        name: String,
        /// Arguments as JSON (e.g. '{"hue": 120}')
        #[arg(default_value = "null")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = RouterConfig {
        response_timeout_ms: Some(cli.response_timeout),
        ..RouterConfig::default()
    };
    let router = Arc::new(MessageRouter::bind(config).await?);
    let timeout = Duration::from_millis(cli.timeout);

    if let Commands::Discover = cli.command {
        println!("Discovering lights on the network (timeout: {}ms)...", cli.timeout);
        let found = router.discover(timeout).await?;
        if found.is_empty() {
            println!("No lights found on the network.");
        } else {
            println!("\nFound {} light(s):", found.len());
            for (addr, reply) in found {
                println!("  {:21}  MAC: {}", addr.to_string(), reply.target);
            }
        }
        return Ok(());
    }

    let devices = match cli.ip {
        Some(ip) => {
            let mut set = DeviceSet::new();
            set.insert(Device::new(
                Arc::clone(&router),
                SocketAddr::new(ip, DEFAULT_PORT),
            ))?;
            set
        }
        None => DeviceSet::discover(&router, timeout).await?,
    };
    if devices.is_empty() {
        println!("No lights found on the network.");
        return Ok(());
    }

    router.set_receiving(true).await?;
    let receiver = router.spawn_receiver();

    let results = match cli.command {
        Commands::Discover => unreachable!(),
        Commands::List => {
            print!("{}", devices.describe().await);
            Vec::new()
        }
        Commands::Status => devices.all_get(Property::Color).await,
        Commands::On => devices.all_do(&Operation::TurnOn).await,
        Commands::Off => devices.all_do(&Operation::TurnOff).await,
        Commands::Toggle => devices.all_do(&Operation::TogglePower).await,
        Commands::Color {
            hue,
            saturation,
            brightness,
            kelvin,
            duration,
        } => {
            let args = ColorArgs {
                hue,
                saturation,
                brightness,
                kelvin,
                duration,
                ack_required: true,
            };
            devices.all_do(&Operation::SetColor(args)).await
        }
        Commands::Call { name, args } => {
            let args = serde_json::from_str(&args)?;
            devices.all_call(&name, &args).await?
        }
    };

    for (device, result) in devices.iter().zip(results) {
        match result {
            Ok(Reply::Power(level)) => println!(
                "{device}: {}",
                if level.is_on() { "ON" } else { "OFF" }
            ),
            Ok(reply) => println!("{device}: {reply}"),
            Err(e) => eprintln!("{device}: error: {e}"),
        }
    }

    router.set_receiving(false).await?;
    receiver.await;
    Ok(())
}
