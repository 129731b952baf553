//! Demonstration driver for the sensor registry.
//!
//! Registers a set of sensors (from a configuration file, or a built-in
//! scenario exercising each construction path and each kind of rejection),
//! then lists, reads and looks them up.

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::filter::LevelFilter;

use sensor_registry::tracing::{self, prelude::*};
use sensor_registry::{
    dispatch_value, AddError, Config, InterfaceKind, Registry, RegistrySettings, SensorBuilder,
};

#[derive(Debug, Parser)]
#[command(name = "sensor-registry-demo", about = "Register, list and read mock sensors")]
struct Args {
    /// JSON configuration file. Without it, SENSOR_REGISTRY_CONFIG is
    /// consulted; when neither lists any sensors the built-in scenario runs
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Reject sensors whose alias is already registered
    #[arg(long)]
    unique_aliases: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing::init_journald_or_stdout(if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    });

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.registry.unique_aliases |= args.unique_aliases;

    let (registry, outcomes) = if config.sensors.is_empty() {
        scenario(config.registry)
    } else {
        Registry::from_config(&config)
    };
    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    info!(
        added = outcomes.len() - failed,
        failed,
        "Sensor registration finished."
    );
    for error in outcomes.iter().filter_map(|o| o.as_ref().err()) {
        println!("Rejected: {}", error);
    }
    println!();

    println!("{}", registry.describe_all());
    println!();
    println!("{}", registry.read_report());
    println!();

    println!("Sensor data from generator:");
    println!("===========================");
    for (alias, reading) in registry.read_all() {
        println!("Sensor named '{}' value: {:?}", alias, reading);
    }

    for kind in [InterfaceKind::I2c, InterfaceKind::Spi, InterfaceKind::Uart] {
        info!(kind = %kind, count = registry.find_by_kind(kind).len(), "Sensors by kind");
    }

    for alias in ["sensor2D", "nonexistent"] {
        match registry.find_by_alias(alias) {
            Some(sensor) => println!("Sensor by alias '{}' found!\n{}", alias, sensor.describe()),
            None => println!("No sensor by alias '{}' found!", alias),
        }
    }

    // A readout relayed in a shape no driver produces
    if let Err(e) = dispatch_value(&json!({"status": "ok"})) {
        println!("{}", e);
    }

    info!("Exiting.");
    Ok(())
}

// Replays every construction path, including the rejected ones, and hands
// back each add's outcome alongside the registry.
fn scenario(settings: RegistrySettings) -> (Registry, Vec<Result<(), AddError>>) {
    let mut registry = Registry::new().with_settings(settings);
    let mut outcomes = Vec::new();

    let tuples = [
        json!(["i2c", 2, 78, "BM280", "RHT-sensor1"]),
        json!(["spi", 1, 3, "SHT721", "RHT-sensor2A"]),
        json!(["spi", 1, 8, "SHT721", "RHT-sensor2B"]),
        json!(["uart", 4, 115200, "CustomHygrometerSubmodule", "RHT-sensor3"]),
    ];
    for tuple in &tuples {
        if let Some(values) = tuple.as_array() {
            outcomes.push(registry.add_positional(values));
        }
    }

    let specs = [
        r#"{"sensor_type": "uart", "bus_no": 4, "baud_rate": 38400, "dev_name": "CustomHygrometerSubmodule", "alias": "RHT-sensor4"}"#,
        r#"{"sensor_type": "spi", "bus_no": 1, "cs_no": 3, "clk_speed": 5000000, "dev_name": "MPU6050", "alias": "IMU-A1"}"#,
        r#"{"sensor_type": "spi", "bus_no": 1, "cs_no": 4, "clk_speed": 5000000, "dev_name": "MPU6050", "alias": "IMU-A2"}"#,
        r#"{"sensor_type": "i2c", "bus_no": 2, "i2c_addr": 78, "clk_speed": 100000, "dev_name": "BM281", "alias": "sensor2C"}"#,
        // Fails the base schema check: no bus_no
        r#"{"sensor_type": "i2c", "i2c_addr": 77, "clk_speed": 100000, "dev_name": "BM281", "alias": "sensor2E"}"#,
        // Fails the device schema check: no i2c_addr
        r#"{"sensor_type": "i2c", "bus_no": 2, "clk_speed": 100000, "dev_name": "BM281", "alias": "sensor2F"}"#,
    ];
    for spec in specs {
        outcomes.push(registry.add_json(spec));
    }

    outcomes.push(
        registry.add_built(
            SensorBuilder::new(InterfaceKind::I2c)
                .bus(2)
                .address(77)
                .device_name("BM281")
                .alias("sensor2D")
                .extension("clk_speed", 100_000),
        ),
    );

    (registry, outcomes)
}
