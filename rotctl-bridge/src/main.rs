use clap::Parser;
use rotctl_bridge::{Bridge, BridgeError, Config};

/// rotctl to serial rotator bridge
#[derive(Parser, Debug)]
#[command(version, about = "Serves rotctl clients from serial rotator controllers", long_about = None)]
struct Args {
    /// Configuration file, extension optional
    #[arg(short, long, default_value = "config")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), BridgeError> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();

    let config = Config::load(&args.config).unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {}", err);
        eprintln!("Please create a config.toml file in the current directory.");
        eprintln!("See rotctl-bridge/config.toml for the required format.");
        std::process::exit(1);
    });

    log::info!("Loaded configuration:");
    log::info!("  rotctl: {}", config.server.address());
    log::info!(
        "  Serial: {:?} at {} baud, {:?} between commands",
        config.serial.channels,
        config.serial.baud_rate,
        config.serial.inter_command_delay()
    );

    let bridge = Bridge::open(&config).await?;

    bridge.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
