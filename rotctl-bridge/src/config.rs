use antenna_controller::{Channel, Topology};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub serial: SerialConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub inter_command_delay_ms: u64,
    /// Also pause between writes that go to different lines.
    pub settle_split_channels: bool,
    /// Time given to the controllers to boot after their ports are opened.
    pub startup_delay_ms: u64,
    pub channels: ChannelsConfig,
}

/// Which serial ports carry which axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ChannelsConfig {
    Shared { port: String },
    Split { azimuth: String, elevation: String },
    AzimuthOnly { port: String },
}

impl Config {
    /// Load configuration from a TOML file, overridden by `ROTCTL__*` environment variables.
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("ROTCTL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Builder pre-populated with every default except the serial ports.
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("server.host", "localhost")?
            .set_default("server.port", 4533)?
            .set_default("serial.baud_rate", 9600)?
            .set_default("serial.inter_command_delay_ms", 500)?
            .set_default("serial.settle_split_channels", false)?
            .set_default("serial.startup_delay_ms", 2000)
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SerialConfig {
    pub fn inter_command_delay(&self) -> Duration {
        Duration::from_millis(self.inter_command_delay_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

impl ChannelsConfig {
    pub fn topology(&self) -> Topology {
        match self {
            ChannelsConfig::Shared { .. } => Topology::Shared,
            ChannelsConfig::Split { .. } => Topology::Split,
            ChannelsConfig::AzimuthOnly { .. } => Topology::AzimuthOnly,
        }
    }

    /// Port name for every channel of the topology.
    pub fn ports(&self) -> Vec<(Channel, &str)> {
        match self {
            ChannelsConfig::Shared { port } => vec![(Channel::Shared, port.as_str())],
            ChannelsConfig::Split {
                azimuth,
                elevation,
            } => vec![
                (Channel::Azimuth, azimuth.as_str()),
                (Channel::Elevation, elevation.as_str()),
            ],
            ChannelsConfig::AzimuthOnly { port } => vec![(Channel::Azimuth, port.as_str())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Config, config::ConfigError> {
        Config::builder()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_apply() {
        let config = parse(
            r#"
            [serial.channels]
            mode = "shared"
            port = "/dev/ttyACM0"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.address(), "localhost:4533");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.inter_command_delay(), Duration::from_millis(500));
        assert_eq!(config.serial.startup_delay(), Duration::from_secs(2));
        assert!(!config.serial.settle_split_channels);
        assert_eq!(config.serial.channels.topology(), Topology::Shared);
        assert_eq!(
            config.serial.channels.ports(),
            vec![(Channel::Shared, "/dev/ttyACM0")]
        );
    }

    #[test]
    fn test_split_channels() {
        let config = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 4534

            [serial]
            baud_rate = 19200
            inter_command_delay_ms = 250
            settle_split_channels = true

            [serial.channels]
            mode = "split"
            azimuth = "COM3"
            elevation = "COM4"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.address(), "0.0.0.0:4534");
        assert_eq!(config.serial.baud_rate, 19200);
        assert_eq!(config.serial.inter_command_delay(), Duration::from_millis(250));
        assert!(config.serial.settle_split_channels);
        assert_eq!(config.serial.channels.topology(), Topology::Split);
        assert_eq!(
            config.serial.channels.ports(),
            vec![(Channel::Azimuth, "COM3"), (Channel::Elevation, "COM4")]
        );
    }

    #[test]
    fn test_azimuth_only_channel() {
        let config = parse(
            r#"
            [serial.channels]
            mode = "azimuth-only"
            port = "COM3"
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.channels.topology(), Topology::AzimuthOnly);
        assert_eq!(config.serial.channels.ports(), vec![(Channel::Azimuth, "COM3")]);
    }

    #[test]
    fn test_missing_ports_is_an_error() {
        assert!(parse("").is_err());
        assert!(
            parse(
                r#"
                [serial.channels]
                mode = "split"
                azimuth = "COM3"
                "#
            )
            .is_err()
        );
    }
}
