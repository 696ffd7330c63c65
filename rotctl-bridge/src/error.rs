use antenna_controller::{Channel, serial::SerialAntennaControllerError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    SerialOpen(#[from] SerialAntennaControllerError),

    #[error("failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept rotctl client: {0}")]
    Accept(#[source] io::Error),

    #[error("no serial channel configured for {0}")]
    MissingChannel(Channel),

    #[error("failed to write to {channel} serial line: {source}")]
    SerialWrite {
        channel: Channel,
        #[source]
        source: io::Error,
    },

    #[error("failed to read from {channel} serial line: {source}")]
    SerialRead {
        channel: Channel,
        #[source]
        source: io::Error,
    },

    #[error("{0} serial line closed")]
    SerialClosed(Channel),

    #[error("bridge task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
