//! Bridge between a rotctl client (Gpredict and friends) and the serial
//! controllers of an azimuth/elevation rotator.

pub mod bridge;
pub mod config;
pub mod error;
pub mod line;
pub mod position;
pub mod protocol;
pub mod reader;
pub mod server;

pub use bridge::Bridge;
pub use config::Config;
pub use error::BridgeError;
pub use position::{AxisPosition, PositionState};
pub use protocol::RotctlRequest;
pub use reader::FeedbackReader;
pub use server::BridgeServer;
