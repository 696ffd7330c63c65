pub mod command;
pub mod feedback;
pub mod mock;
pub mod serial;

pub use command::{Axis, Channel, CommandTranslator, Step, Topology, WireCommand, parse_degrees};
pub use feedback::{FeedbackError, SerialLine};

use std::io;

pub trait AntennaController: Send {
    /// Writes one framed command to the rotator.
    fn send(&mut self, command: &WireCommand) -> io::Result<()>;
}
