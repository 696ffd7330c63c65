use crate::{AntennaController, command::WireCommand};
use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
};

/// Records every command instead of writing it to a port.
///
/// Clones share the same log, so a test can keep one clone and hand the other
/// to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockController {
    sent: Arc<Mutex<Vec<WireCommand>>>,
    fail: bool,
}

impl MockController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller whose every write fails, as an unplugged port would.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<WireCommand> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The bytes that would have gone over the wire.
    pub fn wire(&self) -> Vec<String> {
        self.sent().iter().map(ToString::to_string).collect()
    }
}

impl AntennaController for MockController {
    fn send(&mut self, command: &WireCommand) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock port disconnected",
            ));
        }

        log::debug!("[MOCK] {}", command.to_string().trim_end());

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*command);

        Ok(())
    }
}
