use antenna_controller::{Axis, command::Degrees};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Last observed rotator position. Never a commanded target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisPosition {
    pub azimuth: Degrees,
    pub elevation: Degrees,
}

impl AxisPosition {
    /// rotctl `p` reply: azimuth then elevation, one decimal each.
    pub fn to_rotctl(&self) -> String {
        format!("{:.1}\n{:.1}\n", self.azimuth, self.elevation)
    }
}

/// Handle on the position shared by the feedback readers and the server.
///
/// Reads and writes go through one lock held only for the field copy, so a
/// reader never sees half of an update.
#[derive(Debug, Clone, Default)]
pub struct PositionState {
    inner: Arc<Mutex<AxisPosition>>,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> AxisPosition {
        *self.lock()
    }

    pub fn write_azimuth(&self, degrees: Degrees) {
        self.lock().azimuth = degrees;
    }

    pub fn write_elevation(&self, degrees: Degrees) {
        self.lock().elevation = degrees;
    }

    pub fn write(&self, axis: Axis, degrees: Degrees) {
        match axis {
            Axis::Azimuth => self.write_azimuth(degrees),
            Axis::Elevation => self.write_elevation(degrees),
        }
    }

    // A poisoned lock still guards a plain pair of floats.
    fn lock(&self) -> MutexGuard<'_, AxisPosition> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
