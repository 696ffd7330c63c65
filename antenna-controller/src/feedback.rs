use crate::command::{Axis, Degrees};
use thiserror::Error;

const ERROR_PREFIX: &str = "ERR=";

/// A line emitted by the rotator firmware.
///
/// Feedback lines look like `A=123.4 S=0 M`; everything after the first
/// whitespace is status the bridge does not track.
#[derive(Debug, Clone, PartialEq)]
pub enum SerialLine {
    /// Measured position of one axis.
    Feedback { axis: Axis, degrees: Degrees },
    /// Error reported by the controller, `ERR=` stripped.
    Error(String),
    /// Blank lines and telemetry the bridge does not understand.
    Unparseable,
}

#[derive(Debug, Error, PartialEq)]
pub enum FeedbackError {
    #[error("{axis} feedback `{line}` has a non-numeric position")]
    InvalidPosition { axis: Axis, line: String },
}

impl SerialLine {
    pub fn parse(line: &str) -> Result<Self, FeedbackError> {
        let line = line.trim();

        if let Some(message) = line.strip_prefix(ERROR_PREFIX) {
            return Ok(SerialLine::Error(message.trim().to_string()));
        }

        for axis in [Axis::Azimuth, Axis::Elevation] {
            let Some(payload) = strip_axis_prefix(line, axis) else {
                continue;
            };

            let value = payload.split(char::is_whitespace).next().unwrap_or_default();

            return value
                .parse::<Degrees>()
                .ok()
                .filter(|degrees| degrees.is_finite())
                .map(|degrees| SerialLine::Feedback { axis, degrees })
                .ok_or_else(|| FeedbackError::InvalidPosition {
                    axis,
                    line: line.to_string(),
                });
        }

        Ok(SerialLine::Unparseable)
    }
}

fn strip_axis_prefix(line: &str, axis: Axis) -> Option<&str> {
    line.strip_prefix(axis.letter())?.strip_prefix('=')
}
