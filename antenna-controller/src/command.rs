use std::{fmt, time::Duration};
use thiserror::Error;

pub type Degrees = f64;

/// One independent degree of motion of the rotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Azimuth,
    Elevation,
}

impl Axis {
    /// Letter used by the controller both for commands (`A45.0\r`) and feedback (`A=45.0`).
    pub fn letter(self) -> char {
        match self {
            Axis::Azimuth => 'A',
            Axis::Elevation => 'E',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Azimuth => write!(f, "azimuth"),
            Axis::Elevation => write!(f, "elevation"),
        }
    }
}

/// A framed move command for a single axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireCommand {
    pub axis: Axis,
    pub degrees: Degrees,
}

impl WireCommand {
    pub fn new(axis: Axis, degrees: Degrees) -> Self {
        Self { axis, degrees }
    }
}

impl fmt::Display for WireCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.1}\r", self.axis.letter(), self.degrees)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid degree value `{0}`")]
pub struct InvalidDegrees(pub String);

/// Parses a degree value, accepting either `.` or `,` as the decimal separator.
pub fn parse_degrees(raw: &str) -> Result<Degrees, InvalidDegrees> {
    raw.trim()
        .replace(',', ".")
        .parse::<Degrees>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InvalidDegrees(raw.to_string()))
}

/// A physical serial line, named by what it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Single line carrying both axes.
    Shared,
    Azimuth,
    Elevation,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Shared => write!(f, "shared"),
            Channel::Azimuth => write!(f, "azimuth"),
            Channel::Elevation => write!(f, "elevation"),
        }
    }
}

/// How the rotator axes are wired to serial lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Both axes on one line.
    Shared,
    /// One line per axis.
    Split,
    /// Azimuth-only rotator on a single line.
    AzimuthOnly,
}

impl Topology {
    /// Channels that exist in this topology.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            Topology::Shared => &[Channel::Shared],
            Topology::Split => &[Channel::Azimuth, Channel::Elevation],
            Topology::AzimuthOnly => &[Channel::Azimuth],
        }
    }

    /// Axes whose feedback and commands travel over `channel`.
    pub fn axes(self, channel: Channel) -> &'static [Axis] {
        match (self, channel) {
            (Topology::Shared, Channel::Shared) => &[Axis::Azimuth, Axis::Elevation],
            (Topology::Split | Topology::AzimuthOnly, Channel::Azimuth) => &[Axis::Azimuth],
            (Topology::Split, Channel::Elevation) => &[Axis::Elevation],
            _ => &[],
        }
    }

    /// Channel that carries `axis`, if the rotator has that axis at all.
    pub fn channel_for(self, axis: Axis) -> Option<Channel> {
        self.channels()
            .iter()
            .copied()
            .find(|channel| self.axes(*channel).contains(&axis))
    }
}

/// One serial write produced by the translator.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub channel: Channel,
    pub command: WireCommand,
    /// Time to wait before issuing this command.
    pub delay_before: Duration,
}

/// Maps a target position onto the serial writes that realise it.
///
/// Consecutive writes on a shared line are separated by `inter_command_delay`;
/// issuing them back to back corrupts the controller's parser. Independent
/// lines get the same delay only when `settle_split_channels` is set.
#[derive(Debug, Clone)]
pub struct CommandTranslator {
    topology: Topology,
    inter_command_delay: Duration,
    settle_split_channels: bool,
}

impl CommandTranslator {
    pub fn new(topology: Topology, inter_command_delay: Duration) -> Self {
        Self {
            topology,
            inter_command_delay,
            settle_split_channels: false,
        }
    }

    pub fn settle_split_channels(mut self, settle: bool) -> Self {
        self.settle_split_channels = settle;
        self
    }

    /// Produces the ordered writes for a move to (`azimuth`, `elevation`).
    ///
    /// Azimuth always goes first. Axes the rotator does not have are skipped.
    pub fn translate(&self, azimuth: Degrees, elevation: Degrees) -> Vec<Step> {
        let targets = [
            WireCommand::new(Axis::Azimuth, azimuth),
            WireCommand::new(Axis::Elevation, elevation),
        ];

        let mut steps: Vec<Step> = Vec::with_capacity(targets.len());

        for command in targets {
            let Some(channel) = self.topology.channel_for(command.axis) else {
                continue;
            };

            let delay_before = match steps.last() {
                Some(_) if self.needs_settling() => self.inter_command_delay,
                _ => Duration::ZERO,
            };

            steps.push(Step {
                channel,
                command,
                delay_before,
            });
        }

        steps
    }

    fn needs_settling(&self) -> bool {
        match self.topology {
            Topology::Shared | Topology::AzimuthOnly => true,
            Topology::Split => self.settle_split_channels,
        }
    }
}
