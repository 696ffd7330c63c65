use crate::{
    error::BridgeError,
    line::{LineBuffer, MAX_LINE_LEN},
    position::PositionState,
};
use antenna_controller::{Axis, Channel, FeedbackError, SerialLine};
use std::io::{self, BufRead, BufReader, Read};
use tokio_util::sync::CancellationToken;

/// Follows the feedback of one serial line and publishes it into the shared position.
///
/// Blocking: run it on a dedicated thread. The line's read timeout only wakes
/// the loop so it can notice cancellation. End of stream or any other read
/// error ends the reader with an error.
pub struct FeedbackReader<R> {
    channel: Channel,
    axes: &'static [Axis],
    source: BufReader<R>,
    position: PositionState,
    cancel: CancellationToken,
}

impl<R: Read> FeedbackReader<R> {
    pub fn new(
        channel: Channel,
        axes: &'static [Axis],
        source: R,
        position: PositionState,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            channel,
            axes,
            source: BufReader::new(source),
            position,
            cancel,
        }
    }

    pub fn run(mut self) -> Result<(), BridgeError> {
        log::info!("[{}] Following feedback for {:?}", self.channel, self.axes);

        // Kept across timeouts so a line split by one is not lost.
        let mut line = LineBuffer::default();

        loop {
            if self.cancel.is_cancelled() {
                log::info!("[{}] Feedback reader stopped", self.channel);
                return Ok(());
            }

            let available = match self.source.fill_buf() {
                Ok(available) => available,
                Err(e) if is_idle(&e) => continue,
                Err(source) => {
                    return Err(BridgeError::SerialRead {
                        channel: self.channel,
                        source,
                    });
                }
            };

            if available.is_empty() {
                if !line.is_empty() {
                    self.finish(&mut line);
                }
                return Err(BridgeError::SerialClosed(self.channel));
            }

            let (used, complete) = line.push(available);
            self.source.consume(used);

            if complete {
                self.finish(&mut line);
            }
        }
    }

    fn finish(&self, line: &mut LineBuffer) {
        match line.take() {
            Some(text) => self.handle(&text),
            None => log::warn!(
                "[{}] Dropped line longer than {} bytes",
                self.channel,
                MAX_LINE_LEN
            ),
        }
    }

    fn handle(&self, line: &str) {
        match SerialLine::parse(line) {
            Ok(SerialLine::Feedback { axis, degrees }) if self.axes.contains(&axis) => {
                self.position.write(axis, degrees);
                log::debug!("[{}] Feedback: {}", self.channel, line.trim());
            }
            Ok(SerialLine::Error(message)) => {
                log::error!("[{}] Controller error: {}", self.channel, message);
            }
            Err(e @ FeedbackError::InvalidPosition { axis, .. }) if self.axes.contains(&axis) => {
                log::warn!("[{}] Dropped feedback: {}", self.channel, e);
            }
            _ => {}
        }
    }
}

fn is_idle(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
