use crate::{
    error::BridgeError,
    line::{LineBuffer, MAX_LINE_LEN},
    position::PositionState,
    protocol::RotctlRequest,
};
use antenna_controller::{AntennaController, Channel, CommandTranslator, command::Degrees};
use std::{collections::HashMap, io};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpListener,
    select,
};
use tokio_util::sync::CancellationToken;

/// Serves rotctl clients, one at a time, against the shared position.
///
/// Replies always carry the observed position at reply time. A `P` reply does
/// not wait for the rotator to report the new position.
pub struct BridgeServer {
    translator: CommandTranslator,
    controllers: HashMap<Channel, Box<dyn AntennaController>>,
    position: PositionState,
}

impl BridgeServer {
    pub fn new(translator: CommandTranslator, position: PositionState) -> Self {
        Self {
            translator,
            controllers: HashMap::new(),
            position,
        }
    }

    /// Routes writes for `channel` to `controller`.
    pub fn with_controller(
        mut self,
        channel: Channel,
        controller: impl AntennaController + 'static,
    ) -> Self {
        self.controllers.insert(channel, Box::new(controller));
        self
    }

    /// Accepts clients until `cancel` fires. A new client is only accepted
    /// once the previous one has disconnected.
    pub async fn run(
        &mut self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<(), BridgeError> {
        if let Ok(address) = listener.local_addr() {
            log::info!("[SERVER] Waiting for rotctl client on {}", address);
        }

        loop {
            let (stream, peer) = select! {
                _ = cancel.cancelled() => {
                    log::info!("[SERVER] Stopped accepting clients");
                    return Ok(());
                }
                accepted = listener.accept() => accepted.map_err(BridgeError::Accept)?,
            };

            log::info!("[SERVER] Connected to {}", peer);
            self.serve(stream, &cancel).await?;
            log::info!("[SERVER] Connection with {} closed", peer);
        }
    }

    /// Handles one client until it quits, disconnects, or `cancel` fires.
    ///
    /// Client-side I/O failures only end the connection. Serial write failures
    /// are returned.
    pub async fn serve<S>(&mut self, stream: S, cancel: &CancellationToken) -> Result<(), BridgeError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);
        let mut buffer = LineBuffer::default();

        loop {
            let read = select! {
                _ = cancel.cancelled() => return Ok(()),
                read = read_line(&mut reader, &mut buffer) => read,
            };

            match read {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => {
                    log::warn!("[SERVER] Failed to read from client: {}", e);
                    return Ok(());
                }
            }

            let Some(line) = buffer.take() else {
                log::debug!("[SERVER] Ignored line longer than {} bytes", MAX_LINE_LEN);
                continue;
            };

            log::debug!("[SERVER] Command received: {}", line.trim());

            match RotctlRequest::parse(&line) {
                RotctlRequest::GetPosition => {}
                RotctlRequest::SetPosition { azimuth, elevation } => {
                    self.move_to(azimuth, elevation).await?;
                }
                RotctlRequest::Terminate => return Ok(()),
                RotctlRequest::Malformed => {
                    log::debug!("[SERVER] Ignored: {:?}", line.trim());
                    continue;
                }
            }

            let reply = self.position.read().to_rotctl();

            if let Err(e) = writer.write_all(reply.as_bytes()).await {
                log::warn!("[SERVER] Failed to reply to client: {}", e);
                return Ok(());
            }
        }
    }

    async fn move_to(&mut self, azimuth: Degrees, elevation: Degrees) -> Result<(), BridgeError> {
        for step in self.translator.translate(azimuth, elevation) {
            if !step.delay_before.is_zero() {
                tokio::time::sleep(step.delay_before).await;
            }

            let mut controller = self
                .controllers
                .remove(&step.channel)
                .ok_or(BridgeError::MissingChannel(step.channel))?;

            // Serial writes block for up to the port timeout.
            let command = step.command;
            let (controller, sent) = tokio::task::spawn_blocking(move || {
                let sent = controller.send(&command);
                (controller, sent)
            })
            .await?;

            self.controllers.insert(step.channel, controller);

            sent.map_err(|source| BridgeError::SerialWrite {
                channel: step.channel,
                source,
            })?;

            log::info!(
                "[{}] Command sent: {}",
                step.channel,
                step.command.to_string().trim_end()
            );
        }

        Ok(())
    }
}

/// Fills `line` with the next client line. `Ok(false)` means the client hung up.
async fn read_line<R>(reader: &mut R, line: &mut LineBuffer) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;

        if available.is_empty() {
            return Ok(!line.is_empty());
        }

        let (used, complete) = line.push(available);
        reader.consume(used);

        if complete {
            return Ok(true);
        }
    }
}
