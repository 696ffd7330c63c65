use crate::{
    config::Config,
    error::BridgeError,
    position::PositionState,
    reader::FeedbackReader,
    server::BridgeServer,
};
use antenna_controller::{CommandTranslator, serial::SerialAntennaController};
use std::{future::Future, io::Read};
use tokio::{net::TcpListener, select, task::JoinSet};
use tokio_util::sync::CancellationToken;

pub type SerialSource = Box<dyn Read + Send>;

/// The running bridge: one feedback reader per serial line plus the rotctl server.
///
/// Shutdown sequence, started by the `shutdown` future or by the first task
/// that fails:
/// 1. the shared token is cancelled,
/// 2. the server stops accepting and drops its client,
/// 3. readers stop at their next line or read timeout,
/// 4. every task is awaited and the first failure is returned.
pub struct Bridge {
    server: BridgeServer,
    listener: TcpListener,
    readers: Vec<FeedbackReader<SerialSource>>,
    cancel: CancellationToken,
}

impl Bridge {
    pub fn new(
        server: BridgeServer,
        listener: TcpListener,
        readers: Vec<FeedbackReader<SerialSource>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            server,
            listener,
            readers,
            cancel,
        }
    }

    /// Opens the serial lines and the rotctl listener described by `config`.
    pub async fn open(config: &Config) -> Result<Self, BridgeError> {
        let topology = config.serial.channels.topology();
        let position = PositionState::new();
        let cancel = CancellationToken::new();

        let translator = CommandTranslator::new(topology, config.serial.inter_command_delay())
            .settle_split_channels(config.serial.settle_split_channels);

        let mut server = BridgeServer::new(translator, position.clone());
        let mut readers = Vec::new();

        for (channel, port) in config.serial.channels.ports() {
            let controller = SerialAntennaController::new(port, config.serial.baud_rate)?;
            log::info!(
                "[{}] Opened {} at {} baud",
                channel,
                controller.port_name(),
                config.serial.baud_rate
            );

            let source: SerialSource = Box::new(controller.reader()?);
            readers.push(FeedbackReader::new(
                channel,
                topology.axes(channel),
                source,
                position.clone(),
                cancel.clone(),
            ));

            server = server.with_controller(channel, controller);
        }

        // Controllers reset when their port opens.
        tokio::time::sleep(config.serial.startup_delay()).await;

        let address = config.server.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| BridgeError::Bind { address, source })?;

        Ok(Self::new(server, listener, readers, cancel))
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<(), BridgeError> {
        let Self {
            mut server,
            listener,
            readers,
            cancel,
        } = self;

        let mut tasks = JoinSet::new();

        for reader in readers {
            tasks.spawn_blocking(move || reader.run());
        }

        let server_cancel = cancel.clone();
        tasks.spawn(async move { server.run(listener, server_cancel).await });

        let mut fault = None;

        select! {
            _ = shutdown => log::info!("Shutdown requested"),
            Some(joined) = tasks.join_next() => fault = task_fault(joined),
        }

        if let Some(e) = &fault {
            log::error!("Hard fault, operator intervention required: {}", e);
        }

        cancel.cancel();

        while let Some(joined) = tasks.join_next().await {
            if let Some(e) = task_fault(joined) {
                log::error!("Task failed during shutdown: {}", e);
                fault.get_or_insert(e);
            }
        }

        log::info!("Bridge stopped");

        fault.map_or(Ok(()), Err)
    }
}

fn task_fault(
    joined: Result<Result<(), BridgeError>, tokio::task::JoinError>,
) -> Option<BridgeError> {
    match joined {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e),
        Err(e) => Some(BridgeError::Join(e)),
    }
}
