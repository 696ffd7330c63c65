use antenna_controller::{Axis, Channel, CommandTranslator, Topology, mock::MockController};
use rotctl_bridge::{BridgeError, BridgeServer, FeedbackReader, PositionState};
use std::{io::Cursor, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
    time::{Instant, timeout},
};
use tokio_util::sync::CancellationToken;

const DELAY: Duration = Duration::from_millis(50);

struct Client {
    stream: BufReader<TcpStream>,
}

impl Client {
    async fn connect(address: std::net::SocketAddr) -> Self {
        Self {
            stream: BufReader::new(TcpStream::connect(address).await.unwrap()),
        }
    }

    async fn send(&mut self, line: &str) {
        self.stream
            .get_mut()
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }

    async fn reply(&mut self) -> String {
        let mut reply = String::new();
        self.stream.read_line(&mut reply).await.unwrap();
        self.stream.read_line(&mut reply).await.unwrap();
        reply
    }

    async fn request(&mut self, line: &str) -> String {
        self.send(line).await;
        self.reply().await
    }
}

async fn start_server(
    mock: &MockController,
) -> (
    std::net::SocketAddr,
    PositionState,
    CancellationToken,
    JoinHandle<Result<(), BridgeError>>,
) {
    let position = PositionState::new();
    let cancel = CancellationToken::new();

    let mut server = BridgeServer::new(CommandTranslator::new(Topology::Shared, DELAY), position.clone())
        .with_controller(Channel::Shared, mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let server_cancel = cancel.clone();
    let handle = tokio::spawn(async move { server.run(listener, server_cancel).await });

    (address, position, cancel, handle)
}

/// Feeds serial input to a reader until the input runs out.
async fn replay_feedback(position: &PositionState, feedback: &'static str) {
    let reader = FeedbackReader::new(
        Channel::Shared,
        &[Axis::Azimuth, Axis::Elevation],
        Cursor::new(feedback.as_bytes()),
        position.clone(),
        CancellationToken::new(),
    );

    let result = tokio::task::spawn_blocking(move || reader.run()).await.unwrap();

    assert!(matches!(result, Err(BridgeError::SerialClosed(Channel::Shared))));
}

#[tokio::test]
async fn tracking_session() {
    let mock = MockController::new();
    let (address, position, cancel, handle) = start_server(&mock).await;

    let mut client = Client::connect(address).await;

    assert_eq!(client.request("p").await, "0.0\n0.0\n");

    let start = Instant::now();
    assert_eq!(client.request("P 45.0 30.0").await, "0.0\n0.0\n");
    assert!(start.elapsed() >= DELAY);
    assert_eq!(mock.wire(), ["A45.0\r", "E30.0\r"]);

    replay_feedback(&position, "A=45.0 S=0 M\nE=30.0 S=0 M\n").await;

    assert_eq!(client.request("p").await, "45.0\n30.0\n");

    client.send("P 10").await;
    assert_eq!(client.request("p").await, "45.0\n30.0\n");
    assert_eq!(mock.sent().len(), 2);

    client.send("S").await;

    let mut rest = Vec::new();
    client.stream.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());

    cancel.cancel();
    assert!(handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn one_client_at_a_time() {
    let mock = MockController::new();
    let (address, position, cancel, handle) = start_server(&mock).await;

    position.write_azimuth(123.4);

    let mut first = Client::connect(address).await;
    assert_eq!(first.request("p").await, "123.4\n0.0\n");

    // Queued in the backlog until the first client leaves.
    let mut second = Client::connect(address).await;
    second.send("p").await;
    assert!(timeout(Duration::from_millis(100), second.reply()).await.is_err());

    first.send("q").await;

    assert_eq!(second.reply().await, "123.4\n0.0\n");
    assert_eq!(second.request("P 1,5 2,5").await, "123.4\n0.0\n");
    assert_eq!(mock.wire(), ["A1.5\r", "E2.5\r"]);

    cancel.cancel();
    assert!(handle.await.unwrap().is_ok());
}
