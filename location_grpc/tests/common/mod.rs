#![allow(dead_code)]

pub mod fake_location_service;

use std::net::SocketAddr;
use std::time::Duration;

use location_core::{Location, Uuid};
use location_grpc::proto::health::health_server::HealthServer;
use location_grpc::proto::location::location_service_server::LocationServiceServer;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use fake_location_service::{FakeHealthService, FakeLocationService};

/// Route client-side tracing into the test harness output.
/// Logs will appear only with `-- --nocapture` or when the test fails.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A fake Location service listening on an ephemeral localhost port.
///
/// The server stops when this handle is dropped.
pub struct FakeRemote {
    pub addr: SocketAddr,
    pub locations: FakeLocationService,
    pub health: FakeHealthService,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeRemote {
    pub async fn start(locations: FakeLocationService, health: FakeHealthService) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let location_server = LocationServiceServer::new(locations.clone());
        let health_server = HealthServer::new(health.clone());
        tokio::spawn(async move {
            Server::builder()
                .add_service(location_server)
                .add_service(health_server)
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("fake server crashed");
        });

        Self {
            addr,
            locations,
            health,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Empty store, health SERVING.
    pub async fn empty() -> Self {
        Self::start(FakeLocationService::new(), FakeHealthService::serving()).await
    }

    /// `host:port` string accepted by the client.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }
}

impl Drop for FakeRemote {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub const CALL_TIMEOUT: Duration = Duration::from_secs(2);

pub fn paris_bistro(location_uuid: Uuid) -> Location {
    Location::new(
        location_uuid,
        "Paris Bistro",
        "FR",
        vec!["fr".into(), "en".into()],
        "EUR",
        "Paris",
    )
}
