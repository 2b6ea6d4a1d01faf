//! The single long-lived channel to the Location service.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use hyper_util::rt::TokioIo;
use location_core::ApiError;
use tokio::net::TcpStream;
use tonic::transport::{Channel, Endpoint, Uri};
use tower::Service;
use tracing::{debug, info, warn};

use crate::proto::health::health_client::HealthClient;
use crate::proto::location::location_service_client::LocationServiceClient;

/// Delay between consecutive failed dials: `base * multiplier^attempt`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            multiplier: 1.2,
            max_delay: Duration::from_secs(1),
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `attempt` (0 = first retry).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Keep-alive and reconnect settings for the channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionOptions {
    /// Ping the peer after this much idle time.
    pub keep_alive_interval: Duration,
    /// Consider the connection dead if a ping is not acknowledged in time.
    pub keep_alive_timeout: Duration,
    /// Keep pinging even with no call in flight.
    pub keep_alive_while_idle: bool,
    pub backoff: BackoffConfig,
    /// Upper bound for a single dial attempt.
    pub min_connect_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            keep_alive_interval: Duration::from_secs(5),
            keep_alive_timeout: Duration::from_secs(1),
            keep_alive_while_idle: true,
            backoff: BackoffConfig::default(),
            min_connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Owns the one channel every stub is bound to.
///
/// The channel is lazy: `initialize` only validates the address and wires up
/// the transport, the first call performs the actual dial. Cloning shares the
/// same underlying connection.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    address: String,
    channel: Channel,
}

impl ConnectionManager {
    /// Connect with the default keep-alive and backoff settings.
    pub fn initialize(address: &str) -> Result<Self, ApiError> {
        Self::initialize_with(address, ConnectionOptions::default())
    }

    /// Connect to `address` (`host:port` or `http://host:port`), plaintext.
    pub fn initialize_with(address: &str, options: ConnectionOptions) -> Result<Self, ApiError> {
        let address = normalize_address(address);
        let endpoint = Endpoint::from_shared(address.clone())
            .map_err(|e| ApiError::connection_setup(address.clone(), format!("failed to dial: {e}")))?
            .http2_keep_alive_interval(options.keep_alive_interval)
            .keep_alive_timeout(options.keep_alive_timeout)
            .keep_alive_while_idle(options.keep_alive_while_idle);

        if endpoint.uri().host().is_none() {
            return Err(ApiError::connection_setup(
                address,
                "failed to dial: address has no host",
            ));
        }

        // The lazy channel spawns its worker on the current runtime.
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(ApiError::connection_setup(
                address,
                "failed to dial: no tokio runtime is running",
            ));
        }

        let channel = endpoint.connect_with_connector_lazy(BackoffConnector::new(&options));
        info!(%address, "Location service channel initialized");
        Ok(Self { address, channel })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn location_client(&self) -> LocationServiceClient<Channel> {
        LocationServiceClient::new(self.channel.clone())
    }

    pub fn health_client(&self) -> HealthClient<Channel> {
        HealthClient::new(self.channel.clone())
    }

    /// Releases the channel. Stubs handed out earlier keep their own clone
    /// alive until they are dropped.
    pub fn close(self) -> Result<(), ApiError> {
        info!(address = %self.address, "closing Location service channel");
        drop(self.channel);
        Ok(())
    }
}

fn normalize_address(address: &str) -> String {
    let address = address.trim();
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

/// Plain TCP dialer that waits out the backoff delay after failed dials.
#[derive(Debug, Clone)]
struct BackoffConnector {
    backoff: BackoffConfig,
    connect_timeout: Duration,
    failures: Arc<AtomicU32>,
}

impl BackoffConnector {
    fn new(options: &ConnectionOptions) -> Self {
        Self {
            backoff: options.backoff,
            connect_timeout: options.min_connect_timeout,
            failures: Arc::new(AtomicU32::new(0)),
        }
    }

    async fn dial(self, uri: Uri) -> io::Result<TokioIo<TcpStream>> {
        let failures = self.failures.load(Ordering::Relaxed);
        if failures > 0 {
            let delay = self.backoff.delay(failures - 1);
            debug!(%uri, failures, ?delay, "backing off before redial");
            tokio::time::sleep(delay).await;
        }

        let host = uri
            .host()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "uri has no host"))?;
        let port = uri.port_u16().unwrap_or(80);

        match tokio::time::timeout(self.connect_timeout, TcpStream::connect((host.as_str(), port)))
            .await
        {
            Ok(Ok(stream)) => {
                stream.set_nodelay(true)?;
                self.failures.store(0, Ordering::Relaxed);
                debug!(%uri, "connected");
                Ok(TokioIo::new(stream))
            }
            Ok(Err(e)) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(%uri, error = %e, "dial failed");
                Err(e)
            }
            Err(_) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(%uri, timeout = ?self.connect_timeout, "dial timed out");
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {uri} timed out"),
                ))
            }
        }
    }
}

impl Service<Uri> for BackoffConnector {
    type Response = TokioIo<TcpStream>;
    type Error = io::Error;
    type Future = Pin<Box<dyn Future<Output = io::Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        Box::pin(self.clone().dial(uri))
    }
}
