use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use location_core::core::config::MAX_TIMEOUT_MS;
use location_core::{ApiError, CallErrorKind, ClientConfig, Location, LocationApi};
use tokio::sync::Mutex;
use tonic::transport::Channel;
use tonic::{Code, Request, Response, Status};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::connection::ConnectionManager;
use crate::convert::{locations_from_proto, uuid_to_bytes};
use crate::proto::health::health_check_response::ServingStatus;
use crate::proto::health::health_client::HealthClient;
use crate::proto::health::HealthCheckRequest;
use crate::proto::location::location_service_client::LocationServiceClient;
use crate::proto::location::{self as pb, EmptyLocation, LocationDeleteReq, LocationGetReq};

/// Service name sent with every health check.
pub const HEALTH_SERVICE_NAME: &str = "locationapi";

/// [`LocationApi`] over gRPC.
///
/// Safe to share between tasks (wrap it in an `Arc`). Calls run concurrently
/// except `health_check`, which holds `health_lock` for the whole round trip.
pub struct GrpcLocationApi {
    connection: ConnectionManager,
    timeout: Duration,
    locations: LocationServiceClient<Channel>,
    health: HealthClient<Channel>,
    health_lock: Mutex<()>,
}

impl GrpcLocationApi {
    /// Binds the stubs to an already initialized connection.
    ///
    /// `timeout` is capped at [`MAX_TIMEOUT_MS`]; the grpc-timeout header cannot carry more.
    pub fn new(connection: ConnectionManager, timeout: Duration) -> Self {
        let max = Duration::from_millis(MAX_TIMEOUT_MS);
        if timeout > max {
            warn!(?timeout, ?max, "call timeout too large, capping it");
        }
        let timeout = timeout.min(max);
        Self {
            locations: connection.location_client(),
            health: connection.health_client(),
            connection,
            timeout,
            health_lock: Mutex::new(()),
        }
    }

    pub fn connect(address: &str, timeout: Duration) -> Result<Self, ApiError> {
        let connection = ConnectionManager::initialize(address)?;
        Ok(Self::new(connection, timeout))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        Self::connect(&config.address, config.timeout())
    }

    pub fn address(&self) -> &str {
        self.connection.address()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Tears the connection down. Consumes the client, so nothing can use it afterwards.
    pub fn close(self) -> Result<(), ApiError> {
        let GrpcLocationApi {
            connection,
            locations,
            health,
            ..
        } = self;
        drop(locations);
        drop(health);
        connection.close()
    }

    /// Wraps `message` with the call deadline so the service sees it too.
    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(self.timeout);
        request
    }

    /// Awaits `call` for at most `self.timeout` and maps every failure to `operation`.
    async fn call<T, F>(&self, operation: &'static str, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<Response<T>, Status>>,
    {
        debug!(operation, "calling Location service");
        let started = Instant::now();
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => {
                warn!(operation, code = ?status.code(), detail = status.message(), "call failed");
                let deadline_reached = started.elapsed() >= self.timeout;
                Err(status_error(operation, status, deadline_reached))
            }
            Err(elapsed) => {
                warn!(operation, timeout = ?self.timeout, "call timed out");
                Err(ApiError::remote_call(
                    operation,
                    CallErrorKind::Timeout,
                    elapsed,
                ))
            }
        }
    }
}

/// Classifies a gRPC status and keeps it as the error source.
///
/// The server enforces the same deadline we send it and answers an expired one
/// with CANCELLED, so that counts as a timeout too.
fn status_error(operation: &'static str, status: Status, deadline_reached: bool) -> ApiError {
    let kind = match status.code() {
        _ if deadline_reached => CallErrorKind::Timeout,
        Code::DeadlineExceeded | Code::Cancelled => CallErrorKind::Timeout,
        Code::NotFound => CallErrorKind::NotFound,
        Code::Unavailable => CallErrorKind::Unavailable,
        _ => CallErrorKind::Other,
    };
    ApiError::remote_call(operation, kind, status)
}

#[async_trait]
impl LocationApi for GrpcLocationApi {
    async fn create_or_update_location(&self, location: &Location) -> Result<(), ApiError> {
        let mut client = self.locations.clone();
        self.call(
            "CreateOrUpdateLocation",
            client.create_or_update_location(self.request(pb::Location::from(location))),
        )
        .await?;
        Ok(())
    }

    async fn update_location(&self, location: &Location) -> Result<(), ApiError> {
        let mut client = self.locations.clone();
        self.call(
            "UpdateLocation",
            client.update_location(self.request(pb::Location::from(location))),
        )
        .await?;
        Ok(())
    }

    async fn delete_location(&self, location_uuid: Uuid) -> Result<(), ApiError> {
        let mut client = self.locations.clone();
        let req = LocationDeleteReq {
            location_uuid: uuid_to_bytes(location_uuid),
        };
        self.call("DeleteLocation", client.delete_location(self.request(req)))
            .await?;
        Ok(())
    }

    async fn location_by_uuid(&self, location_uuid: Uuid) -> Result<Location, ApiError> {
        let mut client = self.locations.clone();
        let req = LocationGetReq {
            location_uuid: uuid_to_bytes(location_uuid),
        };
        let location = self
            .call("LocationByUuid", client.location_by_uuid(self.request(req)))
            .await?;
        Ok(location.into())
    }

    async fn get_all_locations(&self) -> Result<Vec<Location>, ApiError> {
        let mut client = self.locations.clone();
        let all = self
            .call(
                "GetAllLocations",
                client.get_all_locations(self.request(EmptyLocation {})),
            )
            .await?;
        Ok(locations_from_proto(all))
    }

    async fn health_check(&self) -> Result<(), ApiError> {
        // Waiting for the lock counts against the deadline.
        let check = async {
            let _guard = self.health_lock.lock().await;
            let mut client = self.health.clone();
            client
                .check(self.request(HealthCheckRequest {
                    service: HEALTH_SERVICE_NAME.to_string(),
                }))
                .await
        };
        let response = self.call("HealthCheck", check).await?;

        if response.status() != ServingStatus::Serving {
            warn!(status = ?response.status(), "Location service reports not serving");
            return Err(ApiError::Unhealthy);
        }
        Ok(())
    }
}
