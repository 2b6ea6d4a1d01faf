//! Deterministic **in‑process stand‑ins** for the remote Location and Health
//! services.
//!
//! *  **From the test’s perspective**
//!    * Seed records with `FakeLocationService::seed(..)` and inspect the
//!      store afterwards with `snapshot()`.
//!    * Flip the reported health with `FakeHealthService::set_status(..)` and
//!      read back every recorded `Check` call with `calls()`.
//!
//! Both are `Clone`; clones share state, so the test keeps one copy while the
//! tonic server owns the other.

use std::sync::Arc;
use std::time::{Duration, Instant};

use location_grpc::proto::health::health_check_response::ServingStatus;
use location_grpc::proto::health::health_server::Health;
use location_grpc::proto::health::{HealthCheckRequest, HealthCheckResponse};
use location_grpc::proto::location::location_service_server::LocationService;
use location_grpc::proto::location::{
    AllLocations, EmptyLocation, Location, LocationDeleteReq, LocationGetReq,
};
use tokio::sync::Mutex;
use tonic::{Request, Response, Status};

#[derive(Clone, Default)]
pub struct FakeLocationService {
    /// Insertion order is the order `GetAllLocations` returns.
    store: Arc<Mutex<Vec<Location>>>,
    /// Every call sleeps this long before answering.
    delay: Option<Duration>,
}

impl FakeLocationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service that never answers within `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn seed(&self, location: Location) {
        self.store.lock().await.push(location);
    }

    pub async fn snapshot(&self) -> Vec<Location> {
        self.store.lock().await.clone()
    }

    async fn stall(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[tonic::async_trait]
impl LocationService for FakeLocationService {
    async fn create_or_update_location(
        &self,
        req: Request<Location>,
    ) -> Result<Response<EmptyLocation>, Status> {
        self.stall().await;
        let location = req.into_inner();
        let mut store = self.store.lock().await;
        match store
            .iter_mut()
            .find(|l| l.location_uuid == location.location_uuid)
        {
            Some(existing) => *existing = location,
            None => store.push(location),
        }
        Ok(Response::new(EmptyLocation {}))
    }

    async fn update_location(
        &self,
        req: Request<Location>,
    ) -> Result<Response<EmptyLocation>, Status> {
        self.stall().await;
        let location = req.into_inner();
        let mut store = self.store.lock().await;
        let existing = store
            .iter_mut()
            .find(|l| l.location_uuid == location.location_uuid)
            .ok_or_else(|| Status::not_found("location not found"))?;
        *existing = location;
        Ok(Response::new(EmptyLocation {}))
    }

    async fn delete_location(
        &self,
        req: Request<LocationDeleteReq>,
    ) -> Result<Response<EmptyLocation>, Status> {
        self.stall().await;
        let uuid = req.into_inner().location_uuid;
        let mut store = self.store.lock().await;
        let before = store.len();
        store.retain(|l| l.location_uuid != uuid);
        if store.len() == before {
            return Err(Status::not_found("location not found"));
        }
        Ok(Response::new(EmptyLocation {}))
    }

    async fn location_by_uuid(
        &self,
        req: Request<LocationGetReq>,
    ) -> Result<Response<Location>, Status> {
        self.stall().await;
        let uuid = req.into_inner().location_uuid;
        self.store
            .lock()
            .await
            .iter()
            .find(|l| l.location_uuid == uuid)
            .cloned()
            .map(Response::new)
            .ok_or_else(|| Status::not_found("location not found"))
    }

    async fn get_all_locations(
        &self,
        _: Request<EmptyLocation>,
    ) -> Result<Response<AllLocations>, Status> {
        self.stall().await;
        let locations = self.store.lock().await.clone();
        Ok(Response::new(AllLocations { locations }))
    }
}

/// One recorded `Check` call.
#[derive(Debug, Clone)]
pub struct HealthCall {
    pub service: String,
    pub started: Instant,
    pub finished: Instant,
}

#[derive(Clone)]
pub struct FakeHealthService {
    status: Arc<Mutex<ServingStatus>>,
    /// How long each `Check` takes server-side.
    hold: Duration,
    calls: Arc<Mutex<Vec<HealthCall>>>,
}

impl FakeHealthService {
    pub fn new(status: ServingStatus) -> Self {
        Self {
            status: Arc::new(Mutex::new(status)),
            hold: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn serving() -> Self {
        Self::new(ServingStatus::Serving)
    }

    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub async fn set_status(&self, status: ServingStatus) {
        *self.status.lock().await = status;
    }

    pub async fn calls(&self) -> Vec<HealthCall> {
        self.calls.lock().await.clone()
    }
}

#[tonic::async_trait]
impl Health for FakeHealthService {
    async fn check(
        &self,
        req: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let started = Instant::now();
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }
        let status = *self.status.lock().await;
        self.calls.lock().await.push(HealthCall {
            service: req.into_inner().service,
            started,
            finished: Instant::now(),
        });
        Ok(Response::new(HealthCheckResponse {
            status: status as i32,
        }))
    }
}
