use async_trait::async_trait;
use uuid::Uuid;

use super::errors::ApiError;
use crate::model::location::Location;

/// Operations offered by the remote Location service.
///
/// Every call is bounded by the client's configured timeout and is never
/// retried. Implementations must be safe to share between tasks; only
/// `health_check` is serialized.
#[async_trait]
pub trait LocationApi: Send + Sync {
    /// Create the location, or update it if the service already knows its uuid.
    async fn create_or_update_location(&self, location: &Location) -> Result<(), ApiError>;

    async fn update_location(&self, location: &Location) -> Result<(), ApiError>;

    async fn delete_location(&self, location_uuid: Uuid) -> Result<(), ApiError>;

    async fn location_by_uuid(&self, location_uuid: Uuid) -> Result<Location, ApiError>;

    /// Every location in the order the service returns them. No pagination.
    async fn get_all_locations(&self) -> Result<Vec<Location>, ApiError>;

    /// `Ok(())` only if the service reports exactly SERVING.
    async fn health_check(&self) -> Result<(), ApiError>;
}
