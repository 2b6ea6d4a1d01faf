//! gRPC binding for the Location service.
//!
//! One [`ConnectionManager`] owns the channel to the service; one
//! [`GrpcLocationApi`] sits on top of it and implements
//! [`location_core::LocationApi`].
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use location_core::LocationApi;
//! use location_grpc::GrpcLocationApi;
//!
//! # async fn example() -> Result<(), location_core::ApiError> {
//! let api = GrpcLocationApi::connect("127.0.0.1:50051", Duration::from_secs(3))?;
//! api.health_check().await?;
//! for location in api.get_all_locations().await? {
//!     println!("{} ({})", location.name, location.city);
//! }
//! api.close()?;
//! # Ok(())
//! # }
//! ```

// ── generated protobuf code ───────────────────────────────────────────────────
pub mod proto {
    pub mod location {
        tonic::include_proto!("location");
    }
    pub mod health {
        tonic::include_proto!("grpc.health.v1");
    }
}

pub mod api;
pub mod connection;
pub mod convert;

pub use api::{GrpcLocationApi, HEALTH_SERVICE_NAME};
pub use connection::{BackoffConfig, ConnectionManager, ConnectionOptions};
