pub mod core;
pub mod model;
pub mod utils;

// re‑export ergonomic entry points
pub use self::core::api::LocationApi;
pub use self::core::config::ClientConfig;
pub use self::core::errors::{ApiError, CallErrorKind};
pub use model::location::{Activeness, Location};
pub use uuid::Uuid;
