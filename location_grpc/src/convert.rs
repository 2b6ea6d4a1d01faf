//! Bidirectional conversion helpers between the protobuf world
//! and the domain structs that live in location_core.

use location_core::{Activeness, Location};
use tracing::warn;
use uuid::Uuid;

use crate::proto::location as pb;

/// Wire bytes ▸ uuid. Anything that is not exactly 16 bytes becomes the nil uuid.
pub fn uuid_from_bytes_or_nil(bytes: &[u8]) -> Uuid {
    Uuid::from_slice(bytes).unwrap_or_else(|e| {
        warn!(len = bytes.len(), error = %e, "malformed location uuid on the wire, using nil");
        Uuid::nil()
    })
}

pub fn uuid_to_bytes(uuid: Uuid) -> Vec<u8> {
    uuid.as_bytes().to_vec()
}

/// core ▸ protobuf
impl From<&Location> for pb::Location {
    fn from(l: &Location) -> Self {
        pb::Location {
            location_uuid: uuid_to_bytes(l.location_uuid),
            name: l.name.clone(),
            country: l.country.clone(),
            lang: l.lang.clone(),
            currency: l.currency.clone(),
            city: l.city.clone(),
            activeness: l.activeness.map(|a| pb::Activeness {
                is_active: a.is_active,
            }),
        }
    }
}

impl From<Location> for pb::Location {
    fn from(l: Location) -> Self {
        pb::Location {
            location_uuid: uuid_to_bytes(l.location_uuid),
            name: l.name,
            country: l.country,
            lang: l.lang,
            currency: l.currency,
            city: l.city,
            activeness: l.activeness.map(|a| pb::Activeness {
                is_active: a.is_active,
            }),
        }
    }
}

/// protobuf ▸ core
impl From<pb::Location> for Location {
    fn from(m: pb::Location) -> Self {
        Location {
            location_uuid: uuid_from_bytes_or_nil(&m.location_uuid),
            name: m.name,
            country: m.country,
            lang: m.lang,
            currency: m.currency,
            city: m.city,
            activeness: m.activeness.map(|a| Activeness {
                is_active: a.is_active,
            }),
        }
    }
}

/// Keeps the order the service returned.
pub fn locations_from_proto(all: pb::AllLocations) -> Vec<Location> {
    all.locations.into_iter().map(Into::into).collect()
}
