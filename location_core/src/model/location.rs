use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A place the service knows about.
///
/// JSON looks like:
/// `{ "location_uuid":"…", "name":"Paris Bistro", "country":"FR", "lang":["fr","en"],
///    "currency":"EUR", "city":"Paris", "activeness":{ "is_active":true } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_uuid: Uuid,
    pub name: String,
    pub country: String,
    /// Supported language codes, in the order the service should offer them.
    #[serde(default)]
    pub lang: Vec<String>,
    pub currency: String,
    pub city: String,
    /// `None` means "unspecified", which is different from an explicit `false`.
    #[serde(default)]
    pub activeness: Option<Activeness>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activeness {
    pub is_active: bool,
}

impl Location {
    /// Builds a location without an activeness flag.
    pub fn new(
        location_uuid: Uuid,
        name: impl Into<String>,
        country: impl Into<String>,
        lang: Vec<String>,
        currency: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            location_uuid,
            name: name.into(),
            country: country.into(),
            lang,
            currency: currency.into(),
            city: city.into(),
            activeness: None,
        }
    }

    pub fn with_activeness(mut self, is_active: bool) -> Self {
        self.activeness = Some(Activeness { is_active });
        self
    }

    /// `Some(flag)` when the activeness was explicitly set.
    pub fn is_active(&self) -> Option<bool> {
        self.activeness.map(|a| a.is_active)
    }
}
