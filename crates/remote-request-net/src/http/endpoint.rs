//! Endpoint catalog.

use serde::{Deserialize, Serialize};

/// A known API endpoint.
///
/// The catalog is closed: new endpoints are added as new variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    /// Every country with its names and flag.
    AllCountries,
}

impl Endpoint {
    /// All endpoints in the catalog.
    pub const ALL: [Endpoint; 1] = [Self::AllCountries];

    /// URL path relative to the base URL, without a leading slash.
    pub fn path(self) -> &'static str {
        match self {
            Self::AllCountries => "v3.1/all",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
