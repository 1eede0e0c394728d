//! Response payloads for the endpoints in the catalog.

use serde::{Deserialize, Serialize};

/// One entry of the [`AllCountries`](super::Endpoint::AllCountries) response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDetails {
    /// Flag images.
    pub flags: Option<Flag>,
    /// Country names.
    pub name: Option<CountryName>,
}

/// Flag image URLs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    /// PNG rendering of the flag.
    pub png: Option<String>,
}

/// Common and official country names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryName {
    /// Name in everyday use.
    pub common: Option<String>,
    /// Official name.
    pub official: Option<String>,
}

/// Body of the [`AllCountries`](super::Endpoint::AllCountries) response.
pub type AllCountries = Vec<CountryDetails>;
