//! Service-area provinces.
//!
//! Bookings must name one of a fixed set of provinces. The set covers the
//! ten Canadian provinces and three territories.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known province.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown province: {0}")]
pub struct ProvinceError(pub String);

/// A province or territory served by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Province {
    Alberta,
    BritishColumbia,
    Manitoba,
    NewBrunswick,
    NewfoundlandAndLabrador,
    NorthwestTerritories,
    NovaScotia,
    Nunavut,
    Ontario,
    PrinceEdwardIsland,
    Quebec,
    Saskatchewan,
    Yukon,
}

impl Province {
    /// Every province, in display order.
    pub const ALL: [Self; 13] = [
        Self::Alberta,
        Self::BritishColumbia,
        Self::Manitoba,
        Self::NewBrunswick,
        Self::NewfoundlandAndLabrador,
        Self::NorthwestTerritories,
        Self::NovaScotia,
        Self::Nunavut,
        Self::Ontario,
        Self::PrinceEdwardIsland,
        Self::Quebec,
        Self::Saskatchewan,
        Self::Yukon,
    ];

    /// Human-readable name, also the persisted form on bookings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alberta => "Alberta",
            Self::BritishColumbia => "British Columbia",
            Self::Manitoba => "Manitoba",
            Self::NewBrunswick => "New Brunswick",
            Self::NewfoundlandAndLabrador => "Newfoundland and Labrador",
            Self::NorthwestTerritories => "Northwest Territories",
            Self::NovaScotia => "Nova Scotia",
            Self::Nunavut => "Nunavut",
            Self::Ontario => "Ontario",
            Self::PrinceEdwardIsland => "Prince Edward Island",
            Self::Quebec => "Quebec",
            Self::Saskatchewan => "Saskatchewan",
            Self::Yukon => "Yukon",
        }
    }

    /// Two-letter postal abbreviation.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Alberta => "AB",
            Self::BritishColumbia => "BC",
            Self::Manitoba => "MB",
            Self::NewBrunswick => "NB",
            Self::NewfoundlandAndLabrador => "NL",
            Self::NorthwestTerritories => "NT",
            Self::NovaScotia => "NS",
            Self::Nunavut => "NU",
            Self::Ontario => "ON",
            Self::PrinceEdwardIsland => "PE",
            Self::Quebec => "QC",
            Self::Saskatchewan => "SK",
            Self::Yukon => "YT",
        }
    }
}

impl std::fmt::Display for Province {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Province {
    type Err = ProvinceError;

    /// Accepts the display name or the postal code, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(needle) || p.code().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ProvinceError(s.to_owned()))
    }
}
