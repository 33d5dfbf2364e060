//! Transit mode selection.

use std::fmt;
use std::str::FromStr;

/// Error returned when a transit mode string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transit mode: {0:?}")]
pub struct InvalidMode(String);

/// The transit mode the board is configured for.
///
/// Each mode corresponds to a GTFS route type number, which is what the
/// transit API filters routes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitMode {
    LightRail,
    Subway,
    #[default]
    CommuterRail,
    Bus,
    Ferry,
}

impl TransitMode {
    /// All supported modes, in route type order.
    pub const ALL: [TransitMode; 5] = [
        TransitMode::LightRail,
        TransitMode::Subway,
        TransitMode::CommuterRail,
        TransitMode::Bus,
        TransitMode::Ferry,
    ];

    /// GTFS route type number used by the routes endpoint.
    pub fn route_type(self) -> u8 {
        match self {
            TransitMode::LightRail => 0,
            TransitMode::Subway => 1,
            TransitMode::CommuterRail => 2,
            TransitMode::Bus => 3,
            TransitMode::Ferry => 4,
        }
    }

    /// Look up a mode by its GTFS route type number.
    pub fn from_route_type(route_type: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.route_type() == route_type)
    }

    /// Kebab-case name, as accepted by [`TransitMode::parse`].
    pub fn name(self) -> &'static str {
        match self {
            TransitMode::LightRail => "light-rail",
            TransitMode::Subway => "subway",
            TransitMode::CommuterRail => "commuter-rail",
            TransitMode::Bus => "bus",
            TransitMode::Ferry => "ferry",
        }
    }

    /// Human-readable label for board headings.
    pub fn label(self) -> &'static str {
        match self {
            TransitMode::LightRail => "Light Rail",
            TransitMode::Subway => "Subway",
            TransitMode::CommuterRail => "Commuter Rail",
            TransitMode::Bus => "Bus",
            TransitMode::Ferry => "Ferry",
        }
    }

    /// Parse a mode from its route type number or kebab-case name.
    ///
    /// # Examples
    ///
    /// ```
    /// use departure_board::domain::TransitMode;
    ///
    /// assert_eq!(TransitMode::parse("2").unwrap(), TransitMode::CommuterRail);
    /// assert_eq!(TransitMode::parse("Commuter-Rail").unwrap(), TransitMode::CommuterRail);
    /// assert!(TransitMode::parse("monorail").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, InvalidMode> {
        let trimmed = s.trim();

        if let Ok(route_type) = trimmed.parse::<u8>() {
            return Self::from_route_type(route_type).ok_or_else(|| InvalidMode(s.to_string()));
        }

        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|m| m.name() == normalized)
            .ok_or_else(|| InvalidMode(s.to_string()))
    }
}

impl FromStr for TransitMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
