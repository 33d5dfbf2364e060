//! Route identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a route, e.g. `CR-Fitchburg`. Also used as the route label.
///
/// The transit API identifies routes by an opaque string; resolved route
/// ids are what the schedules request filters on.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Wrap a raw route id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_id() {
        let route = RouteId::new("CR-Fitchburg");
        assert_eq!(route.to_string(), "CR-Fitchburg");
        assert_eq!(route.as_str(), "CR-Fitchburg");
    }

    #[test]
    fn debug_names_the_kind() {
        assert_eq!(format!("{:?}", RouteId::from("CR-Lowell")), "RouteId(CR-Lowell)");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&RouteId::new("CR-Lowell")).unwrap();
        assert_eq!(json, r#""CR-Lowell""#);

        let id: RouteId = serde_json::from_str(r#""CR-Fitchburg""#).unwrap();
        assert_eq!(id.as_str(), "CR-Fitchburg");
    }
}
