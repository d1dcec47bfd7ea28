//! Coordinate parsing, validation and wire-order formatting.
//!
//! Public APIs always speak `[longitude, latitude]`. Some providers want
//! `"lat,lng"` instead; the conversion happens at the adapter boundary via
//! [`Coordinates::to_lat_lon`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GeocodeError;

/// A point in `[lon, lat]` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinates {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Check the strict open ranges lon ∈ (-180, 180) and lat ∈ (-90, 90).
    pub fn validate(&self) -> Result<(), GeocodeError> {
        if !self.lon.is_finite() || !self.lat.is_finite() {
            return Err(GeocodeError::BadRequest(format!(
                "Coordinates must be numeric, got {}",
                self
            )));
        }
        if self.lon <= -180.0 || self.lon >= 180.0 {
            return Err(GeocodeError::BadRequest(format!(
                "Longitude {} out of range (-180, 180)",
                self.lon
            )));
        }
        if self.lat <= -90.0 || self.lat >= 90.0 {
            return Err(GeocodeError::BadRequest(format!(
                "Latitude {} out of range (-90, 90)",
                self.lat
            )));
        }
        Ok(())
    }

    /// Parse and validate in one step.
    pub fn parse_valid(s: &str) -> Result<Self, GeocodeError> {
        let coords: Self = s.parse()?;
        coords.validate()?;
        Ok(coords)
    }

    /// `"lon,lat"`
    pub fn to_lon_lat(&self) -> String {
        format!("{},{}", self.lon, self.lat)
    }

    /// `"lat,lon"`
    pub fn to_lat_lon(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

impl FromStr for Coordinates {
    type Err = GeocodeError;

    /// Parse `"lon,lat"`; surrounding whitespace on each part is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(GeocodeError::BadRequest(format!(
                "Expected \"lon,lat\", got '{}'",
                s
            )));
        }
        let lon = parts[0]
            .parse::<f64>()
            .map_err(|_| GeocodeError::BadRequest(format!("Invalid longitude '{}'", parts[0])))?;
        let lat = parts[1]
            .parse::<f64>()
            .map_err(|_| GeocodeError::BadRequest(format!("Invalid latitude '{}'", parts[1])))?;
        Ok(Self { lon, lat })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lon, self.lat)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from(v: [f64; 2]) -> Self {
        Self { lon: v[0], lat: v[1] }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lon, c.lat]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_lon_lat() {
        let c: Coordinates = "13.4482975,52.47432930000001".parse().unwrap();
        assert_relative_eq!(c.lon, 13.4482975);
        assert_relative_eq!(c.lat, 52.4743293, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_tolerates_spaces() {
        let c: Coordinates = " 11.1691 , 53.2700389 ".parse().unwrap();
        assert_relative_eq!(c.lon, 11.1691);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!("13.4".parse::<Coordinates>().unwrap_err().code(), 400);
        assert!("a,b".parse::<Coordinates>().is_err());
        assert!("1,2,3".parse::<Coordinates>().is_err());
        assert!(",52.5".parse::<Coordinates>().is_err());
    }

    #[test]
    fn test_validate_open_interval() {
        assert!(Coordinates::new(180.0, 0.0).validate().is_err());
        assert!(Coordinates::new(-180.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -90.0).validate().is_err());
        assert!(Coordinates::new(0.0, 90.0).validate().is_err());
        assert!(Coordinates::new(179.9, 89.9).validate().is_ok());
        assert!(Coordinates::new(f64::NAN, 10.0).validate().is_err());
    }

    #[test]
    fn test_wire_orderings() {
        let c = Coordinates::new(13.4, 52.52);
        assert_eq!(c.to_lon_lat(), "13.4,52.52");
        assert_eq!(c.to_lat_lon(), "52.52,13.4");
    }

    #[test]
    fn test_serde_as_array() {
        let c = Coordinates::new(13.4, 52.52);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[13.4,52.52]");
        let back: Coordinates = serde_json::from_str("[13.4,52.52]").unwrap();
        assert_eq!(back, c);
    }
}
