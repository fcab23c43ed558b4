use crate::error::{validate_latitude, validate_longitude, Result};
use crate::time::lst_hours;
use chrono::{DateTime, Utc};

/// Represents an observer on Earth by geodetic latitude and longitude.
///
/// Immutable once built; used for sidereal time and every horizontal
/// coordinate computation in the crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Latitude in degrees (+N, -S)
    pub latitude_deg: f64,
    /// Longitude in degrees (+E, -W, Greenwich = 0)
    pub longitude_deg: f64,
}

impl Observer {
    /// Builds an observer, validating latitude in `[-90, 90]` and
    /// longitude in `(-180, 180]` (south and west negative).
    ///
    /// # Example
    /// ```
    /// use sky_math::Observer;
    ///
    /// let cdmx = Observer::new(19.4326, -99.1332).unwrap();
    /// assert_eq!(cdmx.latitude_deg, 19.4326);
    ///
    /// assert!(Observer::new(91.0, 0.0).is_err());
    /// assert!(Observer::new(0.0, -180.0).is_err());
    /// ```
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Result<Self> {
        validate_latitude(latitude_deg)?;
        validate_longitude(longitude_deg)?;
        Ok(Observer {
            latitude_deg,
            longitude_deg,
        })
    }

    /// Local Sidereal Time at this longitude for a UTC instant,
    /// in fractional hours `[0, 24)`.
    ///
    /// # Example
    /// ```
    /// use chrono::{Utc, TimeZone};
    /// use sky_math::Observer;
    ///
    /// let obs = Observer::new(19.0, -99.0).unwrap();
    /// let dt = Utc.with_ymd_and_hms(2025, 3, 21, 0, 0, 0).unwrap();
    /// let lst = obs.lst_hours(dt);
    /// assert!(lst >= 0.0 && lst < 24.0);
    /// ```
    pub fn lst_hours(&self, datetime: DateTime<Utc>) -> f64 {
        lst_hours(self.longitude_deg, datetime)
    }
}
