//! Error types for sky-math operations

use thiserror::Error;

/// Hint attached to every `BadInput` response surfaced to clients.
pub const ISO_HINT: &str = "Use ISO 8601 UTC con sufijo Z, ej. 2025-01-10T03:00:00Z";

/// Main error type for sky-math operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkyError {
    /// Malformed caller input (bad timestamp, missing projector center)
    #[error("{detail}")]
    BadInput {
        /// Client-facing description of what was wrong
        detail: String,
    },

    /// Unknown constellation name
    #[error("Constellation not found: {name}")]
    NotFound {
        /// The name that failed to resolve
        name: String,
    },

    /// The catalog file failed validation; the whole load is rejected
    #[error("Entrada de catálogo inválida: {reason}")]
    CatalogInvalid {
        /// Why the load was rejected
        reason: String,
    },

    /// The ephemeris provider failed
    #[error("Provider error in {operation}: {reason}")]
    Provider {
        /// Operation that was being performed
        operation: &'static str,
        /// Why it failed
        reason: String,
    },

    /// Invalid coordinate value
    #[error("Invalid {coord_type}: {value} (valid range: {valid_range})")]
    InvalidCoordinate {
        /// Type of coordinate (e.g., "Latitude", "RA")
        coord_type: &'static str,
        /// The invalid value
        value: f64,
        /// Valid range description
        valid_range: &'static str,
    },
}

impl SkyError {
    /// Client hint for 400 responses; present only on `BadInput`.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SkyError::BadInput { .. } => Some(ISO_HINT),
            _ => None,
        }
    }
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SkyError>;

/// Validate latitude (-90 <= lat <= 90)
#[inline]
pub fn validate_latitude(lat: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        Err(SkyError::InvalidCoordinate {
            coord_type: "Latitude",
            value: lat,
            valid_range: "[-90, 90]",
        })
    } else {
        Ok(())
    }
}

/// Validate longitude (-180 < lon <= 180)
#[inline]
pub fn validate_longitude(lon: f64) -> Result<()> {
    if lon <= -180.0 || lon > 180.0 {
        Err(SkyError::InvalidCoordinate {
            coord_type: "Longitude",
            value: lon,
            valid_range: "(-180, 180]",
        })
    } else {
        Ok(())
    }
}
