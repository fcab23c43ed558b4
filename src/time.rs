//! UTC instants, Julian Dates and sidereal time.
//!
//! This module provides the time scale every other computation hangs off:
//! ISO-8601 parsing of caller-supplied instants, Julian Date conversion
//! (Meeus), Greenwich Mean Sidereal Time, and Local Sidereal Time for an
//! observer longitude.
//!
//! # Overview
//!
//! While solar time (UTC) is based on the Sun's position, sidereal time
//! tracks Earth's rotation relative to distant stars. A sidereal day is
//! about 23h 56m 4s, roughly 4 minutes shorter than a solar day; that is
//! why the same star rises ~4 minutes earlier each night.
//!
//! # Example
//!
//! ```
//! use sky_math::time::{parse_utc, lst_hours, format_utc};
//!
//! let at = parse_utc(Some("2025-01-10T03:00:00Z")).unwrap();
//! let lst = lst_hours(-99.1332, at);
//!
//! assert!(lst >= 0.0 && lst < 24.0);
//! assert_eq!(format_utc(at), "2025-01-10T03:00:00Z");
//! ```

use crate::error::{Result, SkyError};
use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};

/// Julian Date (JD) of the J2000.0 epoch: 2000 January 1.5 TT
pub const JD2000: f64 = 2451545.0;

/// Sidereal hours elapsed per UTC hour.
pub const SIDEREAL_RATE: f64 = 24.06570982441908 / 24.0;

/// Parses an optional ISO-8601 UTC timestamp into a [`DateTime<Utc>`].
///
/// A trailing `Z` is normalized to `+00:00` before parsing; a timestamp
/// without any offset is taken as UTC. `None` or an empty string yields
/// the current UTC instant.
///
/// # Errors
///
/// Returns [`SkyError::BadInput`] for anything that does not parse; the
/// error carries the client hint [`crate::error::ISO_HINT`].
///
/// # Example
///
/// ```
/// use sky_math::time::parse_utc;
/// use chrono::{Datelike, Timelike};
///
/// let dt = parse_utc(Some("2024-01-01T02:30:00Z")).unwrap();
/// assert_eq!((dt.year(), dt.hour(), dt.minute()), (2024, 2, 30));
///
/// assert!(parse_utc(Some("not-a-date")).is_err());
/// ```
pub fn parse_utc(when_iso_utc: Option<&str>) -> Result<DateTime<Utc>> {
    let raw = match when_iso_utc {
        None => return Ok(Utc::now()),
        Some(s) if s.trim().is_empty() => return Ok(Utc::now()),
        Some(s) => s.trim(),
    };

    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Offset-free timestamps are interpreted as UTC, like the original API.
    if let Ok(naive) = normalized.parse::<NaiveDateTime>() {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    Err(SkyError::BadInput {
        detail: format!(
            "Fecha/hora inválida: '{raw}'. Use ISO 8601, por ejemplo: 2024-01-01T02:30:00Z"
        ),
    })
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SSZ` (seconds precision).
pub fn format_utc(datetime: DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Converts a UTC datetime to a Julian Date (JD).
///
/// Julian Dates are a continuous count of days since noon UTC on
/// January 1, 4713 BCE. This implementation follows Jean Meeus'
/// *Astronomical Algorithms* (2nd ed., Chapter 7) with the Gregorian
/// offset `B = 2 - A + A/4` applied throughout, the month shift
/// (month ≤ 2 ⇒ year − 1, month + 12), and sub-second precision from
/// the nanosecond field.
///
/// # Notes
///
/// The Julian Day starts at **noon**, so:
/// - `2000-01-01 12:00:00 UTC` → `2451545.0` (start of J2000.0)
/// - `2000-01-01 00:00:00 UTC` → `2451544.5`
///
/// # Example
///
/// ```
/// use chrono::{Utc, TimeZone};
/// use sky_math::time::julian_date;
///
/// let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
/// assert!((julian_date(dt) - 2451545.0).abs() < 1e-9);
/// ```
pub fn julian_date(datetime: DateTime<Utc>) -> f64 {
    let mut year = datetime.year();
    let mut month = datetime.month() as i32;
    let day = datetime.day() as f64;

    if month <= 2 {
        year -= 1;
        month += 12;
    }

    let a = (year as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    let second = datetime.second() as f64 + datetime.nanosecond() as f64 / 1e9;
    let frac_day =
        (datetime.hour() as f64 + (datetime.minute() as f64 + second / 60.0) / 60.0) / 24.0;

    (365.25 * (year as f64 + 4716.0)).floor()
        + (30.6001 * ((month + 1) as f64)).floor()
        + day
        + frac_day
        + b
        - 1524.5
}

/// Computes Greenwich Mean Sidereal Time in fractional hours (0.0–24.0).
///
/// Uses the compact GMST series
///
/// ```text
/// GMST = 18.697374558 + 24.06570982441908 × (JD − 2451545.0)
/// ```
///
/// which is accurate to well under a second of time over several
/// centuries — plenty for star charting and AR overlays.
///
/// # Example
///
/// ```
/// use chrono::{Utc, TimeZone};
/// use sky_math::time::gmst_hours;
///
/// // At the J2000.0 epoch GMST is 18.697374558 h by construction.
/// let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
/// assert!((gmst_hours(dt) - 18.697374558).abs() < 1e-9);
/// ```
pub fn gmst_hours(datetime: DateTime<Utc>) -> f64 {
    let d = julian_date(datetime) - JD2000;
    normalize_hours(18.697374558 + 24.06570982441908 * d)
}

/// Computes Local Sidereal Time in fractional hours (0.0–24.0)
/// for an observer longitude (degrees, east positive).
///
/// ```text
/// LST = GMST + longitude / 15
/// ```
///
/// # Example
///
/// ```
/// use chrono::{Utc, TimeZone};
/// use sky_math::time::{gmst_hours, lst_hours};
///
/// let dt = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
/// let gmst = gmst_hours(dt);
/// let lst = lst_hours(-90.0, dt);
/// assert!(((gmst - 6.0).rem_euclid(24.0) - lst).abs() < 1e-9);
/// ```
pub fn lst_hours(longitude_deg: f64, datetime: DateTime<Utc>) -> f64 {
    normalize_hours(gmst_hours(datetime) + longitude_deg / 15.0)
}

/// Normalizes fractional hours into `[0, 24)`.
#[inline]
pub fn normalize_hours(hours: f64) -> f64 {
    hours.rem_euclid(24.0)
}
