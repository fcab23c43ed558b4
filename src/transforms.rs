//! Coordinate transformations between equatorial and horizontal frames,
//! plus the small planar/spherical geometry helpers shared by the FOV
//! clipping and screen projection code.

use serde::Serialize;
use std::f64::consts::PI;

/// Horizontal (alt-az) position of a sky direction.
///
/// Altitude in `[-90, 90]`; azimuth in `[0, 360)` measured from North
/// through East.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Horizontal {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

/// Converts equatorial coordinates (RA in hours, Dec in degrees) to
/// horizontal coordinates for an observer latitude and a Local Sidereal
/// Time in hours.
///
/// This is the Meeus spherical trigonometry formulation:
///
/// ```text
/// HA = LST - RA
/// sin(Alt) = sin(Dec)·sin(Lat) + cos(Dec)·cos(Lat)·cos(HA)
/// Az = atan2(-cos(Dec)·sin(HA)/cos(Alt),
///            (sin(Dec) - sin(Alt)·sin(Lat)) / (cos(Alt)·cos(Lat)))
/// ```
///
/// The `sin(Alt)` argument is clamped to `[-1, 1]` and `cos(Alt)` is
/// floored at `1e-9` so the zenith does not divide by zero. Azimuth is
/// measured from North through East and normalized to `[0, 360)`.
///
/// # Example
///
/// ```
/// use sky_math::transforms::equatorial_to_horizontal;
///
/// // A star on the meridian (HA = 0) culminates at Alt = 90 - |Dec - Lat|.
/// let pos = equatorial_to_horizontal(6.0, 30.0, 40.0, 6.0);
/// assert!((pos.altitude_deg - 80.0).abs() < 1e-9);
/// ```
pub fn equatorial_to_horizontal(
    ra_hours: f64,
    dec_deg: f64,
    latitude_deg: f64,
    lst_hours: f64,
) -> Horizontal {
    let ra_rad = (ra_hours * 15.0).to_radians();
    let dec_rad = dec_deg.to_radians();
    let lat_rad = latitude_deg.to_radians();
    let lst_rad = (lst_hours * 15.0).to_radians();

    let ha_rad = lst_rad - ra_rad;

    let sin_alt = (dec_rad.sin() * lat_rad.sin()
        + dec_rad.cos() * lat_rad.cos() * ha_rad.cos())
    .clamp(-1.0, 1.0);
    let alt_rad = sin_alt.asin();

    let cos_alt = alt_rad.cos().max(1e-9);
    let sin_az = -dec_rad.cos() * ha_rad.sin() / cos_alt;
    let cos_az = (dec_rad.sin() - alt_rad.sin() * lat_rad.sin()) / (cos_alt * lat_rad.cos());
    let az_rad = sin_az.atan2(cos_az);

    Horizontal {
        altitude_deg: alt_rad.to_degrees(),
        azimuth_deg: normalize_degrees_360(az_rad.to_degrees()),
    }
}

/// Inverse transform: horizontal (alt-az) back to equatorial, returning
/// `(ra_deg, dec_deg)` with RA in `[0, 360)`.
///
/// Mirror of [`equatorial_to_horizontal`]: the roles of (Dec, HA) and
/// (Alt, Az) swap, then `RA = LST - HA`.
///
/// # Example
///
/// ```
/// use sky_math::transforms::{equatorial_to_horizontal, horizontal_to_equatorial};
///
/// let lst = 4.25;
/// let pos = equatorial_to_horizontal(5.5, -8.2, 19.43, lst);
/// let (ra_deg, dec_deg) = horizontal_to_equatorial(pos.altitude_deg, pos.azimuth_deg, 19.43, lst);
/// assert!((ra_deg - 5.5 * 15.0).abs() < 1e-6);
/// assert!((dec_deg + 8.2).abs() < 1e-6);
/// ```
pub fn horizontal_to_equatorial(
    altitude_deg: f64,
    azimuth_deg: f64,
    latitude_deg: f64,
    lst_hours: f64,
) -> (f64, f64) {
    let alt_rad = altitude_deg.to_radians();
    let az_rad = azimuth_deg.to_radians();
    let lat_rad = latitude_deg.to_radians();
    let lst_rad = (lst_hours * 15.0).to_radians();

    let sin_dec = (alt_rad.sin() * lat_rad.sin()
        + alt_rad.cos() * lat_rad.cos() * az_rad.cos())
    .clamp(-1.0, 1.0);
    let dec_rad = sin_dec.asin();

    let cos_dec = dec_rad.cos().max(1e-9);
    let sin_ha = -alt_rad.cos() * az_rad.sin() / cos_dec;
    let cos_ha = (alt_rad.sin() - dec_rad.sin() * lat_rad.sin()) / (cos_dec * lat_rad.cos());
    let ha_rad = sin_ha.atan2(cos_ha);

    let ra_rad = (lst_rad - ha_rad).rem_euclid(2.0 * PI);

    (ra_rad.to_degrees(), dec_rad.to_degrees())
}

/// Shortest signed arc from `from_deg` to `to_deg`, in `[-180, 180)`.
///
/// Positive means `to` lies east (clockwise) of `from`. This is the wrap
/// rule used everywhere a field of view straddles the 0°/360° azimuth
/// seam.
///
/// # Example
///
/// ```
/// use sky_math::transforms::azimuth_delta_deg;
///
/// assert!((azimuth_delta_deg(0.1, 359.9) + 0.2).abs() < 1e-9);
/// assert!((azimuth_delta_deg(350.0, 10.0) - 20.0).abs() < 1e-9);
/// ```
#[inline]
pub fn azimuth_delta_deg(from_deg: f64, to_deg: f64) -> f64 {
    (to_deg - from_deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Normalizes degrees into `[0, 360)`.
#[inline]
pub fn normalize_degrees_360(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Circular mean of a set of angles in degrees, in `[0, 360)`.
///
/// Unit vectors are averaged and the result taken with `atan2`, so
/// values straddling the 0°/360° seam average correctly (359° and 1°
/// give 0°, not 180°). Empty input and degenerate (vector-sum zero)
/// input both yield 0.
pub fn circular_mean_deg(values_deg: &[f64]) -> f64 {
    if values_deg.is_empty() {
        return 0.0;
    }
    let (mut xs, mut ys) = (0.0_f64, 0.0_f64);
    for deg in values_deg {
        let rad = deg.rem_euclid(360.0).to_radians();
        xs += rad.cos();
        ys += rad.sin();
    }
    if xs == 0.0 && ys == 0.0 {
        return 0.0;
    }
    normalize_degrees_360(ys.atan2(xs).to_degrees())
}

/// Liang–Barsky clip of the segment `(x1,y1)-(x2,y2)` against the
/// axis-aligned rectangle `[xmin, xmax] × [ymin, ymax]`.
///
/// Returns the clipped endpoints, or `None` when the segment lies
/// entirely outside the rectangle.
pub fn clip_segment(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
) -> Option<(f64, f64, f64, f64)> {
    let dx = x2 - x1;
    let dy = y2 - y1;

    let p = [-dx, dx, -dy, dy];
    let q = [x1 - xmin, xmax - x1, y1 - ymin, ymax - y1];

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for i in 0..4 {
        if p[i] == 0.0 {
            // Parallel to this boundary: outside means gone.
            if q[i] < 0.0 {
                return None;
            }
        } else {
            let r = q[i] / p[i];
            if p[i] < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
    }

    Some((x1 + t0 * dx, y1 + t0 * dy, x1 + t1 * dx, y1 + t1 * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zenith_does_not_divide_by_zero() {
        // Star exactly at the observer's zenith: Dec = Lat, HA = 0.
        let pos = equatorial_to_horizontal(12.0, 45.0, 45.0, 12.0);
        assert!((pos.altitude_deg - 90.0).abs() < 1e-6);
        assert!(pos.azimuth_deg.is_finite());
    }

    #[test]
    fn test_azimuth_range() {
        for ra in [0.0, 3.7, 11.2, 18.0, 23.9] {
            for dec in [-80.0, -30.0, 0.0, 30.0, 80.0] {
                let pos = equatorial_to_horizontal(ra, dec, 19.4326, 5.0);
                assert!(pos.azimuth_deg >= 0.0 && pos.azimuth_deg < 360.0);
                assert!(pos.altitude_deg >= -90.0 && pos.altitude_deg <= 90.0);
            }
        }
    }

    #[test]
    fn test_clip_segment_inside_untouched() {
        let clipped = clip_segment(1.0, 1.0, 2.0, 2.0, 0.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!(clipped, (1.0, 1.0, 2.0, 2.0));
    }

    #[test]
    fn test_clip_segment_crossing() {
        let (cx1, cy1, cx2, cy2) =
            clip_segment(-5.0, 5.0, 15.0, 5.0, 0.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!((cx1, cy1), (0.0, 5.0));
        assert_eq!((cx2, cy2), (10.0, 5.0));
    }

    #[test]
    fn test_clip_segment_outside() {
        assert!(clip_segment(-5.0, -5.0, -1.0, -1.0, 0.0, 0.0, 10.0, 10.0).is_none());
        // Parallel to an edge, fully outside.
        assert!(clip_segment(-1.0, 3.0, -1.0, 7.0, 0.0, 0.0, 10.0, 10.0).is_none());
    }
}
