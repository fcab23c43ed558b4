use crate::iau::{
    self, centroids_of, find_by_direction, find_by_radec_in, install_boundaries, parse_boundaries,
    reset_store_for_tests, BoundaryTable,
};
use crate::observer::Observer;
use crate::tests::support::STORE_LOCK;
use crate::transforms::horizontal_to_equatorial;
use chrono::{TimeZone, Utc};

/// Sixteen RA bands by hemisphere: a toy all-sky partition that still
/// exercises wrap handling and first-match resolution.
fn banded_sky() -> BoundaryTable {
    let mut table = BoundaryTable::new();
    for band in 0..8 {
        let ra0 = band as f64 * 45.0;
        let ra1 = ra0 + 45.0;
        table.insert(
            format!("North {band}"),
            vec![vec![(ra0, 0.0), (ra1, 0.0), (ra1, 90.0), (ra0, 90.0)]],
        );
        table.insert(
            format!("South {band}"),
            vec![vec![(ra0, -90.0), (ra1, -90.0), (ra1, 0.0), (ra0, 0.0)]],
        );
    }
    table
}

#[test]
fn test_band_lookup() {
    let table = banded_sky();
    assert_eq!(find_by_radec_in(&table, 10.0, 45.0), Some("North 0"));
    assert_eq!(find_by_radec_in(&table, 100.0, -45.0), Some("South 2"));
    assert_eq!(find_by_radec_in(&table, 359.0, 20.0), Some("North 7"));
}

#[test]
fn test_altaz_agrees_with_radec_lookup() {
    // find_by_altaz must equal find_by_radec over the forward transform
    // for any direction above or below the horizon.
    let _guard = STORE_LOCK.lock().unwrap();
    reset_store_for_tests();
    install_boundaries(banded_sky());

    let observer = Observer::new(19.0, -99.0).unwrap();
    let at = Utc.with_ymd_and_hms(2025, 3, 21, 0, 0, 0).unwrap();
    let lst = observer.lst_hours(at);

    for az in [0.0, 45.0, 133.3, 212.7, 359.9] {
        for alt in [-60.0, -10.0, 0.5, 30.0, 88.0] {
            let via_altaz = iau::find_by_altaz(&observer, at, az, alt);
            let (ra, dec) = horizontal_to_equatorial(alt, az, observer.latitude_deg, lst);
            let via_radec = iau::find_by_radec(ra, dec);
            assert_eq!(via_altaz, via_radec, "az {az} alt {alt}");
            assert!(via_radec.is_some());
        }
    }

    reset_store_for_tests();
}

#[test]
fn test_zenith_lookup_is_deterministic() {
    // Looking straight up, the answer is the band containing the zenith
    // RA (= LST) and Dec (= latitude).
    let _guard = STORE_LOCK.lock().unwrap();
    reset_store_for_tests();
    install_boundaries(banded_sky());

    let observer = Observer::new(19.0, -99.0).unwrap();
    let at = Utc.with_ymd_and_hms(2025, 3, 21, 0, 0, 0).unwrap();
    let lst_deg = observer.lst_hours(at) * 15.0;
    let expected_band = (lst_deg / 45.0).floor() as usize % 8;

    let a = iau::find_by_altaz(&observer, at, 123.0, 90.0);
    let b = iau::find_by_altaz(&observer, at, 321.0, 90.0);
    // Azimuth is irrelevant at the zenith.
    assert_eq!(a, b);
    assert_eq!(a, Some(format!("North {expected_band}")));

    reset_store_for_tests();
}

#[test]
fn test_direction_lookup_round_trips_radec() {
    let _guard = STORE_LOCK.lock().unwrap();
    reset_store_for_tests();
    install_boundaries(banded_sky());

    let observer = Observer::new(19.4326, -99.1332).unwrap();
    let at = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
    let lst = observer.lst_hours(at);

    let lookup = find_by_direction(&observer, at, 140.0, 35.0);
    assert_eq!(lookup.at, "2025-01-10T03:00:00Z");
    assert_eq!(lookup.input_alt_az, (35.0, 140.0));
    let (ra, dec) = lookup.radec_deg;
    assert!(ra >= 0.0 && ra < 360.0);
    assert!(dec >= -90.0 && dec <= 90.0);
    // The reported RA/Dec maps back onto the queried direction.
    let pos = crate::transforms::equatorial_to_horizontal(
        ra / 15.0,
        dec,
        observer.latitude_deg,
        lst,
    );
    assert!((pos.altitude_deg - 35.0).abs() < 1e-6);
    assert!((pos.azimuth_deg - 140.0).abs() < 1e-6);
    assert!(lookup.iau_constellation.is_some());

    reset_store_for_tests();
}

#[test]
fn test_missing_boundaries_mean_no_match() {
    let _guard = STORE_LOCK.lock().unwrap();
    reset_store_for_tests();
    install_boundaries(BoundaryTable::new());
    assert_eq!(iau::find_by_radec(120.0, 30.0), None);
    reset_store_for_tests();
}

#[test]
fn test_parse_and_centroids_from_json() {
    let raw = r#"{
        "Band": [[[300.0, 10.0], [340.0, 10.0], [340.0, 30.0], [300.0, 30.0]]]
    }"#;
    let table = parse_boundaries(raw).unwrap();
    let centroids = centroids_of(&table);
    let (ra_c, dec_c) = centroids["Band"];
    assert!((ra_c - 320.0).abs() < 1e-6);
    assert!((dec_c - 20.0).abs() < 1e-6);
    assert!(ra_c >= 0.0 && ra_c < 360.0);
}
