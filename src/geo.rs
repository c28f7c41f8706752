//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Entrada.
//! The Entrada project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Coordinate Converter Module
//!
//! WGS84 latitude/longitude to UTM (Universal Transverse Mercator)
//! projection. Location answers are exported both as raw lat/long and as
//! UTM northing/easting/zone, so spreadsheet users can work in planar
//! coordinates without an external conversion step.
//!
//! The conversion is a pure function of the coordinates; a failed
//! conversion is represented as `None` and callers substitute empty
//! output values (conversion problems never abort an export).

use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis in metres.
const WGS84_RADIUS: f64 = 6_378_137.0;
/// WGS84 first eccentricity squared.
const WGS84_ECC_SQUARED: f64 = 0.006_694_38;
/// Central meridian scale factor.
const K0: f64 = 0.9996;
/// False easting applied to every zone.
const FALSE_EASTING: f64 = 500_000.0;
/// False northing applied in the southern hemisphere.
const FALSE_NORTHING: f64 = 10_000_000.0;

/// A point projected into UTM coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnUtm {
    /// Metres north of the zone origin (false northing applied south of
    /// the equator).
    pub northing: i64,
    /// Metres east of the zone central meridian plus the false easting.
    pub easting: i64,
    /// Zone number plus latitude band letter, e.g. `34P`.
    pub zone: String,
}

/// Projects a WGS84 (longitude, latitude) pair into UTM.
///
/// Accepts the full valid domain (±180° longitude, ±90° latitude).
/// Returns `None` for non-finite or out-of-domain coordinates.
pub fn utm_from_lonlat(longitude: f64, latitude: f64) -> Option<EnUtm> {
    if !longitude.is_finite() || !latitude.is_finite() {
        return None;
    }
    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return None;
    }

    // Normalize +180 onto the -180..180 interval so it lands in zone 1.
    let long_temp = (longitude + 180.0) - ((longitude + 180.0) / 360.0).floor() * 360.0 - 180.0;
    let zone_number = zone_for(long_temp, latitude);

    let lat_rad = latitude.to_radians();
    let long_rad = long_temp.to_radians();
    let long_origin = f64::from((zone_number - 1) * 6 - 180 + 3);
    let long_origin_rad = long_origin.to_radians();

    let ecc2 = WGS84_ECC_SQUARED;
    let ecc_prime2 = ecc2 / (1.0 - ecc2);

    let n = WGS84_RADIUS / (1.0 - ecc2 * lat_rad.sin() * lat_rad.sin()).sqrt();
    let t = lat_rad.tan() * lat_rad.tan();
    let c = ecc_prime2 * lat_rad.cos() * lat_rad.cos();
    let a = lat_rad.cos() * (long_rad - long_origin_rad);

    // Meridian arc length from the equator.
    let m = WGS84_RADIUS
        * ((1.0 - ecc2 / 4.0 - 3.0 * ecc2 * ecc2 / 64.0 - 5.0 * ecc2 * ecc2 * ecc2 / 256.0)
            * lat_rad
            - (3.0 * ecc2 / 8.0 + 3.0 * ecc2 * ecc2 / 32.0 + 45.0 * ecc2 * ecc2 * ecc2 / 1024.0)
                * (2.0 * lat_rad).sin()
            + (15.0 * ecc2 * ecc2 / 256.0 + 45.0 * ecc2 * ecc2 * ecc2 / 1024.0)
                * (4.0 * lat_rad).sin()
            - (35.0 * ecc2 * ecc2 * ecc2 / 3072.0) * (6.0 * lat_rad).sin());

    let easting = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ecc_prime2) * a.powi(5) / 120.0)
        + FALSE_EASTING;

    let mut northing = K0
        * (m + n
            * lat_rad.tan()
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ecc_prime2) * a.powi(6) / 720.0));
    if latitude < 0.0 {
        northing += FALSE_NORTHING;
    }

    Some(EnUtm {
        northing: northing.round() as i64,
        easting: easting.round() as i64,
        zone: format!("{}{}", zone_number, band_letter(latitude)),
    })
}

/// Zone number for a normalized longitude, with the standard exceptions
/// for southwest Norway (zone 32V) and Svalbard (zones 31X–37X).
fn zone_for(longitude: f64, latitude: f64) -> i32 {
    if (56.0..64.0).contains(&latitude) && (3.0..12.0).contains(&longitude) {
        return 32;
    }
    if (72.0..84.0).contains(&latitude) {
        if (0.0..9.0).contains(&longitude) {
            return 31;
        } else if (9.0..21.0).contains(&longitude) {
            return 33;
        } else if (21.0..33.0).contains(&longitude) {
            return 35;
        } else if (33.0..42.0).contains(&longitude) {
            return 37;
        }
    }
    ((longitude + 180.0) / 6.0).floor() as i32 + 1
}

/// MGRS latitude band letter. Latitudes outside the -80°..84° band carry
/// the conventional `Z` marker.
fn band_letter(latitude: f64) -> char {
    match latitude {
        l if (72.0..=84.0).contains(&l) => 'X',
        l if (64.0..72.0).contains(&l) => 'W',
        l if (56.0..64.0).contains(&l) => 'V',
        l if (48.0..56.0).contains(&l) => 'U',
        l if (40.0..48.0).contains(&l) => 'T',
        l if (32.0..40.0).contains(&l) => 'S',
        l if (24.0..32.0).contains(&l) => 'R',
        l if (16.0..24.0).contains(&l) => 'Q',
        l if (8.0..16.0).contains(&l) => 'P',
        l if (0.0..8.0).contains(&l) => 'N',
        l if (-8.0..0.0).contains(&l) => 'M',
        l if (-16.0..-8.0).contains(&l) => 'L',
        l if (-24.0..-16.0).contains(&l) => 'K',
        l if (-32.0..-24.0).contains(&l) => 'J',
        l if (-40.0..-32.0).contains(&l) => 'H',
        l if (-48.0..-40.0).contains(&l) => 'G',
        l if (-56.0..-48.0).contains(&l) => 'F',
        l if (-64.0..-56.0).contains(&l) => 'E',
        l if (-72.0..-64.0).contains(&l) => 'D',
        l if (-80.0..-72.0).contains(&l) => 'C',
        _ => 'Z',
    }
}
