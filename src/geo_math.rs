use std::f64::consts::PI;

use crate::location::Location;

/// Mean radius of the Earth in kilometers.
pub const EARTH_MEAN_RADIUS_KMS: f64 = 6371.0;
pub const KMS_PER_MILE: f64 = 1.609344;
pub const METERS_PER_FOOT: f64 = 0.3048;

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// `sin²(θ/2)`
pub fn haversine(angle: f64) -> f64 {
    (angle / 2.0).sin().powi(2)
}

/// Great-circle distance in kilometers between two lng/lat pairs, using the
/// haversine formula over the Earth's mean radius.
pub fn distance(lng1: f64, lat1: f64, lng2: f64, lat2: f64) -> f64 {
    let x1 = degrees_to_radians(lng1);
    let y1 = degrees_to_radians(lat1);
    let x2 = degrees_to_radians(lng2);
    let y2 = degrees_to_radians(lat2);

    let h = haversine(y2 - y1)
        + (1.0 - haversine(y1 - y2) - haversine(y1 + y2)) * haversine(x2 - x1);
    2.0 * EARTH_MEAN_RADIUS_KMS * h.sqrt().asin()
}

pub fn distance_between(p1: &Location, p2: &Location) -> f64 {
    distance(p1.longitude, p1.latitude, p2.longitude, p2.latitude)
}

/// Initial bearing from the first point towards the second, in degrees
/// clockwise from north within `[0, 360)`.
pub fn bearing_to_azimuth(lng1: f64, lat1: f64, lng2: f64, lat2: f64) -> f64 {
    let lat1 = degrees_to_radians(lat1);
    let lat2 = degrees_to_radians(lat2);
    let delta_lng = degrees_to_radians(lng2 - lng1);

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();
    let bearing = radians_to_degrees(y.atan2(x));
    if bearing < 0.0 { bearing + 360.0 } else { bearing }
}

pub fn bearing_between(from: &Location, to: &Location) -> f64 {
    bearing_to_azimuth(from.longitude, from.latitude, to.longitude, to.latitude)
}

pub fn kms_to_miles(kms: f64) -> f64 {
    kms / KMS_PER_MILE
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters / METERS_PER_FOOT
}
