pub mod bounding_box;
pub mod converter;
pub mod error;
pub mod geo_math;
pub mod itinerary;
pub mod location;
pub mod map_path;
pub mod motion;
pub mod options;
pub mod parser;
pub mod statistics;

use geojson::FeatureCollection;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::TripGeoError;
use crate::location::Location;
use crate::map_path::MapPathBuilder;
use crate::options::ConvertOptions;

/// Convert GPX string to GeoJSON, returned as a JS object.
#[wasm_bindgen(js_name = gpxToGeoJson)]
pub fn gpx_to_geojson(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let fc = convert(gpx_string, options)?;
    Ok(to_js(&fc)?)
}

/// Convert GPX string to GeoJSON, returned as a JSON string.
#[wasm_bindgen(js_name = gpxToGeoJsonString)]
pub fn gpx_to_geojson_string(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let fc = convert(gpx_string, options)?;
    Ok(serde_json::to_string(&fc).map_err(TripGeoError::from)?)
}

/// Geometry for an array of `{lng, lat, altitude?}` objects, cut at the
/// antimeridian. Returns `null` for an empty array.
#[wasm_bindgen(js_name = pathToGeoJson)]
pub fn path_to_geojson(points: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let points = parse_points(points)?;
    let mut builder = MapPathBuilder::new();
    builder.add_path(&points);
    Ok(to_js(&builder.as_geojson())?)
}

/// Distance, ascent, descent and altitude range of an array of
/// `{lng, lat, altitude?}` objects. Absent figures are left out.
#[wasm_bindgen(js_name = pathStatistics)]
pub fn path_statistics(points: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let points = parse_points(points)?;
    Ok(to_js(&statistics::path_statistics(&points))?)
}

/// Great-circle distance in kilometers.
#[wasm_bindgen]
pub fn distance(lng1: f64, lat1: f64, lng2: f64, lat2: f64) -> f64 {
    geo_math::distance(lng1, lat1, lng2, lat2)
}

/// Initial bearing in degrees from north, within `[0, 360)`.
#[wasm_bindgen]
pub fn bearing(lng1: f64, lat1: f64, lng2: f64, lat2: f64) -> f64 {
    geo_math::bearing_to_azimuth(lng1, lat1, lng2, lat2)
}

fn convert(gpx_string: &str, options: JsValue) -> Result<FeatureCollection, TripGeoError> {
    let opts = parse_options(options)?;
    let itinerary = parser::parse_gpx(gpx_string)?;
    Ok(converter::to_feature_collection(&itinerary, &opts))
}

fn parse_options(options: JsValue) -> Result<ConvertOptions, TripGeoError> {
    if options.is_undefined() || options.is_null() {
        Ok(ConvertOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(TripGeoError::InvalidOptions)
    }
}

fn parse_points(points: JsValue) -> Result<Vec<Location>, TripGeoError> {
    if !js_sys::Array::is_array(&points) {
        return Err(TripGeoError::InvalidLocations(
            "expected an array".to_string(),
        ));
    }
    serde_wasm_bindgen::from_value(points)
        .map_err(|e| TripGeoError::InvalidLocations(e.to_string()))
}

/// Serialise as plain JS objects, keeping `null` coordinate placeholders and
/// a `null` geometry rather than turning them into `undefined`.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, TripGeoError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| TripGeoError::Serialize(e.to_string()))
}
