use serde::Deserialize;

use crate::geo_math::{kms_to_miles, meters_to_feet};

/// Options for itinerary to GeoJSON conversion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Include altitude as the 3rd coordinate value (default: true)
    #[serde(default = "default_true")]
    pub include_elevation: bool,

    /// Include names, descriptions and timestamps in properties (default: true)
    #[serde(default = "default_true")]
    pub include_metadata: bool,

    /// Include distance, climb and speed figures in properties (default: true)
    #[serde(default = "default_true")]
    pub include_statistics: bool,

    /// Which element types to convert (default: all)
    #[serde(default)]
    pub types: Option<Vec<ElementType>>,

    /// One feature per track instead of one per track segment (default: false)
    #[serde(default)]
    pub join_track_segments: bool,

    /// Units for statistics properties (default: metric)
    #[serde(default)]
    pub units: Units,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            include_elevation: true,
            include_metadata: true,
            include_statistics: true,
            types: None,
            join_track_segments: false,
            units: Units::default(),
        }
    }
}

impl ConvertOptions {
    pub fn should_include(&self, element_type: ElementType) -> bool {
        match &self.types {
            None => true,
            Some(types) => types.contains(&element_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Waypoint,
    Route,
    Track,
}

/// Metric figures are kilometers, meters and km/h; imperial figures are
/// miles, feet and mph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn name(self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn distance(self, kms: f64) -> f64 {
        match self {
            Units::Metric => kms,
            Units::Imperial => kms_to_miles(kms),
        }
    }

    pub fn height(self, meters: f64) -> f64 {
        match self {
            Units::Metric => meters,
            Units::Imperial => meters_to_feet(meters),
        }
    }

    pub fn speed(self, kms_per_hour: f64) -> f64 {
        self.distance(kms_per_hour)
    }
}

fn default_true() -> bool {
    true
}
