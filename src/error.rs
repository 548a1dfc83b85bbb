use std::fmt;

use wasm_bindgen::JsValue;

/// Failures at the edges of the crate: reading GPX and crossing the wasm
/// boundary. The geo functions themselves never fail.
#[derive(Debug)]
pub enum TripGeoError {
    /// The document is not well-formed XML.
    XmlParse(quick_xml::Error),
    /// A point element lacks its `lat` or `lon` attribute.
    MissingCoordinate {
        element: &'static str,
        attribute: &'static str,
    },
    /// A `lat` or `lon` attribute is not a number.
    InvalidCoordinate {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
    /// The options object passed from JavaScript has the wrong shape.
    InvalidOptions(serde_wasm_bindgen::Error),
    /// The location array passed from JavaScript has the wrong shape.
    InvalidLocations(String),
    Serialize(String),
}

impl TripGeoError {
    /// Whether the error only affects one point, which is then skipped.
    pub fn is_point_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCoordinate { .. } | Self::InvalidCoordinate { .. }
        )
    }
}

impl fmt::Display for TripGeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XmlParse(e) => write!(f, "Malformed GPX: {e}"),
            Self::MissingCoordinate { element, attribute } => {
                write!(f, "<{element}> has no '{attribute}' coordinate")
            }
            Self::InvalidCoordinate {
                element,
                attribute,
                value,
            } => write!(f, "<{element}> has an invalid '{attribute}' coordinate '{value}'"),
            Self::InvalidOptions(e) => write!(f, "Invalid conversion options: {e}"),
            Self::InvalidLocations(reason) => write!(f, "Invalid locations: {reason}"),
            Self::Serialize(reason) => write!(f, "Could not serialize result: {reason}"),
        }
    }
}

impl std::error::Error for TripGeoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::XmlParse(e) => Some(e),
            Self::InvalidOptions(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for TripGeoError {
    fn from(e: quick_xml::Error) -> Self {
        Self::XmlParse(e)
    }
}

impl From<quick_xml::events::attributes::AttrError> for TripGeoError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(e.into())
    }
}

impl From<serde_json::Error> for TripGeoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e.to_string())
    }
}

impl From<TripGeoError> for JsValue {
    fn from(e: TripGeoError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
