use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};

use crate::error::TripGeoError;
use crate::itinerary::*;
use crate::location::Location;

type Result<T> = std::result::Result<T, TripGeoError>;
type XmlReader<'a> = Reader<&'a [u8]>;

/// Everything read from a `wpt`, `rtept` or `trkpt` element.
#[derive(Debug, Default)]
struct PointRecord {
    location: Location,
    time: Option<DateTime<Utc>>,
    hdop: Option<f32>,
    name: Option<String>,
    comment: Option<String>,
    description: Option<String>,
    symbol: Option<String>,
    point_type: Option<String>,
}

impl PointRecord {
    fn into_waypoint(self) -> Waypoint {
        Waypoint {
            location: self.location,
            time: self.time,
            name: self.name,
            comment: self.comment,
            description: self.description,
            symbol: self.symbol,
            waypoint_type: self.point_type,
        }
    }

    fn into_track_point(self) -> TrackPoint {
        TrackPoint {
            location: self.location,
            time: self.time,
            hdop: self.hdop,
            speed: None,
            bearing: None,
        }
    }
}

/// Parse a GPX document into an itinerary.
///
/// Points without usable `lat`/`lon` attributes and timestamps that are not
/// RFC 3339 are dropped with a warning; malformed XML is an error.
pub fn parse_gpx(xml: &str) -> Result<Itinerary> {
    let mut reader = Reader::from_str(xml);
    let mut itinerary = Itinerary::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"wpt" => {
                    if let Some(pt) = parse_point(&e, &mut reader)? {
                        itinerary.waypoints.push(pt.into_waypoint());
                    }
                }
                b"rte" => itinerary.routes.push(parse_route(&mut reader)?),
                b"trk" => itinerary.tracks.push(parse_track(&mut reader)?),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"wpt" => {
                if let Some(pt) = point_record(&e)? {
                    itinerary.waypoints.push(pt.into_waypoint());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    tracing::debug!(
        waypoints = itinerary.waypoints.len(),
        routes = itinerary.routes.len(),
        tracks = itinerary.tracks.len(),
        "parsed GPX document"
    );
    Ok(itinerary)
}

fn parse_coordinate(element: &'static str, attribute: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| TripGeoError::InvalidCoordinate {
            element,
            attribute,
            value: value.to_string(),
        })
}

/// Read the lat/lon attributes of a point element's start tag.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<(f64, f64)> {
    let element = match e.local_name().as_ref() {
        b"rtept" => "rtept",
        b"trkpt" => "trkpt",
        _ => "wpt",
    };
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(parse_coordinate(element, "lat", &value)?),
            b"lon" => lon = Some(parse_coordinate(element, "lon", &value)?),
            _ => {}
        }
    }

    let lat = lat.ok_or(TripGeoError::MissingCoordinate {
        element,
        attribute: "lat",
    })?;
    let lon = lon.ok_or(TripGeoError::MissingCoordinate {
        element,
        attribute: "lon",
    })?;
    Ok((lat, lon))
}

/// A point record holding just the coordinates, or `None` if they are
/// missing or invalid.
fn point_record(e: &BytesStart<'_>) -> Result<Option<PointRecord>> {
    match parse_lat_lon(e) {
        Ok((lat, lon)) => Ok(Some(PointRecord {
            location: Location::new(lon, lat),
            ..Default::default()
        })),
        Err(e) if e.is_point_error() => {
            tracing::warn!("Skipping point: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(text.trim()) {
        Ok(time) => Some(time.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(time = text, "Ignoring invalid timestamp: {e}");
            None
        }
    }
}

/// Parse a point element (wpt, rtept, trkpt) and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut XmlReader<'a>,
) -> Result<Option<PointRecord>> {
    let Some(mut point) = point_record(start)? else {
        reader.read_to_end(start.name())?;
        return Ok(None);
    };
    let end_name = start.name().as_ref().to_vec();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ele" => point.location.altitude = read_text(reader, &e)?.trim().parse().ok(),
                b"time" => point.time = parse_time(&read_text(reader, &e)?),
                b"hdop" => point.hdop = read_text(reader, &e)?.trim().parse().ok(),
                b"name" => point.name = Some(read_text(reader, &e)?),
                b"cmt" => point.comment = Some(read_text(reader, &e)?),
                b"desc" => point.description = Some(read_text(reader, &e)?),
                b"sym" => point.symbol = Some(read_text(reader, &e)?),
                b"type" => point.point_type = Some(read_text(reader, &e)?),
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.name().as_ref() == end_name.as_slice() => break,
            Event::Eof => return Err(missing_end_tag(&end_name)),
            _ => {}
        }
    }

    Ok(Some(point))
}

/// Parse a <rte> element.
fn parse_route(reader: &mut XmlReader<'_>) -> Result<Route> {
    let mut route = Route::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => route.name = Some(read_text(reader, &e)?),
                b"cmt" => route.comment = Some(read_text(reader, &e)?),
                b"desc" => route.description = Some(read_text(reader, &e)?),
                b"type" => route.route_type = Some(read_text(reader, &e)?),
                b"rtept" => {
                    if let Some(pt) = parse_point(&e, reader)? {
                        route.points.push(pt.into_waypoint());
                    }
                }
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"rtept" => {
                if let Some(pt) = point_record(&e)? {
                    route.points.push(pt.into_waypoint());
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"rte" => break,
            Event::Eof => return Err(missing_end_tag(b"rte")),
            _ => {}
        }
    }

    Ok(route)
}

/// Parse a <trk> element. Segments without points are dropped.
fn parse_track(reader: &mut XmlReader<'_>) -> Result<Track> {
    let mut track = Track::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => track.name = Some(read_text(reader, &e)?),
                b"cmt" => track.comment = Some(read_text(reader, &e)?),
                b"desc" => track.description = Some(read_text(reader, &e)?),
                b"type" => track.track_type = Some(read_text(reader, &e)?),
                b"trkseg" => {
                    let segment = parse_segment(reader)?;
                    if !segment.points.is_empty() {
                        track.segments.push(segment);
                    }
                }
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"trk" => break,
            Event::Eof => return Err(missing_end_tag(b"trk")),
            _ => {}
        }
    }

    Ok(track)
}

/// Parse a <trkseg> element.
fn parse_segment(reader: &mut XmlReader<'_>) -> Result<TrackSegment> {
    let mut segment = TrackSegment::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"trkpt" => {
                if let Some(pt) = parse_point(&e, reader)? {
                    segment.points.push(pt.into_track_point());
                }
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::Empty(e) if e.local_name().as_ref() == b"trkpt" => {
                if let Some(pt) = point_record(&e)? {
                    segment.points.push(pt.into_track_point());
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"trkseg" => break,
            Event::Eof => return Err(missing_end_tag(b"trkseg")),
            _ => {}
        }
    }

    Ok(segment)
}

/// The document ended while `name` was still open.
fn missing_end_tag(name: &[u8]) -> TripGeoError {
    TripGeoError::XmlParse(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(
        String::from_utf8_lossy(name).into_owned(),
    )))
}

/// Skip an unknown element (extensions etc.) including its children.
fn skip_element(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<()> {
    reader.read_to_end(start.name())?;
    Ok(())
}

fn predefined_entity(name: &[u8]) -> Option<char> {
    match name {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        _ => None,
    }
}

/// Read the text content of an element, including CDATA sections and
/// character or predefined entity references.
fn read_text(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().as_ref().to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else if let Some(ch) = predefined_entity(e.as_ref()) {
                    text.push(ch);
                }
            }
            Event::End(e) if e.name().as_ref() == end_name.as_slice() => break,
            Event::Eof => return Err(missing_end_tag(&end_name)),
            _ => {}
        }
    }

    Ok(text)
}
