//! Turning raw ring JSON into usable rings.

use geo::{Coord, LineString, Polygon};
use serde_json::Value;

/// Best-effort cleanup of a raw ring list.
///
/// Keeps positions that are `[lng, lat]` pairs of numbers or numeric strings,
/// closes open rings and drops rings that end up with fewer than 4 positions.
/// Returns `None` when no ring survives.
pub fn sanitize_rings(raw: &Value) -> Option<Vec<LineString<f64>>> {
    let rings: Vec<LineString<f64>> = raw.as_array()?.iter().filter_map(sanitize_ring).collect();

    if rings.is_empty() {
        None
    } else {
        Some(rings)
    }
}

fn sanitize_ring(raw: &Value) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = raw
        .as_array()?
        .iter()
        .filter_map(|position| parse_position(position, coerce_number))
        .collect();

    if coords.len() < 3 {
        return None;
    }

    // Close the ring if needed
    if coords.first() != coords.last() {
        coords.push(coords[0]);
    }

    if coords.len() < 4 {
        return None;
    }

    Some(LineString::new(coords))
}

/// Strict check of a raw ring list.
///
/// Unlike [`sanitize_rings`] nothing is repaired: every ring must already be
/// closed, hold at least 4 positions, and every position must be a pair of JSON
/// numbers. A single bad ring or position rejects the whole list.
pub fn validate_rings(raw: &Value) -> Option<Vec<LineString<f64>>> {
    let rings = raw.as_array()?;
    if rings.is_empty() {
        return None;
    }

    rings.iter().map(validate_ring).collect()
}

fn validate_ring(raw: &Value) -> Option<LineString<f64>> {
    let coords: Vec<Coord<f64>> = raw
        .as_array()?
        .iter()
        .map(|position| parse_position(position, strict_number))
        .collect::<Option<_>>()?;

    if coords.len() < 4 || coords.first() != coords.last() {
        return None;
    }

    Some(LineString::new(coords))
}

/// Build a polygon from rings; the first ring is the exterior, the rest are holes.
pub fn polygon_from_rings(mut rings: Vec<LineString<f64>>) -> Option<Polygon<f64>> {
    if rings.is_empty() {
        return None;
    }
    let exterior = rings.remove(0);
    Some(Polygon::new(exterior, rings))
}

fn parse_position(raw: &Value, number: fn(&Value) -> Option<f64>) -> Option<Coord<f64>> {
    match raw.as_array()?.as_slice() {
        [x, y] => Some(Coord {
            x: number(x)?,
            y: number(y)?,
        }),
        _ => None,
    }
}

fn coerce_number(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn strict_number(raw: &Value) -> Option<f64> {
    raw.as_f64().filter(|n| n.is_finite())
}
