//! Distance and area measuring: geodesic math and display formatting.
//!
//! Measurements are always computed on the WGS84 ellipsoid, never in planar pixel
//! space, so they stay correct at any latitude.

use geo::{GeodesicArea, GeodesicLength, InteriorPoint};
use geo_types::{LineString, Point, Polygon};

mod session;
mod tooltip;

pub use session::{DrawSession, MeasureController, Measurement};
pub use tooltip::{MeasureTooltip, TooltipId, TooltipStore, TooltipStyle};

const METERS_DISPLAY_LIMIT: f64 = 100.0;
const SQUARE_METERS_DISPLAY_LIMIT: f64 = 10_000.0;

/// Kind of measurement a drawing produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    /// Geodesic length of a drawn line.
    Distance,
    /// Geodesic area of a drawn polygon.
    Area,
}

/// Formats a geodesic length for display.
///
/// Lengths up to 100 meters are shown in meters, anything longer in kilometers, both
/// rounded to two decimal places.
pub fn format_length(meters: f64) -> String {
    if meters > METERS_DISPLAY_LIMIT {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{meters:.2} m")
    }
}

/// Formats a geodesic area for display.
///
/// Areas up to 10,000 m² are shown in m², anything larger in km², both rounded to two
/// decimal places.
pub fn format_area(square_meters: f64) -> String {
    if square_meters > SQUARE_METERS_DISPLAY_LIMIT {
        format!("{:.2} km²", square_meters / 1_000_000.0)
    } else {
        format!("{square_meters:.2} m²")
    }
}

/// Geodesic length of the line through the given lon/lat vertices, in meters.
pub fn line_length(vertices: &[Point<f64>]) -> f64 {
    LineString::from(vertices.to_vec()).geodesic_length()
}

/// Geodesic area of the polygon with the given lon/lat outer ring, in square meters.
pub fn ring_area(vertices: &[Point<f64>]) -> f64 {
    ring_polygon(vertices).geodesic_area_unsigned()
}

/// The point a measurement label is anchored to: the last vertex of a line, an interior
/// point of a polygon.
pub fn representative_point(kind: MeasureKind, vertices: &[Point<f64>]) -> Option<Point<f64>> {
    match kind {
        MeasureKind::Distance => vertices.last().copied(),
        MeasureKind::Area => ring_polygon(vertices).interior_point(),
    }
}

/// Display string for a drawing with the given vertices.
pub fn measurement_text(kind: MeasureKind, vertices: &[Point<f64>]) -> String {
    match kind {
        MeasureKind::Distance => format_length(line_length(vertices)),
        MeasureKind::Area => format_area(ring_area(vertices)),
    }
}

fn ring_polygon(vertices: &[Point<f64>]) -> Polygon<f64> {
    Polygon::new(LineString::from(vertices.to_vec()), Vec::new())
}
