//! Current state of the map viewport and coordinate transforms.

use geo_types::{Coord, Point};

const WGS84_SEMIMAJOR: f64 = 6_378_137.0;

/// Position on the screen in pixels from the top-left corner of the map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPosition {
    /// Horizontal offset in pixels.
    pub x: f64,
    /// Vertical offset in pixels.
    pub y: f64,
}

impl ScreenPosition {
    /// Creates a new screen position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the map viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    width: u32,
    height: u32,
}

impl ViewportSize {
    /// Creates a new viewport size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the viewport in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the viewport in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// View of the map: the point the camera looks at, the scale and the size of the
/// rendering surface.
///
/// The view is all a layer needs to request the right imagery, and all the engine needs
/// to convert between screen pixels and geographic coordinates. Geographic points are
/// lon/lat degrees (`x` is longitude); projected coordinates are EPSG:3857 meters.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    center: Point<f64>,
    resolution: f64,
    size: ViewportSize,
}

impl MapView {
    /// Creates a new view centered at the given lon/lat point.
    ///
    /// `resolution` is the size of one screen pixel in EPSG:3857 meters.
    pub fn new(center: Point<f64>, resolution: f64, size: ViewportSize) -> Self {
        Self {
            center,
            resolution,
            size,
        }
    }

    /// The point the view is centered at, lon/lat degrees.
    pub fn center(&self) -> Point<f64> {
        self.center
    }

    /// Size of one screen pixel in EPSG:3857 meters.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Size of the viewport in pixels.
    pub fn size(&self) -> ViewportSize {
        self.size
    }

    /// Returns a copy of the view centered at another point.
    pub fn with_center(&self, center: Point<f64>) -> Self {
        Self {
            center,
            ..self.clone()
        }
    }

    /// Returns a copy of the view with another resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        Self {
            resolution,
            ..self.clone()
        }
    }

    /// Returns a copy of the view with another viewport size.
    pub fn with_size(&self, size: ViewportSize) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    /// Projects a lon/lat point into EPSG:3857.
    ///
    /// Returns `None` for points the projection is not defined for (the poles).
    pub fn project(point: Point<f64>) -> Option<Coord<f64>> {
        let x = WGS84_SEMIMAJOR * point.x().to_radians();
        let y = WGS84_SEMIMAJOR
            * (std::f64::consts::FRAC_PI_4 + point.y().to_radians() / 2.0)
                .tan()
                .ln();

        if x.is_finite() && y.is_finite() {
            Some(Coord { x, y })
        } else {
            None
        }
    }

    /// Unprojects an EPSG:3857 coordinate back to lon/lat degrees.
    pub fn unproject(coord: Coord<f64>) -> Point<f64> {
        let lon = (coord.x / WGS84_SEMIMAJOR).to_degrees();
        let lat = (2.0 * (coord.y / WGS84_SEMIMAJOR).exp().atan() - std::f64::consts::FRAC_PI_2)
            .to_degrees();

        Point::new(lon, lat)
    }

    /// Bounding box of the viewport in EPSG:3857: `[min_x, min_y, max_x, max_y]`.
    pub fn bbox(&self) -> Option<[f64; 4]> {
        let center = Self::project(self.center)?;
        let half_width = self.size.width() as f64 / 2.0 * self.resolution;
        let half_height = self.size.height() as f64 / 2.0 * self.resolution;

        Some([
            center.x - half_width,
            center.y - half_height,
            center.x + half_width,
            center.y + half_height,
        ])
    }

    /// Converts a screen position into a lon/lat point.
    pub fn screen_to_geo(&self, position: ScreenPosition) -> Option<Point<f64>> {
        let center = Self::project(self.center)?;
        let dx = (position.x - self.size.width() as f64 / 2.0) * self.resolution;
        let dy = (self.size.height() as f64 / 2.0 - position.y) * self.resolution;

        Some(Self::unproject(Coord {
            x: center.x + dx,
            y: center.y + dy,
        }))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn test_view() -> MapView {
        MapView::new(Point::new(37.6176, 55.7558), 10.0, ViewportSize::new(800, 600))
    }

    #[test]
    fn projection_round_trip() {
        let point = Point::new(37.6176, 55.7558);
        let projected = MapView::project(point).expect("point is projectable");
        let unprojected = MapView::unproject(projected);

        assert_relative_eq!(unprojected.x(), point.x(), epsilon = 1e-9);
        assert_relative_eq!(unprojected.y(), point.y(), epsilon = 1e-9);
    }

    #[test]
    fn poles_are_not_projectable() {
        assert!(MapView::project(Point::new(0.0, 90.0)).is_none());
    }

    #[test]
    fn viewport_center_maps_to_view_center() {
        let view = test_view();
        let center = view
            .screen_to_geo(ScreenPosition::new(400.0, 300.0))
            .expect("center is projectable");

        assert_relative_eq!(center.x(), view.center().x(), epsilon = 1e-9);
        assert_relative_eq!(center.y(), view.center().y(), epsilon = 1e-9);
    }

    #[test]
    fn screen_y_axis_points_down() {
        let view = test_view();
        let above = view
            .screen_to_geo(ScreenPosition::new(400.0, 0.0))
            .expect("point is projectable");

        assert!(above.y() > view.center().y());
    }

    #[test]
    fn bbox_spans_viewport() {
        let view = test_view();
        let bbox = view.bbox().expect("center is projectable");

        assert_relative_eq!(bbox[2] - bbox[0], 800.0 * view.resolution());
        assert_relative_eq!(bbox[3] - bbox[1], 600.0 * view.resolution());
    }
}
