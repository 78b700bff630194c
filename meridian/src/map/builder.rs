//! Convenience builder for [`MapEngine`].

use geo_types::Point;

use super::MapEngine;
use crate::layer::{BackgroundLayer, LayerConfig, WmsSource};
use crate::messenger::Messenger;
use crate::view::{MapView, ViewportSize};

// z-level 4 on the standard web tile scheme
const DEFAULT_RESOLUTION: f64 = 156543.03392800014 / 16.0;
const DEFAULT_VIEWPORT: ViewportSize = ViewportSize::new(1024, 768);
const DEFAULT_BACKGROUND: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Convenience type to initialize a [`MapEngine`].
///
/// ```no_run
/// use meridian::layer::LayerConfig;
/// use meridian::MapEngineBuilder;
///
/// let mut engine = MapEngineBuilder::new("http://localhost:8081/geoserver/wms")
///     .with_latlon(19.197, 72.966)
///     .with_layer(LayerConfig::new("water", "city_project:water_bodies_polygon"))
///     .with_layer(LayerConfig::new("building", "city_project:building"))
///     .build();
///
/// engine.initialize("map-root");
/// ```
pub struct MapEngineBuilder {
    wms: WmsSource,
    center: Point<f64>,
    resolution: f64,
    size: ViewportSize,
    background: BackgroundLayer,
    layers: Vec<LayerConfig>,
    messenger: Option<Box<dyn Messenger>>,
}

impl MapEngineBuilder {
    /// Creates a builder for a panel served by the given WMS endpoint.
    pub fn new(wms_url: impl Into<String>) -> Self {
        Self {
            wms: WmsSource::new(wms_url),
            center: Point::new(0.0, 0.0),
            resolution: DEFAULT_RESOLUTION,
            size: DEFAULT_VIEWPORT,
            background: BackgroundLayer::new(DEFAULT_BACKGROUND),
            layers: Vec::new(),
            messenger: None,
        }
    }

    /// Sets the center point of the initial view.
    pub fn with_latlon(mut self, lat: f64, lon: f64) -> Self {
        self.center = Point::new(lon, lat);
        self
    }

    /// Sets the resolution of the initial view in EPSG:3857 meters per pixel.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the size of the viewport in pixels.
    pub fn with_viewport_size(mut self, width: u32, height: u32) -> Self {
        self.size = ViewportSize::new(width, height);
        self
    }

    /// Sets the tile URL template of the background layer. The default is the standard
    /// OSM tile service.
    pub fn with_background_tiles(mut self, url_template: impl Into<String>) -> Self {
        self.background = BackgroundLayer::new(url_template);
        self
    }

    /// Adds a data layer on top of the stack.
    pub fn with_layer(mut self, config: LayerConfig) -> Self {
        self.layers.push(config);
        self
    }

    /// Adds several data layers in stack order.
    pub fn with_layers(mut self, configs: impl IntoIterator<Item = LayerConfig>) -> Self {
        self.layers.extend(configs);
        self
    }

    /// Sets a [`Messenger`] implementation for the engine.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.messenger = Some(Box::new(messenger));
        self
    }

    /// Consumes the builder and creates an engine instance.
    ///
    /// The engine holds the layer configuration but builds the rendering layer stack
    /// only when [`MapEngine::initialize`] is called.
    pub fn build(self) -> MapEngine {
        let view = MapView::new(self.center, self.resolution, self.size);
        MapEngine::new(view, self.wms, self.background, self.layers, self.messenger)
    }
}
