//! Data layers rendered by the map panel.
//!
//! A panel shows an OSM-style [`BackgroundLayer`] at the bottom, one [`WmsLayer`] per
//! configured data set on top of it, and a [`HighlightLayer`] isolating the selected
//! feature above everything else. The engine only keeps the state of these layers;
//! fetching and drawing the imagery is the renderer's job.

use serde::{Deserialize, Serialize};

mod highlight;
mod wms;

pub use highlight::{HighlightLayer, HighlightTarget, DIMMED_OPACITY};
pub use wms::WmsSource;

/// Configuration entry describing one WMS data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Stable identifier the UI uses to address the layer, e.g. `water`.
    pub key: String,
    /// Fully qualified remote layer name, e.g. `city_project:water_bodies_polygon`.
    pub name: String,
    /// Whether the layer is initially visible.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Initial layer opacity.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl LayerConfig {
    /// Creates a visible, fully opaque layer configuration.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            visible: default_visible(),
            opacity: default_opacity(),
        }
    }
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

/// Descriptor of one WMS-rendered data layer.
///
/// The descriptor keeps two opacities: the one configured by the user and the effective
/// one the renderer applies. They differ only while a feature is highlighted, when every
/// data layer is dimmed to [`DIMMED_OPACITY`].
#[derive(Debug, Clone, PartialEq)]
pub struct WmsLayer {
    key: String,
    name: String,
    visible: bool,
    opacity: f32,
    effective_opacity: f32,
}

impl WmsLayer {
    /// Creates a visible, fully opaque layer.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            visible: true,
            opacity: 1.0,
            effective_opacity: 1.0,
        }
    }

    /// Stable identifier of the layer.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Remote layer name used in WMS requests.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the layer is rendered.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the layer.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Opacity configured for the layer.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Sets the configured opacity. The effective opacity is re-derived by the engine on
    /// the next highlight synchronization.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Opacity the renderer must apply right now.
    pub fn effective_opacity(&self) -> f32 {
        self.effective_opacity
    }

    pub(crate) fn set_effective_opacity(&mut self, opacity: f32) {
        self.effective_opacity = opacity;
    }
}

impl From<LayerConfig> for WmsLayer {
    fn from(config: LayerConfig) -> Self {
        Self {
            key: config.key,
            name: config.name,
            visible: config.visible,
            opacity: config.opacity,
            effective_opacity: config.opacity,
        }
    }
}

/// The OSM-style base layer drawn under all data layers.
///
/// Holds the tile URL template with `{z}`, `{x}` and `{y}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundLayer {
    url_template: String,
}

impl BackgroundLayer {
    /// Creates a background layer from a tile URL template.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }

    /// URL of the tile with the given index.
    pub fn tile_url(&self, z: u32, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}
