//! WMS request URLs and legend retrieval.

use bytes::Bytes;

use crate::view::{MapView, ScreenPosition};

/// A single WMS endpoint serving map tiles, feature info documents and legend images.
///
/// All requests of the panel go to one endpoint and differ only in their query
/// parameters, so the source is little more than a URL factory. Only the feature info
/// request depends on the current [`MapView`]: WMS resolves the queried point from the
/// request bbox, the viewport size and the click pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct WmsSource {
    base_url: String,
}

impl WmsSource {
    /// Creates a source for the given endpoint URL, e.g.
    /// `http://localhost:8081/geoserver/wms`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// The endpoint URL all requests go to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GetMap request for one tile of the given layer.
    ///
    /// `bbox` is `[min_x, min_y, max_x, max_y]` in EPSG:3857.
    pub fn map_url(&self, layer_name: &str, bbox: [f64; 4], width: u32, height: u32) -> String {
        format!(
            "{}?SERVICE=WMS&VERSION=1.1.1&REQUEST=GetMap&LAYERS={layer_name}&STYLES=\
             &SRS=EPSG:3857&BBOX={},{},{},{}&WIDTH={width}&HEIGHT={height}\
             &FORMAT=image/png&TILED=true&TRANSPARENT=true",
            self.base_url, bbox[0], bbox[1], bbox[2], bbox[3],
        )
    }

    /// GetFeatureInfo request for the feature at the given screen position.
    ///
    /// `buffer` is the pixel tolerance around the click point, `feature_count` caps the
    /// number of candidates the service may return.
    pub fn feature_info_url(
        &self,
        layer_name: &str,
        view: &MapView,
        position: ScreenPosition,
        buffer: u32,
        feature_count: u32,
    ) -> Option<String> {
        let bbox = view.bbox()?;
        let size = view.size();

        Some(format!(
            "{}?SERVICE=WMS&VERSION=1.1.1&REQUEST=GetFeatureInfo&LAYERS={layer_name}\
             &QUERY_LAYERS={layer_name}&STYLES=&SRS=EPSG:3857&BBOX={},{},{},{}\
             &WIDTH={}&HEIGHT={}&X={}&Y={}&INFO_FORMAT=application/json\
             &FEATURE_COUNT={feature_count}&BUFFER={buffer}",
            self.base_url,
            bbox[0],
            bbox[1],
            bbox[2],
            bbox[3],
            size.width(),
            size.height(),
            position.x.round() as i64,
            position.y.round() as i64,
        ))
    }

    /// GetLegendGraphic request for the layer's legend image.
    pub fn legend_url(&self, layer_name: &str) -> String {
        format!(
            "{}?REQUEST=GetLegendGraphic&VERSION=1.0.0&FORMAT=image/png&LAYER={layer_name}\
             &LEGEND_OPTIONS=fontColor:0xFFFFFF;fontSize:10&TRANSPARENT=true",
            self.base_url,
        )
    }

    /// Downloads the legend image of the layer.
    ///
    /// A missing legend is not an error of the panel: any failure is logged at debug
    /// level and the caller gets `None`, hiding the image.
    pub async fn load_legend(&self, client: &reqwest::Client, layer_name: &str) -> Option<Bytes> {
        let url = self.legend_url(layer_name);

        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                log::debug!("legend request for {layer_name} failed: {error}");
                return None;
            }
        };

        if !response.status().is_success() {
            log::debug!(
                "legend request for {layer_name} answered {}",
                response.status()
            );
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                log::debug!("legend response for {layer_name} could not be read: {error}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use geo_types::Point;

    use super::*;
    use crate::view::ViewportSize;

    fn test_source() -> WmsSource {
        WmsSource::new("http://localhost:8081/geoserver/wms")
    }

    fn test_view() -> MapView {
        MapView::new(Point::new(0.0, 0.0), 10.0, ViewportSize::new(800, 600))
    }

    #[test]
    fn map_url_contains_tiling_parameters() {
        let url = test_source().map_url("city:building", [0.0, 0.0, 100.0, 100.0], 256, 256);

        assert!(url.starts_with("http://localhost:8081/geoserver/wms?"));
        assert!(url.contains("REQUEST=GetMap"));
        assert!(url.contains("LAYERS=city:building"));
        assert!(url.contains("BBOX=0,0,100,100"));
        assert!(url.contains("TILED=true"));
        assert!(url.contains("TRANSPARENT=true"));
    }

    #[test]
    fn feature_info_url_queries_the_click_pixel() {
        let url = test_source()
            .feature_info_url(
                "city:building",
                &test_view(),
                ScreenPosition::new(400.3, 299.7),
                5,
                1,
            )
            .expect("view center is projectable");

        assert!(url.contains("REQUEST=GetFeatureInfo"));
        assert!(url.contains("LAYERS=city:building"));
        assert!(url.contains("QUERY_LAYERS=city:building"));
        assert!(url.contains("BBOX=-4000,-3000,4000,3000"));
        assert!(url.contains("WIDTH=800&HEIGHT=600"));
        assert!(url.contains("X=400&Y=300"));
        assert!(url.contains("INFO_FORMAT=application/json"));
        assert!(url.contains("FEATURE_COUNT=1"));
        assert!(url.contains("BUFFER=5"));
    }

    #[test]
    fn legend_url_carries_display_options() {
        let url = test_source().legend_url("city:road_line");

        assert!(url.contains("REQUEST=GetLegendGraphic"));
        assert!(url.contains("LAYER=city:road_line"));
        assert!(url.contains("LEGEND_OPTIONS=fontColor:0xFFFFFF;fontSize:10"));
    }
}
