//! Point feature queries against the WMS layer stack.
//!
//! A cursor-mode click produces a [`FeatureQuery`]: a snapshot of the view, the click
//! position and the visible layers ordered top-most first. The
//! [`FeatureQueryResolver`] walks that stack issuing one GetFeatureInfo request per
//! layer until the first feature is found. Queries carry a sequence number so the
//! engine can discard results that were overtaken by a newer click
//! (last-resolved-wins).

use async_trait::async_trait;
use bytes::Bytes;
use geojson::{FeatureCollection, GeoJson};

use crate::error::MeridianError;
use crate::layer::WmsSource;
use crate::view::{MapView, ScreenPosition};

/// Default pixel tolerance around the click point.
pub const DEFAULT_BUFFER_PX: u32 = 5;
/// Default cap on the number of candidates a layer may return.
pub const DEFAULT_FEATURE_COUNT: u32 = 1;

/// One feature picked from a data layer by a point query.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFeature {
    /// Stable identifier of the feature within its source layer.
    pub id: String,
    /// Key of the data layer the feature came from.
    pub layer_key: String,
    /// Feature attributes as returned by the service.
    pub properties: geojson::JsonObject,
    /// Raw geometry payload. Decoded on demand for the highlight outline.
    pub geometry: Option<geojson::Geometry>,
}

impl SelectedFeature {
    /// Returns the attribute with the given name, if present.
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }

    /// Decodes the raw geometry payload into a vector geometry.
    ///
    /// Returns `None` when the feature came without geometry or the payload cannot be
    /// decoded; the failure is logged and the caller is expected to carry on without
    /// the outline.
    pub fn decode_geometry(&self) -> Option<geo_types::Geometry<f64>> {
        let raw = self.geometry.as_ref()?;
        match geo_types::Geometry::<f64>::try_from(raw.clone()) {
            Ok(geometry) => Some(geometry),
            Err(error) => {
                log::warn!("failed to decode geometry of feature {}: {error}", self.id);
                None
            }
        }
    }
}

/// A prepared point query over the visible layer stack.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureQuery {
    /// Number of the query in the click sequence. Compared at resolution time; only the
    /// newest query may apply its result.
    pub seq: u64,
    /// Snapshot of the view at click time.
    pub view: MapView,
    /// Click position on the screen.
    pub position: ScreenPosition,
    /// Visible layers to try, top-most first.
    pub layers: Vec<QueryLayer>,
}

/// One layer of a query stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLayer {
    /// Stable identifier of the layer.
    pub key: String,
    /// Remote layer name used in the request.
    pub name: String,
}

/// Response of the remote endpoint to a feature info request.
#[derive(Debug, Clone)]
pub struct InfoResponse {
    /// Value of the `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// Raw response body.
    pub body: Bytes,
}

/// Transport used to fetch feature info documents.
///
/// Production uses [`HttpInfoProvider`]; tests substitute a canned one.
#[async_trait]
pub trait InfoProvider: Send + Sync {
    /// Fetches the document at the given URL.
    async fn load(&self, url: &str) -> Result<InfoResponse, MeridianError>;
}

/// [`InfoProvider`] issuing plain HTTP GET requests.
#[derive(Debug, Default)]
pub struct HttpInfoProvider {
    client: reqwest::Client,
}

impl HttpInfoProvider {
    /// Creates a provider with its own HTTP client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InfoProvider for HttpInfoProvider {
    async fn load(&self, url: &str) -> Result<InfoResponse, MeridianError> {
        let response = self.client.get(url).send().await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response.bytes().await?;

        Ok(InfoResponse { content_type, body })
    }
}

/// Resolves point queries by walking the layer stack top-most first.
pub struct FeatureQueryResolver<P> {
    wms: WmsSource,
    provider: P,
    buffer_px: u32,
    feature_count: u32,
}

impl<P: InfoProvider> FeatureQueryResolver<P> {
    /// Creates a resolver for the given endpoint and transport.
    pub fn new(wms: WmsSource, provider: P) -> Self {
        Self {
            wms,
            provider,
            buffer_px: DEFAULT_BUFFER_PX,
            feature_count: DEFAULT_FEATURE_COUNT,
        }
    }

    /// Sets the pixel tolerance around the click point.
    pub fn with_buffer(mut self, buffer_px: u32) -> Self {
        self.buffer_px = buffer_px;
        self
    }

    /// Sets the cap on the number of candidates a layer may return. Only the first
    /// candidate is ever kept, but a higher cap can make the service do more work.
    pub fn with_feature_count(mut self, feature_count: u32) -> Self {
        self.feature_count = feature_count;
        self
    }

    /// Resolves the query to at most one feature.
    ///
    /// The first layer yielding a feature wins and short-circuits the rest of the
    /// stack. A layer that fails (network error, undecodable body) is logged and
    /// skipped. The one exception is an HTML response: the request never reached the
    /// WMS service, so the whole query fails with
    /// [`MeridianError::Configuration`].
    pub async fn resolve(
        &self,
        query: &FeatureQuery,
    ) -> Result<Option<SelectedFeature>, MeridianError> {
        for layer in &query.layers {
            let Some(url) = self.wms.feature_info_url(
                &layer.name,
                &query.view,
                query.position,
                self.buffer_px,
                self.feature_count,
            ) else {
                log::warn!("view of query {} is not projectable", query.seq);
                return Ok(None);
            };

            let response = match self.provider.load(&url).await {
                Ok(response) => response,
                Err(error) => {
                    log::warn!("feature info request for layer {} failed: {error}", layer.key);
                    continue;
                }
            };

            match interpret_info_response(&layer.key, &response) {
                Ok(Some(feature)) => return Ok(Some(feature)),
                Ok(None) => {}
                Err(error @ MeridianError::Configuration(_)) => return Err(error),
                Err(error) => {
                    log::warn!("skipping layer {}: {error}", layer.key);
                }
            }
        }

        Ok(None)
    }
}

/// Interprets one layer's feature info response.
///
/// Returns the first candidate feature, `None` when the layer has nothing at the
/// queried point, or an error. [`MeridianError::Configuration`] marks the distinguished
/// case of an HTML body (reverse proxy error page, login redirect): the endpoint is
/// misconfigured and trying further layers is pointless.
fn interpret_info_response(
    layer_key: &str,
    response: &InfoResponse,
) -> Result<Option<SelectedFeature>, MeridianError> {
    if let Some(content_type) = &response.content_type {
        if content_type.contains("text/html") {
            return Err(MeridianError::Configuration(format!(
                "feature info for layer {layer_key} returned an HTML page instead of data; \
                 check the map service address and proxy settings"
            )));
        }
    }

    let text = std::str::from_utf8(&response.body).map_err(|_| {
        MeridianError::Generic(format!("feature info for layer {layer_key} is not valid UTF-8"))
    })?;
    let collection: FeatureCollection = text.parse::<GeoJson>()?.try_into()?;

    let Some(feature) = collection.features.into_iter().next() else {
        return Ok(None);
    };

    let Some(id) = feature_id(&feature) else {
        log::warn!("feature from layer {layer_key} has no id, ignoring");
        return Ok(None);
    };

    Ok(Some(SelectedFeature {
        id,
        layer_key: layer_key.to_string(),
        properties: feature.properties.unwrap_or_default(),
        geometry: feature.geometry,
    }))
}

fn feature_id(feature: &geojson::Feature) -> Option<String> {
    match feature.id.as_ref()? {
        geojson::feature::Id::String(id) => Some(id.clone()),
        geojson::feature::Id::Number(id) => Some(id.to_string()),
    }
}
