//! Highlight rendering for the selected feature.

use geo_types::Geometry;

use crate::query::SelectedFeature;

/// Opacity applied to every data layer while a feature is highlighted.
pub const DIMMED_OPACITY: f32 = 0.3;

/// The dedicated rendering layer that isolates the selected feature from its peers.
///
/// When a feature is selected, the layer is pointed at the feature's source layer and
/// filtered down to exactly that feature id, while all data layers are dimmed around it.
/// Additionally the feature geometry is decoded from the query payload into a vector
/// outline drawn on top. The layer never shows more than one feature: highlighting a new
/// feature replaces the previous target and outline.
#[derive(Debug, Default)]
pub struct HighlightLayer {
    target: Option<HighlightTarget>,
    outline: Option<Geometry<f64>>,
}

/// Source layer and feature the highlight rendering is filtered to.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightTarget {
    /// Key of the source data layer.
    pub layer_key: String,
    /// Remote name of the source data layer.
    pub layer_name: String,
    /// Identifier of the one feature the rendering shows.
    pub feature_id: String,
}

impl HighlightLayer {
    /// Points the highlight at the given feature, replacing any previous one.
    ///
    /// If the geometry payload cannot be decoded the outline is omitted; the WMS-level
    /// highlight does not depend on it.
    pub fn highlight(&mut self, feature: &SelectedFeature, layer_name: &str) {
        self.target = Some(HighlightTarget {
            layer_key: feature.layer_key.clone(),
            layer_name: layer_name.to_string(),
            feature_id: feature.id.clone(),
        });
        self.outline = feature.decode_geometry();
    }

    /// Hides the highlight rendering and clears the outline.
    pub fn clear(&mut self) {
        self.target = None;
        self.outline = None;
    }

    /// Whether the highlight rendering is currently shown.
    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    /// The layer and feature id the rendering is filtered to, if any.
    pub fn target(&self) -> Option<&HighlightTarget> {
        self.target.as_ref()
    }

    /// Decoded outline geometry, if the payload could be decoded.
    pub fn outline(&self) -> Option<&Geometry<f64>> {
        self.outline.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tests::{feature_with_bad_geometry, point_feature};

    #[test]
    fn highlighting_replaces_previous_target() {
        let mut layer = HighlightLayer::default();

        layer.highlight(&point_feature("building.1", "building"), "city:building");
        layer.highlight(&point_feature("roads.7", "roads"), "city:road_line");

        let target = layer.target().expect("highlight is set");
        assert_eq!(target.feature_id, "roads.7");
        assert_eq!(target.layer_key, "roads");
        assert_eq!(target.layer_name, "city:road_line");
        assert!(layer.outline().is_some());
    }

    #[test]
    fn clear_hides_rendering_and_outline() {
        let mut layer = HighlightLayer::default();
        layer.highlight(&point_feature("building.1", "building"), "city:building");

        layer.clear();

        assert!(!layer.is_visible());
        assert!(layer.target().is_none());
        assert!(layer.outline().is_none());
    }

    #[test]
    fn undecodable_geometry_omits_outline_only() {
        let mut layer = HighlightLayer::default();
        layer.highlight(&feature_with_bad_geometry("water.3", "water"), "city:water");

        assert!(layer.is_visible());
        assert!(layer.outline().is_none());
    }
}
