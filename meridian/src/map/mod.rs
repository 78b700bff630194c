//! The map interaction engine: composes layers, tools and selection.

use geo_types::Point;

use crate::control::{MouseButton, UserEvent};
use crate::error::MeridianError;
use crate::layer::{
    BackgroundLayer, HighlightLayer, LayerConfig, WmsLayer, WmsSource, DIMMED_OPACITY,
};
use crate::measure::{MeasureController, MeasureKind};
use crate::messenger::Messenger;
use crate::query::{FeatureQuery, QueryLayer, SelectedFeature};
use crate::view::{MapView, ScreenPosition};

mod builder;
mod layer_registry;

pub use builder::MapEngineBuilder;
pub use layer_registry::LayerRegistry;

/// Interaction behavior currently bound to map clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Navigate the map and inspect features by clicking them.
    #[default]
    Cursor,
    /// Measure geodesic distances.
    Distance,
    /// Measure geodesic areas.
    Area,
}

/// Outcome of handling one user event.
#[derive(Debug)]
pub enum EventOutcome {
    /// The event did not change the engine state.
    Ignored,
    /// The event was handled synchronously.
    Handled,
    /// The event started a feature query. Resolve it with a
    /// [`FeatureQueryResolver`](crate::query::FeatureQueryResolver) and hand the result
    /// back through [`MapEngine::apply_query_result`].
    Query(FeatureQuery),
}

/// The map interaction engine.
///
/// The engine owns the map view, the data layer registry, the highlight rendering layer
/// and the measuring tools. The surrounding UI drives it with tool-mode and
/// layer-visibility commands plus [`UserEvent`]s, and receives selection and redraw
/// notifications back through its [`Messenger`]. All mutations are applied to the layer
/// state synchronously; the renderer reads that state on the next frame.
///
/// Feature queries are the one asynchronous interaction. The engine never blocks on
/// them: handling a cursor-mode click yields an [`EventOutcome::Query`] value, the
/// embedding resolves it on its own event loop and applies the result afterwards.
pub struct MapEngine {
    view: MapView,
    wms: WmsSource,
    background: BackgroundLayer,
    configs: Vec<LayerConfig>,
    layers: LayerRegistry,
    highlight: HighlightLayer,
    measure: MeasureController,
    tool_mode: ToolMode,
    selected: Option<SelectedFeature>,
    query_seq: u64,
    messenger: Option<Box<dyn Messenger>>,
    attached_to: Option<String>,
}

impl MapEngine {
    pub(crate) fn new(
        view: MapView,
        wms: WmsSource,
        background: BackgroundLayer,
        configs: Vec<LayerConfig>,
        messenger: Option<Box<dyn Messenger>>,
    ) -> Self {
        Self {
            view,
            wms,
            background,
            configs,
            layers: LayerRegistry::default(),
            highlight: HighlightLayer::default(),
            measure: MeasureController::new(),
            tool_mode: ToolMode::default(),
            selected: None,
            query_seq: 0,
            messenger,
            attached_to: None,
        }
    }

    /// Attaches the engine to a rendering container and builds the layer stack.
    ///
    /// The first call creates one rendering layer per configured descriptor on top of
    /// the background layer. Further calls are no-ops until [`MapEngine::dispose`].
    pub fn initialize(&mut self, container: impl Into<String>) {
        if self.attached_to.is_some() {
            return;
        }
        self.attached_to = Some(container.into());

        if self.layers.is_empty() {
            for config in &self.configs {
                self.layers.push(WmsLayer::from(config.clone()));
            }
        }

        self.notify_redraw();
    }

    /// Detaches the engine from its container and discards transient interaction
    /// state. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.attached_to.take().is_none() {
            return;
        }

        self.measure.disarm();
        self.tool_mode = ToolMode::Cursor;
        self.selected = None;
        self.highlight.clear();
        for layer in self.layers.iter_mut() {
            let opacity = layer.opacity();
            layer.set_effective_opacity(opacity);
        }
    }

    /// Whether the engine is currently attached to a container.
    pub fn is_initialized(&self) -> bool {
        self.attached_to.is_some()
    }

    /// Current view of the map.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Changes the view of the map to the given one.
    pub fn set_view(&mut self, view: MapView) {
        self.view = view;
        self.notify_redraw();
    }

    /// The data layer registry.
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// The background tile layer drawn under all data layers.
    pub fn background(&self) -> &BackgroundLayer {
        &self.background
    }

    /// The highlight rendering layer.
    pub fn highlight(&self) -> &HighlightLayer {
        &self.highlight
    }

    /// The measuring tools controller.
    pub fn measure(&self) -> &MeasureController {
        &self.measure
    }

    /// The currently selected feature, if any.
    pub fn selected_feature(&self) -> Option<&SelectedFeature> {
        self.selected.as_ref()
    }

    /// The active tool mode.
    pub fn tool_mode(&self) -> ToolMode {
        self.tool_mode
    }

    /// Switches the active tool.
    ///
    /// Any in-progress drawing is torn down before the new tool is installed; an
    /// unfinished drawing is discarded together with its tooltip. Switching to the mode
    /// that is already active does nothing, so rapid repeated calls are safe.
    pub fn set_tool_mode(&mut self, mode: ToolMode) {
        if mode == self.tool_mode {
            return;
        }

        self.measure.disarm();
        self.tool_mode = mode;
        match mode {
            ToolMode::Cursor => {}
            ToolMode::Distance => self.measure.arm(MeasureKind::Distance),
            ToolMode::Area => self.measure.arm(MeasureKind::Area),
        }

        if let Some(messenger) = &self.messenger {
            messenger.tool_mode_changed(mode);
        }
        self.notify_redraw();
    }

    /// Shows or hides a data layer.
    ///
    /// The layer's effective opacity is re-derived immediately: restored to the
    /// configured value when nothing is selected, kept dimmed while a feature is
    /// highlighted.
    pub fn set_layer_visibility(&mut self, key: &str, visible: bool) -> Result<(), MeridianError> {
        let layer = self.layers.get_mut(key).ok_or(MeridianError::NotFound)?;
        layer.set_visible(visible);
        self.sync_highlight();

        Ok(())
    }

    /// Handles one user event according to the active tool mode.
    ///
    /// Events arriving while the engine is not initialized are ignored.
    pub fn handle_event(&mut self, event: &UserEvent) -> EventOutcome {
        if self.attached_to.is_none() {
            return EventOutcome::Ignored;
        }

        match event {
            UserEvent::Click(MouseButton::Left, mouse) => match self.tool_mode {
                ToolMode::Cursor => {
                    EventOutcome::Query(self.begin_feature_query(mouse.screen_position))
                }
                ToolMode::Distance | ToolMode::Area => {
                    let Some(point) = self.view.screen_to_geo(mouse.screen_position) else {
                        return EventOutcome::Ignored;
                    };
                    self.measure.add_vertex(point);
                    self.notify_redraw();
                    EventOutcome::Handled
                }
            },
            UserEvent::DoubleClick(MouseButton::Left, _) if self.tool_mode != ToolMode::Cursor => {
                self.measure.finish();
                self.notify_redraw();
                EventOutcome::Handled
            }
            UserEvent::PointerMoved(mouse) if self.measure.is_drawing() => {
                if let Some(point) = self.view.screen_to_geo(mouse.screen_position) {
                    self.measure.update_cursor(point);
                    self.notify_redraw();
                }
                EventOutcome::Handled
            }
            _ => EventOutcome::Ignored,
        }
    }

    /// Applies the result of a resolved feature query.
    ///
    /// Results of any query but the newest one are discarded (last-resolved-wins), so a
    /// slow response cannot overwrite the selection made by a later click. A successful
    /// result replaces the selection and re-derives the highlight state; a
    /// configuration error is surfaced through the messenger.
    pub fn apply_query_result(
        &mut self,
        seq: u64,
        result: Result<Option<SelectedFeature>, MeridianError>,
    ) {
        if seq != self.query_seq {
            log::debug!(
                "discarding stale feature query result (seq {seq}, newest {})",
                self.query_seq
            );
            return;
        }

        match result {
            Ok(selection) => {
                self.selected = selection;
                self.sync_highlight();
                if let Some(messenger) = &self.messenger {
                    messenger.feature_selected(self.selected.as_ref());
                }
            }
            Err(MeridianError::Configuration(message)) => {
                log::error!("{message}");
                if let Some(messenger) = &self.messenger {
                    messenger.configuration_error(&message);
                }
            }
            Err(error) => {
                log::warn!("feature query failed: {error}");
            }
        }
    }

    /// Clears the current selection (explicit dismissal by the user).
    pub fn clear_selection(&mut self) {
        if self.selected.take().is_none() {
            return;
        }

        self.sync_highlight();
        if let Some(messenger) = &self.messenger {
            messenger.feature_selected(None);
        }
    }

    /// Removes all measurements and their tooltip overlays.
    pub fn clear_measurements(&mut self) {
        self.measure.clear();
        self.notify_redraw();
    }

    /// GetMap URL for one tile of the given data layer.
    pub fn layer_tile_url(
        &self,
        key: &str,
        bbox: [f64; 4],
        width: u32,
        height: u32,
    ) -> Option<String> {
        let layer = self.layers.get(key)?;
        Some(self.wms.map_url(layer.name(), bbox, width, height))
    }

    /// GetLegendGraphic URL for the given data layer.
    pub fn legend_url(&self, key: &str) -> Option<String> {
        let layer = self.layers.get(key)?;
        Some(self.wms.legend_url(layer.name()))
    }

    fn begin_feature_query(&mut self, position: ScreenPosition) -> FeatureQuery {
        let layers = self
            .layers
            .query_stack()
            .map(|layer| QueryLayer {
                key: layer.key().to_string(),
                name: layer.name().to_string(),
            })
            .collect();

        self.query_seq += 1;
        FeatureQuery {
            seq: self.query_seq,
            view: self.view.clone(),
            position,
            layers,
        }
    }

    /// Re-derives the highlight state after a selection or visibility change.
    ///
    /// With a selection every data layer is dimmed and the highlight layer is pointed at
    /// the selected feature; without one the configured opacities are restored and the
    /// highlight is cleared.
    fn sync_highlight(&mut self) {
        match &self.selected {
            Some(feature) => {
                let layer_name = self
                    .layers
                    .get(&feature.layer_key)
                    .map(|layer| layer.name().to_string())
                    .unwrap_or_default();
                for layer in self.layers.iter_mut() {
                    layer.set_effective_opacity(DIMMED_OPACITY);
                }
                self.highlight.highlight(feature, &layer_name);
            }
            None => {
                for layer in self.layers.iter_mut() {
                    let opacity = layer.opacity();
                    layer.set_effective_opacity(opacity);
                }
                self.highlight.clear();
            }
        }

        self.notify_redraw();
    }

    fn notify_redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw();
        }
    }
}

/// Turns a geographic point into the screen position it is rendered at. Used by tests
/// and embeddings that need to synthesize events.
pub fn geo_to_screen(view: &MapView, point: Point<f64>) -> Option<ScreenPosition> {
    let center = MapView::project(view.center())?;
    let target = MapView::project(point)?;
    let size = view.size();

    Some(ScreenPosition::new(
        size.width() as f64 / 2.0 + (target.x - center.x) / view.resolution(),
        size.height() as f64 / 2.0 - (target.y - center.y) / view.resolution(),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;

    use super::*;
    use crate::control::MouseEvent;
    use crate::measure::TooltipStyle;
    use crate::query::tests::point_feature;

    #[derive(Default)]
    struct EventLog(Arc<Mutex<Vec<String>>>);

    impl EventLog {
        fn share(&self) -> Arc<Mutex<Vec<String>>> {
            self.0.clone()
        }
    }

    impl Messenger for EventLog {
        fn request_redraw(&self) {}

        fn feature_selected(&self, feature: Option<&SelectedFeature>) {
            let id = feature.map(|f| f.id.clone()).unwrap_or_default();
            self.0
                .lock()
                .expect("lock is not poisoned")
                .push(format!("selected:{id}"));
        }

        fn tool_mode_changed(&self, mode: ToolMode) {
            self.0
                .lock()
                .expect("lock is not poisoned")
                .push(format!("mode:{mode:?}"));
        }

        fn configuration_error(&self, _message: &str) {
            self.0
                .lock()
                .expect("lock is not poisoned")
                .push("configuration_error".to_string());
        }
    }

    fn test_engine() -> MapEngine {
        let mut engine = MapEngineBuilder::new("http://localhost:8081/geoserver/wms")
            .with_viewport_size(800, 600)
            .with_resolution(10.0)
            .with_layer(LayerConfig::new("water", "city:water_bodies"))
            .with_layer(LayerConfig::new("building", "city:building"))
            .with_layer(LayerConfig::new("roads", "city:road_line"))
            .build();
        engine.initialize("map-root");
        engine
    }

    fn logged_engine() -> (MapEngine, Arc<Mutex<Vec<String>>>) {
        let log = EventLog::default();
        let events = log.share();
        let mut engine = MapEngineBuilder::new("http://localhost:8081/geoserver/wms")
            .with_viewport_size(800, 600)
            .with_resolution(10.0)
            .with_layer(LayerConfig::new("water", "city:water_bodies"))
            .with_messenger(log)
            .build();
        engine.initialize("map-root");
        (engine, events)
    }

    fn click_at(x: f64, y: f64) -> UserEvent {
        UserEvent::Click(
            MouseButton::Left,
            MouseEvent {
                screen_position: ScreenPosition::new(x, y),
            },
        )
    }

    fn double_click() -> UserEvent {
        UserEvent::DoubleClick(
            MouseButton::Left,
            MouseEvent {
                screen_position: ScreenPosition::new(0.0, 0.0),
            },
        )
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut engine = test_engine();
        assert_eq!(engine.layers().len(), 3);

        engine.initialize("other-root");
        assert_eq!(engine.layers().len(), 3);
        assert!(engine.is_initialized());
    }

    #[test]
    fn dispose_is_safe_to_repeat() {
        let mut engine = test_engine();
        engine.set_tool_mode(ToolMode::Distance);
        engine.handle_event(&click_at(100.0, 100.0));

        engine.dispose();
        engine.dispose();

        assert!(!engine.is_initialized());
        assert!(!engine.measure().is_drawing());
        assert_matches!(engine.handle_event(&click_at(1.0, 1.0)), EventOutcome::Ignored);
    }

    #[test]
    fn cursor_click_starts_a_query_over_the_visible_stack() {
        let mut engine = test_engine();
        engine
            .set_layer_visibility("building", false)
            .expect("layer exists");

        let outcome = engine.handle_event(&click_at(400.0, 300.0));

        let EventOutcome::Query(query) = outcome else {
            panic!("expected a query outcome");
        };
        let keys: Vec<_> = query.layers.iter().map(|layer| layer.key.as_str()).collect();
        assert_eq!(keys, ["roads", "water"]);
        assert_eq!(query.seq, 1);
    }

    #[test]
    fn measuring_clicks_do_not_query_features() {
        let mut engine = test_engine();
        engine.set_tool_mode(ToolMode::Distance);

        assert_matches!(
            engine.handle_event(&click_at(400.0, 300.0)),
            EventOutcome::Handled
        );
        assert!(engine.measure().is_drawing());
    }

    #[test]
    fn switching_to_cursor_discards_the_drawing() {
        let mut engine = test_engine();
        engine.set_tool_mode(ToolMode::Distance);
        engine.handle_event(&click_at(400.0, 300.0));
        engine.handle_event(&click_at(500.0, 300.0));
        assert!(engine.measure().is_drawing());

        engine.set_tool_mode(ToolMode::Cursor);

        assert!(!engine.measure().is_drawing());
        assert!(engine.measure().tooltips().is_empty());
        // the next click inspects features instead of placing a vertex
        assert_matches!(
            engine.handle_event(&click_at(400.0, 300.0)),
            EventOutcome::Query(_)
        );
    }

    #[test]
    fn double_click_finalizes_the_drawing() {
        let mut engine = test_engine();
        engine.set_tool_mode(ToolMode::Distance);
        engine.handle_event(&click_at(100.0, 300.0));
        engine.handle_event(&click_at(700.0, 300.0));

        engine.handle_event(&double_click());

        assert_eq!(engine.measure().measurements().len(), 1);
        let tooltips: Vec<_> = engine.measure().tooltips().iter().collect();
        assert_eq!(tooltips.len(), 2);
        assert_eq!(tooltips[0].style(), TooltipStyle::Static);
        assert_eq!(tooltips[1].style(), TooltipStyle::Live);
    }

    #[test]
    fn selection_dims_all_layers_and_filters_the_highlight() {
        let mut engine = test_engine();

        let query = match engine.handle_event(&click_at(400.0, 300.0)) {
            EventOutcome::Query(query) => query,
            _ => panic!("expected a query outcome"),
        };
        engine.apply_query_result(query.seq, Ok(Some(point_feature("roads.7", "roads"))));

        assert_eq!(engine.selected_feature().map(|f| f.id.as_str()), Some("roads.7"));
        for layer in engine.layers().iter() {
            assert_eq!(layer.effective_opacity(), DIMMED_OPACITY);
        }
        let target = engine.highlight().target().expect("highlight is set");
        assert_eq!(target.feature_id, "roads.7");
        assert_eq!(target.layer_name, "city:road_line");
        assert!(engine.highlight().outline().is_some());
    }

    #[test]
    fn selecting_another_feature_replaces_the_highlight() {
        let mut engine = test_engine();

        let query = match engine.handle_event(&click_at(400.0, 300.0)) {
            EventOutcome::Query(query) => query,
            _ => panic!("expected a query outcome"),
        };
        engine.apply_query_result(query.seq, Ok(Some(point_feature("roads.7", "roads"))));

        let query = match engine.handle_event(&click_at(200.0, 300.0)) {
            EventOutcome::Query(query) => query,
            _ => panic!("expected a query outcome"),
        };
        engine.apply_query_result(query.seq, Ok(Some(point_feature("building.1", "building"))));

        let target = engine.highlight().target().expect("highlight is set");
        assert_eq!(target.feature_id, "building.1");
        // exactly one outline at a time
        assert!(engine.highlight().outline().is_some());
    }

    #[test]
    fn stale_query_result_is_discarded() {
        let mut engine = test_engine();

        let first = match engine.handle_event(&click_at(400.0, 300.0)) {
            EventOutcome::Query(query) => query,
            _ => panic!("expected a query outcome"),
        };
        let second = match engine.handle_event(&click_at(200.0, 300.0)) {
            EventOutcome::Query(query) => query,
            _ => panic!("expected a query outcome"),
        };
        assert!(second.seq > first.seq);

        engine.apply_query_result(second.seq, Ok(Some(point_feature("building.1", "building"))));
        // the slow response of the earlier click arrives last
        engine.apply_query_result(first.seq, Ok(Some(point_feature("roads.7", "roads"))));

        assert_eq!(
            engine.selected_feature().map(|f| f.id.as_str()),
            Some("building.1")
        );
    }

    #[test]
    fn no_hit_clears_the_selection() {
        let mut engine = test_engine();

        let query = match engine.handle_event(&click_at(400.0, 300.0)) {
            EventOutcome::Query(query) => query,
            _ => panic!("expected a query outcome"),
        };
        engine.apply_query_result(query.seq, Ok(Some(point_feature("roads.7", "roads"))));

        let query = match engine.handle_event(&click_at(10.0, 10.0)) {
            EventOutcome::Query(query) => query,
            _ => panic!("expected a query outcome"),
        };
        engine.apply_query_result(query.seq, Ok(None));

        assert!(engine.selected_feature().is_none());
        assert!(!engine.highlight().is_visible());
        for layer in engine.layers().iter() {
            assert_eq!(layer.effective_opacity(), layer.opacity());
        }
    }

    #[test]
    fn toggling_visibility_keeps_the_dimming_while_selected() {
        let mut engine = test_engine();

        let query = match engine.handle_event(&click_at(400.0, 300.0)) {
            EventOutcome::Query(query) => query,
            _ => panic!("expected a query outcome"),
        };
        engine.apply_query_result(query.seq, Ok(Some(point_feature("roads.7", "roads"))));

        engine
            .set_layer_visibility("water", false)
            .expect("layer exists");
        engine
            .set_layer_visibility("water", true)
            .expect("layer exists");

        let water = engine.layers().get("water").expect("layer exists");
        assert_eq!(water.effective_opacity(), DIMMED_OPACITY);

        engine.clear_selection();
        let water = engine.layers().get("water").expect("layer exists");
        assert_eq!(water.effective_opacity(), water.opacity());
    }

    #[test]
    fn unknown_layer_key_is_an_error() {
        let mut engine = test_engine();
        assert_matches!(
            engine.set_layer_visibility("fire", true),
            Err(MeridianError::NotFound)
        );
    }

    #[test]
    fn messenger_is_told_about_selection_and_mode_changes() {
        let (mut engine, events) = logged_engine();

        engine.set_tool_mode(ToolMode::Distance);
        engine.set_tool_mode(ToolMode::Cursor);
        let query = match engine.handle_event(&click_at(400.0, 300.0)) {
            EventOutcome::Query(query) => query,
            _ => panic!("expected a query outcome"),
        };
        engine.apply_query_result(query.seq, Ok(Some(point_feature("water.3", "water"))));
        engine.clear_selection();
        engine.apply_query_result(
            query.seq,
            Err(MeridianError::Configuration("bad proxy".to_string())),
        );

        let events = events.lock().expect("lock is not poisoned");
        assert_eq!(
            *events,
            [
                "mode:Distance",
                "mode:Cursor",
                "selected:water.3",
                "selected:",
                "configuration_error",
            ]
        );
    }

    #[test]
    fn tile_and_legend_urls_use_the_remote_layer_name() {
        let engine = test_engine();

        let tile = engine
            .layer_tile_url("roads", [0.0, 0.0, 100.0, 100.0], 256, 256)
            .expect("layer exists");
        assert!(tile.contains("LAYERS=city:road_line"));

        let legend = engine.legend_url("roads").expect("layer exists");
        assert!(legend.contains("LAYER=city:road_line"));

        assert!(engine.legend_url("fire").is_none());
    }

    #[test]
    fn geo_to_screen_inverts_screen_to_geo() {
        let engine = test_engine();
        let position = ScreenPosition::new(123.0, 456.0);

        let point = engine
            .view()
            .screen_to_geo(position)
            .expect("point is projectable");
        let round_trip = geo_to_screen(engine.view(), point).expect("point is projectable");

        approx::assert_relative_eq!(round_trip.x, position.x, epsilon = 1e-6);
        approx::assert_relative_eq!(round_trip.y, position.y, epsilon = 1e-6);
    }
}
