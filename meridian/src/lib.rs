//! Meridian is a headless interaction engine for WMS map panels. It keeps the state of
//! an interactive map — the layer stack, the measuring tools, the selected feature —
//! while leaving rendering and windowing to the embedding application.
//!
//! # Quick start
//!
//! A panel with three data layers served by a local GeoServer:
//!
//! ```no_run
//! use meridian::control::{MouseButton, MouseEvent, UserEvent};
//! use meridian::layer::LayerConfig;
//! use meridian::query::{FeatureQueryResolver, HttpInfoProvider};
//! use meridian::{EventOutcome, MapEngineBuilder, ScreenPosition};
//!
//! # tokio_test::block_on(async {
//! let mut engine = MapEngineBuilder::new("http://localhost:8081/geoserver/wms")
//!     .with_latlon(19.197, 72.966)
//!     .with_layer(LayerConfig::new("water", "city_project:water_bodies_polygon"))
//!     .with_layer(LayerConfig::new("building", "city_project:building"))
//!     .with_layer(LayerConfig::new("roads", "city_project:road_line"))
//!     .build();
//! engine.initialize("map-root");
//!
//! let resolver = FeatureQueryResolver::new(
//!     meridian::layer::WmsSource::new("http://localhost:8081/geoserver/wms"),
//!     HttpInfoProvider::new(),
//! );
//!
//! let click = UserEvent::Click(
//!     MouseButton::Left,
//!     MouseEvent {
//!         screen_position: ScreenPosition::new(400.0, 300.0),
//!     },
//! );
//! if let EventOutcome::Query(query) = engine.handle_event(&click) {
//!     let result = resolver.resolve(&query).await;
//!     engine.apply_query_result(query.seq, result);
//! }
//! # });
//! ```
//!
//! # Main components
//!
//! Everything in the crate revolves around
//!
//! * [`MapEngine`], which owns the current [`MapView`], the registry of
//! * [`WmsLayer`](layer::WmsLayer)s that describe what the remote service renders and
//!   how visible it is, and the state of the interaction tools.
//!
//! The engine reacts to [`UserEvent`](control::UserEvent)s according to the active
//! [`ToolMode`]:
//!
//! * in cursor mode a click becomes a [`FeatureQuery`](query::FeatureQuery) that the
//!   [`FeatureQueryResolver`](query::FeatureQueryResolver) resolves against the visible
//!   layer stack, top-most layer first;
//! * in the measuring modes clicks place vertices of a drawing whose geodesic length or
//!   area is tracked live by the [`MeasureController`](measure::MeasureController) and
//!   its tooltip overlays.
//!
//! A resolved selection drives the [`HighlightLayer`](layer::HighlightLayer): all data
//! layers dim and the selected feature is rendered isolated on top. State changes the
//! embedding application must present are delivered through its [`Messenger`].

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod control;
pub mod error;
pub mod layer;
mod map;
pub mod measure;
mod messenger;
pub mod query;
mod view;

pub use error::MeridianError;
pub use map::{geo_to_screen, EventOutcome, LayerRegistry, MapEngine, MapEngineBuilder, ToolMode};
pub use messenger::{DummyMessenger, Messenger};
pub use view::{MapView, ScreenPosition, ViewportSize};
