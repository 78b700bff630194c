//! Minimal panel wiring: three data layers served by a local GeoServer, one feature
//! inspection in the middle of the viewport.

use meridian::control::{MouseButton, MouseEvent, UserEvent};
use meridian::layer::{LayerConfig, WmsSource};
use meridian::query::{FeatureQueryResolver, HttpInfoProvider};
use meridian::{EventOutcome, MapEngineBuilder, ScreenPosition};

const WMS_URL: &str = "http://localhost:8081/geoserver/wms";

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut engine = MapEngineBuilder::new(WMS_URL)
        .with_latlon(19.197, 72.966)
        .with_viewport_size(1280, 720)
        .with_layer(LayerConfig::new(
            "water",
            "city_project:water_bodies_polygon",
        ))
        .with_layer(LayerConfig::new("building", "city_project:building"))
        .with_layer(LayerConfig::new("roads", "city_project:road_line"))
        .build();
    engine.initialize("map-root");

    let resolver = FeatureQueryResolver::new(WmsSource::new(WMS_URL), HttpInfoProvider::new());

    let click = UserEvent::Click(
        MouseButton::Left,
        MouseEvent {
            screen_position: ScreenPosition::new(640.0, 360.0),
        },
    );

    if let EventOutcome::Query(query) = engine.handle_event(&click) {
        let result = resolver.resolve(&query).await;
        engine.apply_query_result(query.seq, result);
    }

    match engine.selected_feature() {
        Some(feature) => println!("selected {} from layer {}", feature.id, feature.layer_key),
        None => println!("nothing here"),
    }
}
