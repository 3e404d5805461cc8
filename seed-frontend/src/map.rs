//! Bindings to the host map. mapbox-gl is loaded by the page as a script
//! tag, so everything goes through externs on the global `mapboxgl`
//! namespace. This module is the only place that knows the map is mapbox-gl:
//! the rest of the app sees [`map_model::highlight::FeatureQuery`] and
//! [`MapEvent`]s.

use enclose::enclose;
use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use map_model::feature::Feature;
use map_model::highlight::{FeatureQuery, PixelBounds};
use map_model::style::{transit_source, BEFORE_LAYER, MAP_STYLE_URL, TRANSIT_SOURCE};
use map_model::viewport::Viewport;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = mapboxgl)]
    pub type Map;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "Map")]
    fn new(options: &JsValue) -> Map;

    #[wasm_bindgen(method, js_name = queryRenderedFeatures)]
    fn query_rendered_features(this: &Map, geometry: &JsValue, options: &JsValue)
        -> js_sys::Array;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &Map) -> f64;

    #[wasm_bindgen(method, js_name = getBounds)]
    fn get_bounds(this: &Map) -> LngLatBounds;

    #[wasm_bindgen(method)]
    fn project(this: &Map, lnglat: &JsValue) -> JsValue;

    #[wasm_bindgen(method, js_name = addSource)]
    fn add_source(this: &Map, id: &str, source: &JsValue);

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer(this: &Map, layer: &JsValue, before_id: &str);

    #[wasm_bindgen(method, js_name = setFilter)]
    fn set_filter(this: &Map, layer_id: &str, filter: &JsValue);

    #[wasm_bindgen(method, js_name = setLayoutProperty)]
    fn set_layout_property(this: &Map, layer_id: &str, name: &str, value: &JsValue);

    #[wasm_bindgen(method, js_name = setPaintProperty)]
    fn set_paint_property(this: &Map, layer_id: &str, name: &str, value: &JsValue);

    #[wasm_bindgen(method)]
    fn on(this: &Map, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(js_namespace = mapboxgl)]
    pub type LngLatBounds;

    #[wasm_bindgen(method, js_name = getWest)]
    fn get_west(this: &LngLatBounds) -> f64;
    #[wasm_bindgen(method, js_name = getSouth)]
    fn get_south(this: &LngLatBounds) -> f64;
    #[wasm_bindgen(method, js_name = getEast)]
    fn get_east(this: &LngLatBounds) -> f64;
    #[wasm_bindgen(method, js_name = getNorth)]
    fn get_north(this: &LngLatBounds) -> f64;
}

/// What the map reports back into the app's update loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Style finished loading; sources and layers can be added.
    Loaded,
    /// Continuous camera change (fires throughout pans and zooms).
    Moved { zoom: f64 },
    /// A pan/zoom gesture finished.
    MoveEnded { zoom: f64 },
    /// Click or hover, in pixels relative to the map container.
    Pointer { x: f64, y: f64 },
}

/// Owns the mapbox-gl handle and the registered event closures.
pub struct MapView {
    map: Map,
    loaded: bool,
    // dropping a listener closure would detach it mid-session
    listeners: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl MapView {
    /// Create the map in `container`, starting at `viewport`. `hash: true`
    /// hands fragment maintenance to the host library from here on.
    pub fn create(container: &str, viewport: &Viewport) -> MapView {
        let options = JsValue::from_serde(&serde_json::json!({
            "container": container,
            "style": MAP_STYLE_URL,
            "center": [viewport.longitude, viewport.latitude],
            "zoom": viewport.zoom,
            "bearing": viewport.bearing,
            "pitch": viewport.pitch,
            "hash": true,
        }))
        .expect("serialize map options");
        MapView {
            map: Map::new(&options),
            loaded: false,
            listeners: Vec::new(),
        }
    }

    /// Wire the map's events into the app. One subscription per event kind;
    /// the closures stay alive for the life of the view.
    pub fn connect(&mut self, notify: impl Fn(MapEvent) + Clone + 'static) {
        self.listen("load", enclose!((notify) move |_| notify(MapEvent::Loaded)));
        self.listen(
            "move",
            enclose!((notify) move |event| {
                notify(MapEvent::Moved { zoom: event_zoom(&event) })
            }),
        );
        self.listen(
            "moveend",
            enclose!((notify) move |event| {
                notify(MapEvent::MoveEnded { zoom: event_zoom(&event) })
            }),
        );
        for pointer_event in &["mousemove", "click"] {
            self.listen(
                pointer_event,
                enclose!((notify) move |event| {
                    if let Some((x, y)) = event_point(&event) {
                        notify(MapEvent::Pointer { x, y });
                    }
                }),
            );
        }
    }

    fn listen(&mut self, event: &str, listener: impl FnMut(JsValue) + 'static) {
        let closure = Closure::wrap(Box::new(listener) as Box<dyn FnMut(JsValue)>);
        self.map.on(event, closure.as_ref().unchecked_ref());
        self.listeners.push(closure);
    }

    pub fn zoom(&self) -> f64 {
        self.map.get_zoom()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// `(west, south, east, north)` of the current viewport.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let bounds = self.map.get_bounds();
        (
            bounds.get_west(),
            bounds.get_south(),
            bounds.get_east(),
            bounds.get_north(),
        )
    }

    /// Lon/lat to container pixels, for the canvas overlay.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let point = self
            .map
            .project(&JsValue::from_serde(&[lon, lat]).expect("serialize lnglat"));
        (
            Reflect::get(&point, &"x".into())
                .ok()
                .and_then(|x| x.as_f64())
                .unwrap_or(0.0),
            Reflect::get(&point, &"y".into())
                .ok()
                .and_then(|y| y.as_f64())
                .unwrap_or(0.0),
        )
    }

    /// First-time installation of the transit source and layers, once the
    /// style has loaded.
    pub fn install_transit_layers(&mut self, layers: &[serde_json::Value]) {
        self.loaded = true;
        self.map.add_source(
            TRANSIT_SOURCE,
            &JsValue::from_serde(&transit_source()).expect("serialize source"),
        );
        for layer in layers {
            self.map.add_layer(
                &JsValue::from_serde(layer).expect("serialize layer"),
                BEFORE_LAYER,
            );
        }
    }

    /// Push regenerated layer properties onto the live map: filter, layout
    /// and paint of every transit layer. The declarative layer list is the
    /// source of truth; this just mirrors it onto mapbox's imperative
    /// surface.
    pub fn apply_transit_layers(&self, layers: &[serde_json::Value]) {
        if !self.loaded {
            return;
        }
        for layer in layers {
            let id = layer["id"].as_str().expect("layer id");
            match layer.get("filter") {
                Some(filter) => self
                    .map
                    .set_filter(id, &JsValue::from_serde(filter).expect("serialize filter")),
                None => self.map.set_filter(id, &JsValue::NULL),
            }
            if let Some(layout) = layer["layout"].as_object() {
                for (name, value) in layout {
                    self.map.set_layout_property(
                        id,
                        name,
                        &JsValue::from_serde(value).expect("serialize layout value"),
                    );
                }
            }
            if let Some(paint) = layer["paint"].as_object() {
                for (name, value) in paint {
                    self.map.set_paint_property(
                        id,
                        name,
                        &JsValue::from_serde(value).expect("serialize paint value"),
                    );
                }
            }
        }
    }

    /// Query the whole viewport, for the operators panel.
    pub fn query_viewport_features(&self, layer_ids: &[&str]) -> Vec<Feature> {
        if !self.loaded {
            return Vec::new();
        }
        let features = self
            .map
            .query_rendered_features(&JsValue::UNDEFINED, &layer_options(layer_ids));
        convert_features(features)
    }
}

impl FeatureQuery for MapView {
    fn query_features(&self, bounds: PixelBounds, layer_ids: &[&str]) -> Vec<Feature> {
        // issued before the style loads: "no features found"
        if !self.loaded {
            return Vec::new();
        }
        let geometry = JsValue::from_serde(&[bounds.min, bounds.max]).expect("serialize bounds");
        let features = self
            .map
            .query_rendered_features(&geometry, &layer_options(layer_ids));
        convert_features(features)
    }
}

fn layer_options(layer_ids: &[&str]) -> JsValue {
    JsValue::from_serde(&serde_json::json!({ "layers": layer_ids }))
        .expect("serialize query options")
}

fn convert_features(features: js_sys::Array) -> Vec<Feature> {
    features
        .iter()
        .filter_map(|feature| {
            let layer_id = Reflect::get(&feature, &"layer".into())
                .and_then(|layer| Reflect::get(&layer, &"id".into()))
                .ok()
                .and_then(|id| id.as_string())?;
            let properties = Reflect::get(&feature, &"properties".into())
                .ok()
                .and_then(|properties| properties.into_serde().ok())
                .unwrap_or_default();
            Some(Feature::new(layer_id, properties))
        })
        .collect()
}

fn event_zoom(event: &JsValue) -> f64 {
    Reflect::get(event, &"target".into())
        .map(|target| target.unchecked_into::<Map>().get_zoom())
        .unwrap_or(0.0)
}

fn event_point(event: &JsValue) -> Option<(f64, f64)> {
    let point = Reflect::get(event, &"point".into()).ok()?;
    let x = Reflect::get(&point, &"x".into()).ok()?.as_f64()?;
    let y = Reflect::get(&point, &"y".into()).ok()?.as_f64()?;
    Some((x, y))
}
