use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::MIN_HIGHLIGHT_ZOOM;
use crate::feature::{Feature, ROUTES_SERVING_STOP, STOPS_SERVED_BY_ROUTE};
use crate::style::{ROUTE_INTERACTIVE_LAYERS, STOPS_LAYER};

/// Which hover/click cross-referencing the user has switched on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightFlags {
    /// Hovering a route lights up every stop it serves.
    pub stops_by_route: bool,
    /// Hovering a stop lights up every route serving it.
    pub routes_by_stop: bool,
}

impl HighlightFlags {
    pub fn any(self) -> bool {
        self.stops_by_route || self.routes_by_stop
    }
}

/// Axis-aligned pixel box handed to the rendering surface for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl PixelBounds {
    /// The picking box around a pointer position.
    pub fn around(x: f64, y: f64, radius: f64) -> Self {
        PixelBounds {
            min: [x - radius, y - radius],
            max: [x + radius, y + radius],
        }
    }
}

/// The one capability this crate needs from the host map: "which rendered
/// features of these layers intersect this box". A surface that has not
/// finished loading returns no features.
pub trait FeatureQuery {
    fn query_features(&self, bounds: PixelBounds, layer_ids: &[&str]) -> Vec<Feature>;
}

/// Ids to highlight, split by kind. Sets, because several picked features
/// routinely contribute the same companions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HighlightState {
    pub route_ids: BTreeSet<String>,
    pub stop_ids: BTreeSet<String>,
}

impl HighlightState {
    pub fn is_empty(&self) -> bool {
        self.route_ids.is_empty() && self.stop_ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.route_ids.clear();
        self.stop_ids.clear();
    }

    /// Viewport-change reducer: below the highlight zoom the lists are
    /// forced empty no matter what a previous pick produced. Coming back
    /// above the threshold does not re-query — the lists stay empty until
    /// the next pointer event resolves something.
    pub fn apply_zoom(&mut self, zoom: f64) {
        if zoom < MIN_HIGHLIGHT_ZOOM {
            self.clear();
        }
    }
}

/// Resolve a pointer event into highlight state.
///
/// Queries the rendering surface for features of `candidate_layers` within
/// `picking_radius` pixels of the pointer and unions the companion-id lists
/// of route and stop features into the respective accumulators. Below
/// `MIN_HIGHLIGHT_ZOOM`, or with no highlight mode enabled, no query is
/// issued at all.
pub fn resolve_picked(
    surface: &dyn FeatureQuery,
    x: f64,
    y: f64,
    picking_radius: f64,
    candidate_layers: &[&str],
    zoom: f64,
    flags: HighlightFlags,
) -> HighlightState {
    let mut state = HighlightState::default();
    if zoom < MIN_HIGHLIGHT_ZOOM || !flags.any() {
        return state;
    }

    let bounds = PixelBounds::around(x, y, picking_radius);
    for feature in surface.query_features(bounds, candidate_layers) {
        if flags.stops_by_route && ROUTE_INTERACTIVE_LAYERS.contains(&feature.layer_id.as_str()) {
            union_companions(&feature, STOPS_SERVED_BY_ROUTE, &mut state.stop_ids);
        }
        if flags.routes_by_stop && feature.layer_id == STOPS_LAYER {
            union_companions(&feature, ROUTES_SERVING_STOP, &mut state.route_ids);
        }
    }
    state
}

fn union_companions(feature: &Feature, key: &str, into: &mut BTreeSet<String>) {
    match feature.companion_ids(key) {
        Ok(Some(ids)) => into.extend(ids),
        Ok(None) => {}
        // data-quality problem in the tiles: skip this feature only
        Err(warning) => log::warn!("{}", warning),
    }
}

#[cfg(test)]
mod test {
    use super::{resolve_picked, FeatureQuery, HighlightFlags, HighlightState, PixelBounds};
    use crate::constants::PICKING_RADIUS;
    use crate::feature::{Feature, ROUTES_SERVING_STOP, STOPS_SERVED_BY_ROUTE};
    use crate::style::INTERACTIVE_LAYER_IDS;
    use std::cell::Cell;

    struct FakeSurface {
        features: Vec<Feature>,
        queries: Cell<usize>,
    }

    impl FakeSurface {
        fn with(features: Vec<Feature>) -> Self {
            FakeSurface {
                features,
                queries: Cell::new(0),
            }
        }
    }

    impl FeatureQuery for FakeSurface {
        fn query_features(&self, _bounds: PixelBounds, _layer_ids: &[&str]) -> Vec<Feature> {
            self.queries.set(self.queries.get() + 1);
            self.features.clone()
        }
    }

    fn feature(layer_id: &str, key: &str, value: &str) -> Feature {
        let mut properties = serde_json::Map::new();
        properties.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        Feature::new(layer_id, properties)
    }

    fn pick(surface: &FakeSurface, zoom: f64, flags: HighlightFlags) -> HighlightState {
        resolve_picked(
            surface,
            400.0,
            300.0,
            PICKING_RADIUS,
            &INTERACTIVE_LAYER_IDS,
            zoom,
            flags,
        )
    }

    fn stops_by_route() -> HighlightFlags {
        HighlightFlags {
            stops_by_route: true,
            routes_by_stop: false,
        }
    }

    #[test]
    fn below_highlight_zoom_never_queries() {
        let surface = FakeSurface::with(vec![feature(
            "transit_routes_default",
            STOPS_SERVED_BY_ROUTE,
            "[\"s1\"]",
        )]);
        let state = pick(&surface, 10.0, stops_by_route());
        assert!(state.is_empty());
        assert_eq!(surface.queries.get(), 0);
    }

    #[test]
    fn no_mode_enabled_never_queries() {
        let surface = FakeSurface::with(vec![feature(
            "transit_routes_default",
            STOPS_SERVED_BY_ROUTE,
            "[\"s1\"]",
        )]);
        let state = pick(&surface, 12.0, HighlightFlags::default());
        assert!(state.is_empty());
        assert_eq!(surface.queries.get(), 0);
    }

    #[test]
    fn route_features_union_their_stops() {
        let surface = FakeSurface::with(vec![
            feature(
                "transit_routes_default",
                STOPS_SERVED_BY_ROUTE,
                "[\"s1\",\"s2\"]",
            ),
            feature(
                "transit_routes_highlighting",
                STOPS_SERVED_BY_ROUTE,
                "[\"s2\",\"s3\"]",
            ),
        ]);
        let state = pick(&surface, 12.0, stops_by_route());
        let stops: Vec<&str> = state.stop_ids.iter().map(String::as_str).collect();
        assert_eq!(stops, vec!["s1", "s2", "s3"]);
        assert!(state.route_ids.is_empty());
        assert_eq!(surface.queries.get(), 1);
    }

    #[test]
    fn stop_features_union_their_routes() {
        let surface = FakeSurface::with(vec![feature(
            "transit_stops",
            ROUTES_SERVING_STOP,
            "[\"r1\",\"r2\"]",
        )]);
        let flags = HighlightFlags {
            stops_by_route: false,
            routes_by_stop: true,
        };
        let state = pick(&surface, 12.0, flags);
        let routes: Vec<&str> = state.route_ids.iter().map(String::as_str).collect();
        assert_eq!(routes, vec!["r1", "r2"]);
        assert!(state.stop_ids.is_empty());
    }

    #[test]
    fn disabled_mode_contributes_nothing() {
        // stop feature present, but routes_by_stop is off
        let surface = FakeSurface::with(vec![
            feature("transit_stops", ROUTES_SERVING_STOP, "[\"r1\"]"),
            feature("transit_routes_default", STOPS_SERVED_BY_ROUTE, "[\"s1\"]"),
        ]);
        let state = pick(&surface, 12.0, stops_by_route());
        assert!(state.route_ids.is_empty());
        assert_eq!(state.stop_ids.len(), 1);
    }

    #[test]
    fn malformed_feature_is_skipped_not_fatal() {
        let surface = FakeSurface::with(vec![
            feature("transit_routes_default", STOPS_SERVED_BY_ROUTE, "not-json"),
            feature("transit_routes_default", STOPS_SERVED_BY_ROUTE, "[\"s9\"]"),
        ]);
        let state = pick(&surface, 12.0, stops_by_route());
        let stops: Vec<&str> = state.stop_ids.iter().map(String::as_str).collect();
        assert_eq!(stops, vec!["s9"]);
    }

    #[test]
    fn zoom_out_suppresses_prior_highlights() {
        let mut state = HighlightState::default();
        state.route_ids.insert("r1".to_string());
        state.stop_ids.insert("s1".to_string());

        // 12 -> 10 crosses below the threshold
        state.apply_zoom(12.0);
        assert!(!state.is_empty());
        state.apply_zoom(10.0);
        assert!(state.is_empty());

        // coming back up does not resurrect anything
        state.apply_zoom(12.0);
        assert!(state.is_empty());
    }

    #[test]
    fn empty_surface_yields_empty_state() {
        let surface = FakeSurface::with(Vec::new());
        let state = pick(&surface, 12.0, stops_by_route());
        assert!(state.is_empty());
        assert_eq!(surface.queries.get(), 1);
    }

    #[test]
    fn picking_box_is_centered() {
        let bounds = PixelBounds::around(100.0, 50.0, 10.0);
        assert_eq!(bounds.min, [90.0, 40.0]);
        assert_eq!(bounds.max, [110.0, 60.0]);
    }
}
