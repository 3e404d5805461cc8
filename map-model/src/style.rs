//! Declarative description of the transit source and its style layers, in
//! the JSON shape the rendering library consumes. Data, not logic: the only
//! moving parts are the compiled mode/operator filter, the highlight id
//! splices, and the visibility swaps.

use serde_json::{json, Value};

/// Base style the map loads underneath the transit layers.
pub const MAP_STYLE_URL: &str =
    "https://raw.githubusercontent.com/kylebarron/fiord-color-gl-style/master/style.json";

/// Vector tileset with every route and stop.
pub const TRANSIT_TILES_URL: &str = "https://mbtiles.nst.guide/services/all-transit/all";

/// Source id the transit layers draw from.
pub const TRANSIT_SOURCE: &str = "transit";

/// Transit layers slide in under the base style's road labels.
pub const BEFORE_LAYER: &str = "highway_name_other";

pub const ROUTES_CASING_DEFAULT_LAYER: &str = "transit_routes_casing_default";
pub const ROUTES_CASING_HIGHLIGHTING_LAYER: &str = "transit_routes_casing_highlighting";
pub const ROUTES_DEFAULT_LAYER: &str = "transit_routes_default";
pub const ROUTES_HIGHLIGHTING_LAYER: &str = "transit_routes_highlighting";
pub const STOPS_LAYER: &str = "transit_stops";
pub const ROUTES_LABEL_LAYER: &str = "transit_routes_label";

/// Layers the picking query is allowed to hit.
pub const INTERACTIVE_LAYER_IDS: [&str; 3] = [
    ROUTES_DEFAULT_LAYER,
    ROUTES_HIGHLIGHTING_LAYER,
    STOPS_LAYER,
];

/// The route layers among [`INTERACTIVE_LAYER_IDS`] — the ones whose
/// features carry `stops_served_by_route`.
pub const ROUTE_INTERACTIVE_LAYERS: [&str; 2] =
    [ROUTES_DEFAULT_LAYER, ROUTES_HIGHLIGHTING_LAYER];

pub fn transit_source() -> Value {
    json!({
        "type": "vector",
        "url": TRANSIT_TILES_URL,
    })
}

/// Everything the layer set depends on. Rebuilt and re-applied whole
/// whenever any input changes.
#[derive(Debug, Clone, Default)]
pub struct LayerOptions {
    pub highlighted_route_ids: Vec<String>,
    pub highlighted_stop_ids: Vec<String>,
    /// Output of [`crate::filter::compile`].
    pub filter: Option<Value>,
    pub show_route_labels: bool,
}

/// The transit layer set, in paint order.
///
/// Route layers come in `_default` / `_highlighting` pairs with swapped
/// visibility: while any route is highlighted the `_highlighting` variants
/// paint membership-dependent opacity and the `_default` variants hide, and
/// vice versa. One layer list, no style reloads.
pub fn transit_layers(options: &LayerOptions) -> Vec<Value> {
    let highlighting = !options.highlighted_route_ids.is_empty();
    let (default_visibility, highlighting_visibility) = if highlighting {
        ("none", "visible")
    } else {
        ("visible", "none")
    };

    let casing_color = json!("#000");
    let casing_width = json!({ "stops": [[5, 0.3], [15, 0.7]] });
    let route_color = json!([
        "case",
        ["has", "color"],
        ["concat", "#", ["downcase", ["get", "color"]]],
        "hsl(229, 50%, 35%)"
    ]);
    let route_width = json!({ "stops": [[5, 0.7], [15, 1.5]] });
    let zoom_faded_opacity = json!({ "stops": [[4, 0.3], [14, 0.7]] });
    let membership_opacity = json!([
        "case",
        ["in", ["get", "onestop_id"], ["literal", options.highlighted_route_ids]],
        1,
        0.05
    ]);

    let layers = vec![
        line_layer(
            ROUTES_CASING_DEFAULT_LAYER,
            options,
            json!({
                "line-color": casing_color,
                "line-width": casing_width,
                "line-gap-width": 1,
                "line-opacity": zoom_faded_opacity,
            }),
            default_visibility,
        ),
        line_layer(
            ROUTES_CASING_HIGHLIGHTING_LAYER,
            options,
            json!({
                "line-color": casing_color,
                "line-width": casing_width,
                "line-gap-width": 1,
                "line-opacity": membership_opacity,
            }),
            highlighting_visibility,
        ),
        line_layer(
            ROUTES_DEFAULT_LAYER,
            options,
            json!({
                "line-color": route_color,
                "line-width": route_width,
                "line-opacity": zoom_faded_opacity,
            }),
            default_visibility,
        ),
        line_layer(
            ROUTES_HIGHLIGHTING_LAYER,
            options,
            json!({
                "line-color": route_color,
                "line-width": route_width,
                "line-opacity": membership_opacity,
            }),
            highlighting_visibility,
        ),
        stops_layer(options),
        labels_layer(options),
    ];
    layers
}

fn line_layer(id: &str, options: &LayerOptions, paint: Value, visibility: &str) -> Value {
    let mut layer = json!({
        "id": id,
        "source": TRANSIT_SOURCE,
        "source-layer": "routes",
        "type": "line",
        "paint": paint,
        "layout": { "visibility": visibility },
    });
    attach_filter(&mut layer, options.filter.clone());
    layer
}

fn stops_layer(options: &LayerOptions) -> Value {
    // one stops layer; when stops are highlighted its opacity becomes
    // membership-dependent instead of swapping in a second layer
    let opacity = if options.highlighted_stop_ids.is_empty() {
        json!({ "stops": [[11, 0.4], [15, 0.6]] })
    } else {
        json!([
            "case",
            ["in", ["get", "onestop_id"], ["literal", options.highlighted_stop_ids]],
            0.9,
            0.1
        ])
    };
    let mut layer = json!({
        "id": STOPS_LAYER,
        "source": TRANSIT_SOURCE,
        "source-layer": "stops",
        "minzoom": 11,
        "type": "circle",
        "paint": {
            "circle-blur": 0.2,
            "circle-opacity": opacity,
            "circle-radius": { "stops": [[11, 1], [15, 4]] },
            "circle-color": "#cccccc",
            "circle-stroke-color": "#000000",
            "circle-stroke-width": 0.6,
        },
    });
    attach_filter(&mut layer, options.filter.clone());
    layer
}

fn labels_layer(options: &LayerOptions) -> Value {
    let visibility = if options.show_route_labels {
        "visible"
    } else {
        "none"
    };
    let mut layer = json!({
        "id": ROUTES_LABEL_LAYER,
        "source": TRANSIT_SOURCE,
        "source-layer": "routes",
        "type": "symbol",
        "layout": {
            "symbol-placement": "line",
            "text-anchor": "center",
            "text-field": "{name}",
            "text-font": ["Metropolis Regular"],
            "text-offset": [1, 0],
            "text-size": { "base": 1, "stops": [[5, 10], [14, 10]] },
            "symbol-spacing": 350,
            "text-max-angle": 50,
            "text-letter-spacing": 0,
            "text-max-width": 15,
            "visibility": visibility,
        },
        "paint": {
            "text-color": "rgba(255, 255, 255, 1)",
            "text-halo-blur": 0,
            "text-halo-width": 1,
            "text-halo-color": "rgba(30, 30, 30, 1)",
        },
    });
    // chartered and duplicate Amtrak entries label almost every line in the
    // country; keep them off the labels regardless of the user filter
    let label_filter = json!([
        "all",
        ["!=", "operated_by_name", "Amtrak California"],
        ["!=", "operated_by_name", "Amtrak Chartered Vehicle"]
    ]);
    attach_filter(&mut layer, Some(merge_all(options.filter.clone(), label_filter)));
    layer
}

/// Conjoin two `["all", ...]` filters (either side may be a bare clause).
fn merge_all(left: Option<Value>, right: Value) -> Value {
    let mut clauses = vec![json!("all")];
    for side in vec![left, Some(right)] {
        match side {
            None => {}
            Some(Value::Array(parts)) if parts.first() == Some(&json!("all")) => {
                clauses.extend(parts.into_iter().skip(1));
            }
            Some(clause) => clauses.push(clause),
        }
    }
    Value::Array(clauses)
}

fn attach_filter(layer: &mut Value, filter: Option<Value>) {
    if let Some(filter) = filter {
        // an empty conjunction constrains nothing; leave it off the layer
        if filter != json!(["all"]) {
            layer["filter"] = filter;
        }
    }
}

#[cfg(test)]
mod test {
    use super::{transit_layers, LayerOptions, INTERACTIVE_LAYER_IDS};
    use serde_json::json;

    fn ids(layers: &[serde_json::Value]) -> Vec<&str> {
        layers.iter().map(|l| l["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn layer_order_is_stable() {
        let layers = transit_layers(&LayerOptions::default());
        assert_eq!(
            ids(&layers),
            vec![
                "transit_routes_casing_default",
                "transit_routes_casing_highlighting",
                "transit_routes_default",
                "transit_routes_highlighting",
                "transit_stops",
                "transit_routes_label",
            ]
        );
    }

    #[test]
    fn interactive_layers_exist() {
        let layers = transit_layers(&LayerOptions::default());
        for id in INTERACTIVE_LAYER_IDS.iter() {
            assert!(ids(&layers).contains(id), "{} missing", id);
        }
    }

    #[test]
    fn highlighting_swaps_visibility() {
        let idle = transit_layers(&LayerOptions::default());
        assert_eq!(idle[0]["layout"]["visibility"], "visible");
        assert_eq!(idle[1]["layout"]["visibility"], "none");

        let highlighted = transit_layers(&LayerOptions {
            highlighted_route_ids: vec!["r-9q9-398".to_string()],
            ..LayerOptions::default()
        });
        assert_eq!(highlighted[0]["layout"]["visibility"], "none");
        assert_eq!(highlighted[1]["layout"]["visibility"], "visible");
        // highlighted ids are spliced into the opacity expression
        let opacity = &highlighted[1]["paint"]["line-opacity"];
        assert_eq!(opacity[1][2], json!(["literal", ["r-9q9-398"]]));
    }

    #[test]
    fn user_filter_reaches_every_layer() {
        let filter = json!(["all", ["in", "vehicle_type", "bus"]]);
        let layers = transit_layers(&LayerOptions {
            filter: Some(filter.clone()),
            ..LayerOptions::default()
        });
        for layer in &layers[..5] {
            assert_eq!(layer["filter"], filter, "layer {}", layer["id"]);
        }
        // the label layer conjoins its own exclusions
        let label_filter = layers[5]["filter"].as_array().unwrap();
        assert_eq!(label_filter[0], "all");
        assert_eq!(label_filter[1], json!(["in", "vehicle_type", "bus"]));
        assert_eq!(label_filter.len(), 4);
    }

    #[test]
    fn accept_all_filter_is_left_off() {
        let layers = transit_layers(&LayerOptions {
            filter: Some(json!(["all"])),
            ..LayerOptions::default()
        });
        assert!(layers[0].get("filter").is_none());
    }

    #[test]
    fn label_visibility_follows_toggle() {
        let hidden = transit_layers(&LayerOptions::default());
        assert_eq!(hidden[5]["layout"]["visibility"], "none");
        let shown = transit_layers(&LayerOptions {
            show_route_labels: true,
            ..LayerOptions::default()
        });
        assert_eq!(shown[5]["layout"]["visibility"], "visible");
    }

    #[test]
    fn stop_highlighting_switches_opacity_form() {
        let layers = transit_layers(&LayerOptions {
            highlighted_stop_ids: vec!["s-abc".to_string()],
            ..LayerOptions::default()
        });
        let opacity = layers[4]["paint"]["circle-opacity"].as_array().unwrap();
        assert_eq!(opacity[0], "case");
    }
}
