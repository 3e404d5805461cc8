//! The transit map site: a mapbox-gl map of every transit route and stop,
//! with filter/highlight controls, an operators panel and the schedule
//! animation overlay. All decisions live in the `map-model` crate; this
//! crate is the browser wiring.

use std::rc::Rc;

use seed::util::ClosureNew;
use seed::{prelude::*, *};
use wasm_bindgen::closure::Closure;

use map_model::attribution::Attribution;
use map_model::constants::{
    MAX_SCHEDULE_ANIMATION_ZOOM, MIN_OPERATOR_INFO_ZOOM, MIN_SCHEDULE_ANIMATION_ZOOM,
    PICKING_RADIUS,
};
use map_model::filter::{self, OperatorFilter};
use map_model::highlight::{resolve_picked, HighlightState};
use map_model::operators::{dedup_operators, Operator};
use map_model::schedule::tile_cover;
use map_model::style::{transit_layers, LayerOptions, INTERACTIVE_LAYER_IDS, ROUTE_INTERACTIVE_LAYERS};
use map_model::viewport::{self, Viewport};

mod controls;
mod map;
mod operators;
mod overlay;
mod sync;

use map::{MapEvent, MapView};

#[wasm_bindgen(start)]
pub fn render() {
    App::start("app", init, update, view);
}

fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    let decoded = viewport::decode(&window().location().hash().unwrap_or_default());
    if decoded.strip_fragment {
        strip_fragment();
    }

    // the map container only exists once the first view has rendered
    orders.after_next_render(|_| Msg::FirstRender);

    Model {
        map: None,
        viewport: decoded.viewport,
        zoom: decoded.viewport.zoom,
        controls: Default::default(),
        operator_filter: OperatorFilter::default(),
        operators: Vec::new(),
        highlight: HighlightState::default(),
        overlay: overlay::ScheduleOverlay::new(),
        attribution: None,
    }
}

/// A malformed fragment confuses the host library's own hash handling, so
/// returning the default viewport is not enough — the URL is rewritten
/// without it.
fn strip_fragment() {
    let window = window();
    if let (Ok(path), Ok(history)) = (window.location().pathname(), window.history()) {
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&path));
    }
}

struct Model {
    map: Option<MapView>,
    viewport: Viewport,
    /// Mirrors the camera; drives highlight suppression, the controls and
    /// the animation transitions.
    zoom: f64,
    controls: controls::Model,
    operator_filter: OperatorFilter,
    operators: Vec<Operator>,
    highlight: HighlightState,
    overlay: overlay::ScheduleOverlay,
    attribution: Option<Vec<Attribution>>,
}

enum Msg {
    FirstRender,
    Map(MapEvent),
    Controls(controls::Msg),
    Operators(operators::Msg),
    Sync(sync::Msg),
    AnimationFrame(f64),
}

fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::FirstRender => {
            let mut map_view = MapView::create("map", &model.viewport);
            let app = orders.clone_app();
            let mapper = Rc::new(orders.msg_mapper());
            map_view.connect(move |event| app.update(mapper(Msg::Map(event))));
            model.map = Some(map_view);

            orders.perform_cmd(async { Msg::Sync(sync::fetch_attribution().await) });
        }

        Msg::Map(MapEvent::Loaded) => {
            if let Some(map) = &mut model.map {
                model.zoom = map.zoom();
                map.install_transit_layers(&current_layers(
                    &model.highlight,
                    &model.controls,
                    &model.operator_filter,
                ));
            }
            refresh_operators(model);
            refetch_tiles(model, orders);
            sync_animation(model, orders);
        }

        Msg::Map(MapEvent::Moved { zoom }) => {
            model.zoom = zoom;
            // zooming out suppresses highlights no matter what was picked
            let was_highlighted = !model.highlight.is_empty();
            model.highlight.apply_zoom(zoom);
            if was_highlighted && model.highlight.is_empty() {
                apply_layers(model);
            }
            sync_animation(model, orders);
        }

        Msg::Map(MapEvent::MoveEnded { zoom }) => {
            model.zoom = zoom;
            refresh_operators(model);
            refetch_tiles(model, orders);
        }

        Msg::Map(MapEvent::Pointer { x, y }) => {
            if let Some(map) = &model.map {
                let resolved = resolve_picked(
                    map,
                    x,
                    y,
                    PICKING_RADIUS,
                    &INTERACTIVE_LAYER_IDS,
                    model.zoom,
                    model.controls.highlight,
                );
                if resolved != model.highlight {
                    model.highlight = resolved;
                    apply_layers(model);
                }
            }
        }

        Msg::Controls(msg) => {
            controls::update(msg, &mut model.controls);
            apply_layers(model);
            refetch_tiles(model, orders);
            sync_animation(model, orders);
        }

        Msg::Operators(operators::Msg::Toggle(onestop_id)) => {
            model.operator_filter.toggle(&onestop_id);
            apply_layers(model);
        }

        Msg::Sync(sync::Msg::AttributionFetched(Ok(attribution))) => {
            model.attribution = Some(attribution);
        }
        Msg::Sync(sync::Msg::AttributionFetched(Err(fail_reason))) => {
            // render no attribution section; nothing to retry
            seed::error!(format!("fetching attribution failed - {:?}", fail_reason));
        }

        Msg::Sync(sync::Msg::TileFetched {
            generation,
            coord,
            result: Ok(tile),
        }) => {
            model.overlay.receive(generation, coord, tile);
        }
        Msg::Sync(sync::Msg::TileFetched {
            coord,
            result: Err(fail_reason),
            ..
        }) => {
            // missing tiles render as an empty patch of the overlay
            seed::error!(format!(
                "fetching schedule tile {:?} failed - {:?}",
                coord, fail_reason
            ));
        }

        Msg::AnimationFrame(timestamp_ms) => {
            if let Some(map) = &model.map {
                if model.overlay.frame(timestamp_ms, map) {
                    schedule_frame(model, orders);
                }
            }
        }
    }
}

/// The declarative layer set for the current state. Regenerated whole on
/// every change and mirrored onto the map.
fn current_layers(
    highlight: &HighlightState,
    controls: &controls::Model,
    operator_filter: &OperatorFilter,
) -> Vec<serde_json::Value> {
    transit_layers(&LayerOptions {
        highlighted_route_ids: highlight.route_ids.iter().cloned().collect(),
        highlighted_stop_ids: highlight.stop_ids.iter().cloned().collect(),
        filter: Some(filter::compile(&controls.modes, operator_filter)),
        show_route_labels: controls.show_route_labels,
    })
}

fn apply_layers(model: &Model) {
    if let Some(map) = &model.map {
        map.apply_transit_layers(&current_layers(
            &model.highlight,
            &model.controls,
            &model.operator_filter,
        ));
    }
}

fn refresh_operators(model: &mut Model) {
    let map = match &model.map {
        Some(map) if map.is_loaded() => map,
        _ => return,
    };
    model.operators = if model.zoom >= MIN_OPERATOR_INFO_ZOOM {
        dedup_operators(
            map.query_viewport_features(&ROUTE_INTERACTIVE_LAYERS)
                .iter()
                .filter_map(Operator::from_feature)
                .collect(),
        )
    } else {
        Vec::new()
    };
}

/// Fetch the schedule tiles covering the settled viewport. Each round gets
/// a generation tag; responses landing after a newer round are dropped.
fn refetch_tiles(model: &mut Model, orders: &mut impl Orders<Msg>) {
    let map = match &model.map {
        Some(map) if map.is_loaded() => map,
        _ => return,
    };
    if !model.controls.animate || model.zoom < MIN_SCHEDULE_ANIMATION_ZOOM {
        return;
    }
    // the tileset only goes to MAX_SCHEDULE_ANIMATION_ZOOM; overzoom past it
    let z = model.zoom.floor().min(MAX_SCHEDULE_ANIMATION_ZOOM) as u8;
    let cover = tile_cover(map.bounds(), z);
    let generation = model.overlay.begin_batch(&cover);
    for coord in cover {
        if model.overlay.needs(coord) {
            orders.perform_cmd(async move {
                Msg::Sync(sync::fetch_schedule_tile(generation, coord).await)
            });
        }
    }
}

/// Reconcile the animation with the current zoom and toggle, scheduling the
/// first frame on start. Stopping cancels the pending frame inside the
/// overlay.
fn sync_animation(model: &mut Model, orders: &mut impl Orders<Msg>) {
    let run = model.controls.animate
        && model.zoom >= MIN_SCHEDULE_ANIMATION_ZOOM
        && model.map.as_ref().map_or(false, MapView::is_loaded);
    if let Some(map_model::clock::Transition::Started) = model.overlay.sync_running(run) {
        schedule_frame(model, orders);
    }
}

fn schedule_frame(model: &mut Model, orders: &mut impl Orders<Msg>) {
    let app = orders.clone_app();
    let mapper = orders.msg_mapper();
    let cb = Closure::new(move |timestamp_ms| app.update(mapper(Msg::AnimationFrame(timestamp_ms))));
    model.overlay.frame_scheduled(util::request_animation_frame(cb));
}

fn view(model: &Model) -> Node<Msg> {
    div![
        div![
            attrs! { At::Id => "map" },
            style! {
                St::Position => "absolute",
                St::Top => "0",
                St::Bottom => "0",
                St::Width => "100%",
            },
        ],
        canvas![
            el_ref(model.overlay.canvas()),
            style! {
                St::Position => "absolute",
                St::Top => "0",
                St::Left => "0",
                St::Width => "100%",
                St::Height => "100%",
                St::PointerEvents => "none",
            },
        ],
        div![
            C!["panel"],
            style! {
                St::Position => "absolute",
                St::Top => px(30),
                St::Left => px(30),
                St::Width => px(240),
                St::MaxHeight => "70%",
                St::OverflowY => "auto",
                St::BackgroundColor => "#fff",
                St::Padding => px(10),
            },
            controls::view(&model.controls, model.zoom).map_msg(Msg::Controls),
            operators::view(&model.operators, &model.operator_filter).map_msg(Msg::Operators),
            attribution_view(&model.attribution),
        ],
    ]
}

fn attribution_view(attribution: &Option<Vec<Attribution>>) -> Node<Msg> {
    match attribution {
        None => empty![],
        Some(attributions) => details![
            summary!["Data attributions"],
            ul![attributions.iter().map(|attribution| {
                li![
                    match &attribution.license.url {
                        Some(url) => a![attrs! { At::Href => url }, &attribution.name],
                        None => span![&attribution.name],
                    },
                    attribution
                        .license
                        .attr_text
                        .as_ref()
                        .map(|text| p![text]),
                ]
            })],
        ],
    }
}
