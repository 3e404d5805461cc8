use seed::{prelude::*, *};

use map_model::filter::TransitMode;
use map_model::highlight::HighlightFlags;

/// The toggle panel: transit modes, the two highlight modes, route labels
/// and the schedule animation.
#[derive(Clone)]
pub struct Model {
    pub modes: map_model::filter::ModeFilter,
    pub highlight: HighlightFlags,
    pub show_route_labels: bool,
    pub animate: bool,
}

impl Default for Model {
    fn default() -> Self {
        Model {
            modes: Default::default(),
            highlight: Default::default(),
            show_route_labels: true,
            animate: true,
        }
    }
}

pub enum Msg {
    ToggleMode(TransitMode),
    ToggleHighlightStopsByRoute,
    ToggleHighlightRoutesByStop,
    ToggleRouteLabels,
    ToggleAnimate,
}

/// Flip the toggled flag; every change needs the recompiled state pushed to
/// the map, which is the caller's job.
pub fn update(msg: Msg, model: &mut Model) {
    match msg {
        Msg::ToggleMode(mode) => model.modes.toggle(mode),
        Msg::ToggleHighlightStopsByRoute => {
            model.highlight.stops_by_route = !model.highlight.stops_by_route
        }
        Msg::ToggleHighlightRoutesByStop => {
            model.highlight.routes_by_stop = !model.highlight.routes_by_stop
        }
        Msg::ToggleRouteLabels => model.show_route_labels = !model.show_route_labels,
        Msg::ToggleAnimate => model.animate = !model.animate,
    }
}

pub fn view(model: &Model, zoom: f64) -> Vec<Node<Msg>> {
    let mut nodes = nodes![h3!["Filters"]];
    for &mode in TransitMode::ALL.iter() {
        nodes.extend(checkbox(
            mode.wire_name(),
            mode.label(),
            model.modes.is_enabled(mode),
            move |_| Msg::ToggleMode(mode),
        ));
    }
    nodes.extend(checkbox(
        "route-labels",
        "Route labels",
        model.show_route_labels,
        |_| Msg::ToggleRouteLabels,
    ));
    nodes.extend(checkbox(
        "animate",
        "Animate schedules",
        model.animate,
        |_| Msg::ToggleAnimate,
    ));
    if zoom < map_model::constants::MIN_HIGHLIGHT_ZOOM {
        nodes.push(p!["Zoom in for more options"]);
    } else {
        nodes.extend(checkbox(
            "highlight-routes-by-stop",
            "Highlight routes by stop",
            model.highlight.routes_by_stop,
            |_| Msg::ToggleHighlightRoutesByStop,
        ));
        nodes.extend(checkbox(
            "highlight-stops-by-route",
            "Highlight stops by route",
            model.highlight.stops_by_route,
            |_| Msg::ToggleHighlightStopsByRoute,
        ));
    }
    nodes
}

fn checkbox<M>(name: &'static str, label: &'static str, value: bool, event: M) -> Vec<Node<Msg>>
where
    M: FnOnce(String) -> Msg + Clone + 'static,
{
    vec![
        input![
            attrs! {
                At::Type => "checkbox",
                At::Checked => value.as_at_value(),
                At::Name => name,
            },
            input_ev(Ev::Input, event)
        ],
        label![
            attrs! {
                At::For => name
            },
            label
        ],
    ]
}
