use seed::{prelude::*, *};

use map_model::filter::OperatorFilter;
use map_model::operators::Operator;

pub enum Msg {
    Toggle(String),
}

/// Operators whose routes are in the current view, each with an enable
/// checkbox and a link to the agency. The list itself is assembled in the
/// app on every settled viewport change.
pub fn view(operators: &[Operator], disabled: &OperatorFilter) -> Node<Msg> {
    if operators.is_empty() {
        return div![h3!["Operators"], p!["Zoom in to list operators"]];
    }
    div![
        h3!["Operators"],
        ul![operators.iter().map(|operator| {
            let onestop_id = operator.onestop_id.clone();
            li![
                input![
                    attrs! {
                        At::Type => "checkbox",
                        At::Checked => (!disabled.is_disabled(&operator.onestop_id)).as_at_value(),
                    },
                    input_ev(Ev::Input, move |_| Msg::Toggle(onestop_id))
                ],
                match &operator.website {
                    Some(website) => a![
                        attrs! {
                            At::Href => website,
                            At::Target => "_blank",
                            At::Rel => "noopener noreferrer",
                        },
                        operator.display_name()
                    ],
                    None => span![operator.display_name()],
                },
            ]
        })],
    ]
}
