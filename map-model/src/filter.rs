use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The transit modes the source data distinguishes. Wire names are the
/// `vehicle_type` values as they appear in the tiles — lowercased there,
/// not reinterpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransitMode {
    Tram,
    Metro,
    Rail,
    Bus,
    Ferry,
    CableCar,
}

impl TransitMode {
    pub const ALL: [TransitMode; 6] = [
        TransitMode::Tram,
        TransitMode::Metro,
        TransitMode::Rail,
        TransitMode::Bus,
        TransitMode::Ferry,
        TransitMode::CableCar,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            TransitMode::Tram => "tram",
            TransitMode::Metro => "metro",
            TransitMode::Rail => "rail",
            TransitMode::Bus => "bus",
            TransitMode::Ferry => "ferry",
            TransitMode::CableCar => "cablecar",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransitMode::Tram => "Tram",
            TransitMode::Metro => "Metro",
            TransitMode::Rail => "Rail",
            TransitMode::Bus => "Bus",
            TransitMode::Ferry => "Ferry",
            TransitMode::CableCar => "Cable car",
        }
    }
}

/// Per-mode enable flags. Everything is shown until the user opts out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeFilter {
    enabled: BTreeSet<TransitMode>,
}

impl Default for ModeFilter {
    fn default() -> Self {
        ModeFilter {
            enabled: TransitMode::ALL.iter().copied().collect(),
        }
    }
}

impl ModeFilter {
    pub fn is_enabled(&self, mode: TransitMode) -> bool {
        self.enabled.contains(&mode)
    }

    pub fn toggle(&mut self, mode: TransitMode) {
        if !self.enabled.remove(&mode) {
            self.enabled.insert(mode);
        }
    }

    pub fn all_enabled(&self) -> bool {
        self.enabled.len() == TransitMode::ALL.len()
    }

    fn enabled_wire_names(&self) -> Vec<&'static str> {
        TransitMode::ALL
            .iter()
            .filter(|mode| self.enabled.contains(mode))
            .map(|mode| mode.wire_name())
            .collect()
    }
}

/// Operators the user has switched off, by onestop id. Session state only.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorFilter {
    disabled: BTreeSet<String>,
}

impl OperatorFilter {
    pub fn is_disabled(&self, onestop_id: &str) -> bool {
        self.disabled.contains(onestop_id)
    }

    pub fn toggle(&mut self, onestop_id: &str) {
        if !self.disabled.remove(onestop_id) {
            self.disabled.insert(onestop_id.to_string());
        }
    }

    pub fn none_disabled(&self) -> bool {
        self.disabled.is_empty()
    }
}

/// Compile the current toggle state into the declarative filter expression
/// the rendering layer evaluates against every feature. Recomputed whole on
/// each change — never patched — and pushed down to all transit layers.
///
/// The expression is the conjunction of a `vehicle_type` membership clause
/// and an `operated_by_onestop_id` exclusion clause; clauses that would not
/// constrain anything are left out, so the idle state compiles to the
/// accept-everything `["all"]`.
pub fn compile(modes: &ModeFilter, operators: &OperatorFilter) -> Value {
    let mut clauses = vec![json!("all")];
    if !modes.all_enabled() {
        let mut clause = vec![json!("in"), json!("vehicle_type")];
        clause.extend(modes.enabled_wire_names().into_iter().map(|name| json!(name)));
        clauses.push(Value::Array(clause));
    }
    if !operators.none_disabled() {
        let mut clause = vec![json!("!in"), json!("operated_by_onestop_id")];
        clause.extend(operators.disabled.iter().map(|id| json!(id)));
        clauses.push(Value::Array(clause));
    }
    Value::Array(clauses)
}
