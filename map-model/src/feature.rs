use std::fmt;

use serde_json::{Map, Value};

/// Property carrying the stops a route serves, as a JSON-encoded id array.
pub const STOPS_SERVED_BY_ROUTE: &str = "stops_served_by_route";
/// Property carrying the routes serving a stop, as a JSON-encoded id array.
pub const ROUTES_SERVING_STOP: &str = "routes_serving_stop";

/// One rendered map element as the rendering surface hands it back: the
/// layer it was drawn on plus its property bag. Features are not owned by
/// this crate — they are read-only and live only for the query that
/// produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub layer_id: String,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(layer_id: impl Into<String>, properties: Map<String, Value>) -> Self {
        Feature {
            layer_id: layer_id.into(),
            properties,
        }
    }

    /// A string-valued property, if present.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// Extract a companion-id list embedded as a serialized-JSON property.
    ///
    /// `Ok(None)` when the property is absent — plenty of features simply
    /// don't carry cross-references. A present-but-unparseable value is a
    /// data-quality problem in the tiles, reported as a [`ParseWarning`] so
    /// the caller can skip this feature and carry on with the batch.
    pub fn companion_ids(&self, key: &str) -> Result<Option<Vec<String>>, ParseWarning> {
        let value = match self.properties.get(key) {
            None => return Ok(None),
            Some(value) => value,
        };
        let raw = value.as_str().ok_or_else(|| ParseWarning {
            key: key.to_string(),
            layer_id: self.layer_id.clone(),
            detail: format!("expected a JSON-encoded string, got {}", value),
        })?;
        let ids: Vec<String> = serde_json::from_str(raw).map_err(|err| ParseWarning {
            key: key.to_string(),
            layer_id: self.layer_id.clone(),
            detail: err.to_string(),
        })?;
        Ok(Some(ids))
    }
}

/// A feature property that should have held a serialized JSON id array but
/// didn't. Never fatal: the affected feature is skipped, the rest of the
/// query proceeds.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub key: String,
    pub layer_id: String,
    pub detail: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unparseable {} on a {} feature: {}",
            self.key, self.layer_id, self.detail
        )
    }
}

impl std::error::Error for ParseWarning {}
