use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::feature::Feature;

/// An operator as the panel shows it, read off rendered route features.
/// The tiles always carry the onestop id and full name; short name and
/// website are present for the larger agencies only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub onestop_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Operator {
    pub fn from_feature(feature: &Feature) -> Option<Operator> {
        let onestop_id = feature.property_str("operated_by_onestop_id")?;
        let name = feature.property_str("operated_by_name")?;
        Some(Operator {
            onestop_id: onestop_id.to_string(),
            name: name.to_string(),
            short_name: feature
                .property_str("operated_by_short_name")
                .map(str::to_string),
            website: feature
                .property_str("operated_by_website")
                .map(str::to_string),
        })
    }

    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

/// Unique by onestop id, first occurrence wins, input order preserved —
/// a viewport query returns one feature per rendered route segment, so the
/// same operator shows up dozens of times.
pub fn dedup_operators(operators: Vec<Operator>) -> Vec<Operator> {
    let mut seen = HashSet::new();
    operators
        .into_iter()
        .filter(|operator| seen.insert(operator.onestop_id.clone()))
        .collect()
}

#[cfg(test)]
mod test {
    use super::{dedup_operators, Operator};
    use crate::feature::Feature;
    use serde_json::json;

    fn operator(onestop_id: &str, name: &str) -> Operator {
        Operator {
            onestop_id: onestop_id.to_string(),
            name: name.to_string(),
            short_name: None,
            website: None,
        }
    }

    #[test]
    fn from_feature_requires_id_and_name() {
        let mut properties = serde_json::Map::new();
        properties.insert("operated_by_onestop_id".to_string(), json!("o-9q9-bart"));
        assert_eq!(
            Operator::from_feature(&Feature::new("transit_routes_default", properties.clone())),
            None
        );

        properties.insert(
            "operated_by_name".to_string(),
            json!("Bay Area Rapid Transit"),
        );
        let operator =
            Operator::from_feature(&Feature::new("transit_routes_default", properties)).unwrap();
        assert_eq!(operator.onestop_id, "o-9q9-bart");
        assert_eq!(operator.display_name(), "Bay Area Rapid Transit");
    }

    #[test]
    fn short_name_preferred_for_display() {
        let operator = Operator {
            short_name: Some("BART".to_string()),
            ..operator("o-9q9-bart", "Bay Area Rapid Transit")
        };
        assert_eq!(operator.display_name(), "BART");
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let deduped = dedup_operators(vec![
            operator("o-b", "B"),
            operator("o-a", "A"),
            operator("o-b", "B again"),
            operator("o-c", "C"),
            operator("o-a", "A again"),
        ]);
        let ids: Vec<&str> = deduped.iter().map(|o| o.onestop_id.as_str()).collect();
        assert_eq!(ids, vec!["o-b", "o-a", "o-c"]);
        assert_eq!(deduped[0].name, "B");
    }
}
