//! Attribution records for the about page: which feeds require credit, and
//! with what text. Generated offline from the transitland operator extract
//! and fetched by the site as one JSON array.

use serde::{Deserialize, Serialize};

/// One line of the operator ndjson extract: a geojson feature whose
/// properties carry the license metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperatorExtract {
    pub properties: OperatorProperties,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperatorProperties {
    pub onestop_id: String,
    pub name: String,
    #[serde(default)]
    pub license: OperatorLicense,
    #[serde(default)]
    pub license_attribution_text: Option<String>,
}

/// The feed license as transitland publishes it. String-valued flags
/// ("yes"/"no") are kept as strings, matching the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorLicense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spdx_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_without_attribution: Option<String>,
}

impl OperatorLicense {
    fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.spdx_identifier.is_none()
            && self.attribution_instructions.is_none()
            && self.use_without_attribution.is_none()
    }
}

/// What the site renders per feed that requires credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub key: String,
    pub name: String,
    pub license: LicenseAttribution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseAttribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spdx_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr_text: Option<String>,
}

impl Attribution {
    /// `None` for feeds that need no credit: an unlicensed extract, or a
    /// license that explicitly allows use without attribution.
    pub fn from_operator(operator: &OperatorProperties) -> Option<Attribution> {
        let license = &operator.license;
        if license.is_empty() {
            return None;
        }
        if license.use_without_attribution.as_deref() == Some("yes") {
            return None;
        }

        Some(Attribution {
            key: operator.onestop_id.clone(),
            name: operator.name.clone(),
            license: LicenseAttribution {
                url: license.url.clone(),
                spdx_identifier: license.spdx_identifier.clone(),
                attribution_instructions: license.attribution_instructions.clone(),
                attr_text: operator.license_attribution_text.clone(),
            },
        })
    }
}

#[cfg(test)]
mod test {
    use super::{Attribution, OperatorExtract};

    fn extract(json: &str) -> OperatorExtract {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_license_needs_no_credit() {
        let operator = extract(
            r#"{"properties": {"onestop_id": "o-9q9-bart", "name": "BART", "license": {}}}"#,
        );
        assert_eq!(Attribution::from_operator(&operator.properties), None);
    }

    #[test]
    fn absent_license_needs_no_credit() {
        let operator = extract(r#"{"properties": {"onestop_id": "o-9q9-bart", "name": "BART"}}"#);
        assert_eq!(Attribution::from_operator(&operator.properties), None);
    }

    #[test]
    fn use_without_attribution_needs_no_credit() {
        let operator = extract(
            r#"{"properties": {"onestop_id": "o-9q9-bart", "name": "BART",
                "license": {"use_without_attribution": "yes", "url": "https://example.com"}}}"#,
        );
        assert_eq!(Attribution::from_operator(&operator.properties), None);
    }

    #[test]
    fn license_fields_are_copied() {
        let operator = extract(
            r#"{"properties": {"onestop_id": "o-9q8-samtrans", "name": "SamTrans",
                "license": {"url": "https://example.com/tos", "spdx_identifier": "CC-BY-4.0"},
                "license_attribution_text": "Data provided by SamTrans"}}"#,
        );
        let attribution = Attribution::from_operator(&operator.properties).unwrap();
        assert_eq!(attribution.key, "o-9q8-samtrans");
        assert_eq!(attribution.name, "SamTrans");
        assert_eq!(attribution.license.url.as_deref(), Some("https://example.com/tos"));
        assert_eq!(attribution.license.spdx_identifier.as_deref(), Some("CC-BY-4.0"));
        assert_eq!(
            attribution.license.attr_text.as_deref(),
            Some("Data provided by SamTrans")
        );
        assert_eq!(attribution.license.attribution_instructions, None);

        // absent fields stay out of the serialized record
        let json = serde_json::to_value(&attribution).unwrap();
        assert!(json["license"].get("attribution_instructions").is_none());
    }

    #[test]
    fn no_after_use_without_attribution_still_credits() {
        let operator = extract(
            r#"{"properties": {"onestop_id": "o-x", "name": "X",
                "license": {"use_without_attribution": "no"}}}"#,
        );
        assert!(Attribution::from_operator(&operator.properties).is_some());
    }
}
