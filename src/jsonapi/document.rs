use std::collections::HashMap;
use std::slice;

use serde::Deserialize;
use serde_json::{Map, Value};

/// One JSON:API response document. `data` is required; a response without
/// it is structurally broken and fails the whole walk. `included` is the
/// side-loaded resource list relationships resolve against.
#[derive(Debug, Deserialize)]
pub struct Document {
    pub data: Vec<Resource>,
    #[serde(default)]
    pub included: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub relationships: HashMap<String, Relationship>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

/// A (type, id) reference into `included`. Drupal hangs reference-specific
/// data (image alt text, dimensions) off the identifier's `meta` member.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
}

impl Resource {
    pub fn relationship_one(&self, name: &str) -> Option<&ResourceIdentifier> {
        match self.relationships.get(name)?.data.as_ref()? {
            RelationshipData::One(identifier) => Some(identifier),
            RelationshipData::Many(identifiers) => identifiers.first(),
        }
    }

    pub fn relationship_many(&self, name: &str) -> &[ResourceIdentifier] {
        match self.relationships.get(name).and_then(|rel| rel.data.as_ref()) {
            Some(RelationshipData::One(identifier)) => slice::from_ref(identifier),
            Some(RelationshipData::Many(identifiers)) => identifiers,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DOCUMENT: &str = r#"{
        "data": [{
            "type": "akteur",
            "id": "a1",
            "attributes": {"title": "Stadtteilladen"},
            "relationships": {
                "district": {"data": {"type": "bezirk", "id": "d1"}},
                "tags": {"data": [
                    {"type": "tag", "id": "t1"},
                    {"type": "tag", "id": "t2"}
                ]},
                "image": {"data": null}
            }
        }],
        "included": [{"type": "bezirk", "id": "d1", "attributes": {"name": "Volkmarsdorf"}}]
    }"#;

    #[test]
    fn parses_document_with_relationships() {
        let document: Document =
            serde_json::from_str(SAMPLE_DOCUMENT).expect("document decodes");
        assert_eq!(document.data.len(), 1);
        assert_eq!(document.included.len(), 1);

        let resource = &document.data[0];
        assert_eq!(resource.kind, "akteur");
        let district = resource
            .relationship_one("district")
            .expect("district reference");
        assert_eq!(district.id, "d1");
        assert_eq!(resource.relationship_many("tags").len(), 2);
        assert!(resource.relationship_one("image").is_none());
        assert!(resource.relationship_many("categories").is_empty());
    }

    #[test]
    fn rejects_document_without_data() {
        let result: Result<Document, _> = serde_json::from_str(r#"{"included": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_included_defaults_to_empty() {
        let document: Document =
            serde_json::from_str(r#"{"data": []}"#).expect("document decodes");
        assert!(document.data.is_empty());
        assert!(document.included.is_empty());
    }
}
