use std::rc::Rc;

use chrono::NaiveDateTime;
use serde::Deserialize;

/// Fields shared by every element the Leipziger Ecken service publishes,
/// plus the relationships common to all of them.
#[derive(Debug, Clone)]
pub struct EntityCore {
    pub id: String,
    pub active: Option<bool>,
    pub title: Option<String>,
    pub created: Option<NaiveDateTime>,
    pub changed: Option<NaiveDateTime>,
    pub published_at: Option<NaiveDateTime>,
    pub path: Option<PathAlias>,
    pub address: Option<Address>,
    pub geodata: Option<GeoData>,
    pub description: Option<Description>,
    pub barrier_free_location: Option<bool>,
    pub district: Option<Rc<District>>,
    pub image: Option<Image>,
    pub target_groups: Vec<Rc<TargetGroup>>,
    pub tags: Vec<Rc<Tag>>,
    pub categories: Vec<Rc<Category>>,
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub core: EntityCore,
    pub contact_person: Option<String>,
    pub contact_person_function: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub opening_times: Option<String>,
    pub external_url: Option<ExternalUrl>,
    pub actor_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub core: EntityCore,
    pub occurrences: Vec<Occurrence>,
    pub external_website: Option<ExternalUrl>,
    pub is_featured: bool,
    pub online_event: bool,
    pub organizer: Option<Rc<Actor>>,
}

/// One schedule entry of an event, either a single date or one rule of a
/// recurring series. `start` is required on the wire (`value`), the rest is
/// optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Occurrence {
    #[serde(rename = "value", deserialize_with = "datetime::required")]
    pub start: NaiveDateTime,
    #[serde(rename = "end_value", default, deserialize_with = "datetime::option")]
    pub end: Option<NaiveDateTime>,
    pub rrule: Option<String>,
    pub timezone: Option<String>,
    pub infinite: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoData {
    pub value: String,
    pub geo_type: String,
    pub lat: f64,
    pub lon: f64,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub geohash: String,
    pub latlon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    pub langcode: Option<String>,
    pub country_code: Option<String>,
    pub administrative_area: Option<String>,
    pub locality: String,
    pub dependent_locality: Option<String>,
    pub postal_code: String,
    pub sorting_code: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub organization: Option<String>,
    pub given_name: Option<String>,
    pub additional_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Description {
    pub value: String,
    pub format: DescriptionFormat,
    pub processed: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionFormat {
    BasicHtml,
    FullHtml,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUrl {
    pub uri: String,
    pub title: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

// Unaliased nodes ship a path object with null members, so every field is
// optional even though the service usually fills them all.
#[derive(Debug, Clone, Deserialize)]
pub struct PathAlias {
    pub alias: Option<String>,
    pub pid: Option<i64>,
    pub langcode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct District {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TargetGroup {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub id: String,
    pub name: Option<String>,
}

/// Category terms form a tree. The parent is kept as an id and resolved
/// against the decode side-table on demand; the service does not guarantee
/// the chain is acyclic, so traversals must bound their depth.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub name: Option<String>,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Image {
    pub id: String,
    pub filename: Option<String>,
    pub uri: Option<Uri>,
    pub filemime: Option<String>,
    pub filesize: Option<u64>,
    pub meta: Option<ImageMetaData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageMetaData {
    pub alt: Option<String>,
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Uri {
    pub value: String,
    pub url: String,
}

/// Strict ISO-8601 offset date-time parsing for attribute timestamps. The
/// offset is parsed and then dropped; comparisons downstream are in local
/// wall-clock terms. A non-conforming string is a decode error, never a
/// coerced value.
pub(crate) mod datetime {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    pub fn required<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(serde::de::Error::custom)
    }

    pub fn option<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(value) => parse(&value).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }

    fn parse(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).map(|parsed| parsed.naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn parses_occurrence_timestamps() {
        let occurrence: Occurrence = serde_json::from_str(
            r#"{
                "value": "2026-09-12T19:30:00+02:00",
                "end_value": "2026-09-12T22:00:00+02:00",
                "rrule": null,
                "timezone": "Europe/Berlin",
                "infinite": false
            }"#,
        )
        .expect("occurrence decodes");

        assert_eq!(
            occurrence.start.date(),
            NaiveDate::from_ymd_opt(2026, 9, 12).expect("valid date")
        );
        assert_eq!(occurrence.start.hour(), 19);
        assert_eq!(occurrence.end.expect("end present").hour(), 22);
        assert_eq!(occurrence.timezone.as_deref(), Some("Europe/Berlin"));
        assert!(!occurrence.infinite);
    }

    #[test]
    fn open_ended_occurrence_has_no_end() {
        let occurrence: Occurrence =
            serde_json::from_str(r#"{"value": "2026-01-01T10:00:00+01:00", "infinite": true}"#)
                .expect("occurrence decodes");

        assert!(occurrence.end.is_none());
        assert!(occurrence.rrule.is_none());
        assert!(occurrence.infinite);
    }

    #[test]
    fn rejects_non_iso_timestamp() {
        let result: Result<Occurrence, _> =
            serde_json::from_str(r#"{"value": "12.09.2026 19:30", "infinite": false}"#);
        assert!(result.is_err());
    }

    #[test]
    fn description_format_is_typed() {
        let description: Description = serde_json::from_str(
            r#"{"value": "<p>Hi</p>", "format": "basic_html", "processed": "<p>Hi</p>"}"#,
        )
        .expect("description decodes");
        assert_eq!(description.format, DescriptionFormat::BasicHtml);
    }
}
