use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, Geometry};
use serde_json::{Map, Value};

use crate::models::{Actor, EntityCore, Event, GeoData};

const DATE_FORMAT: &str = "%d.%m.%Y";

/// Prepares a free-text value for embedding as a GeoJSON property. Blank
/// strings become an absent value; newlines and tabs each collapse to a
/// single space. Quote escaping is left to the serializer.
pub fn sanitize(input: &str) -> Option<String> {
    if input.trim().is_empty() {
        return None;
    }
    Some(input.replace(['\n', '\t'], " "))
}

fn text_property(value: Option<&str>) -> Value {
    value
        .and_then(sanitize)
        .map(Value::String)
        .unwrap_or(Value::Null)
}

pub fn actor_feature(actor: &Actor) -> Feature {
    let core = &actor.core;
    let mut properties = Map::new();
    properties.insert("title".to_string(), text_property(core.title.as_deref()));
    properties.insert(
        "description".to_string(),
        text_property(core.description.as_ref().map(|d| d.processed.as_str())),
    );
    properties.insert(
        "address1".to_string(),
        text_property(core.address.as_ref().map(|a| a.address_line1.as_str())),
    );
    properties.insert(
        "address2".to_string(),
        text_property(core.address.as_ref().and_then(|a| a.address_line2.as_deref())),
    );
    properties.insert(
        "url".to_string(),
        text_property(actor.external_url.as_ref().map(|u| u.uri.as_str())),
    );
    properties.insert(
        "contact".to_string(),
        text_property(actor.contact_person.as_deref()),
    );
    properties.insert(
        "email".to_string(),
        text_property(actor.contact_email.as_deref()),
    );
    properties.insert(
        "openingTimes".to_string(),
        text_property(actor.opening_times.as_deref()),
    );
    feature(core, properties)
}

/// The start/end pair comes from the first occurrence in list order that is
/// not fully past, judged against the full current instant. This is looser
/// than the midnight-based event filter on purpose; the two predicates are
/// kept separate.
pub fn event_feature(event: &Event, now: NaiveDateTime) -> Feature {
    let core = &event.core;
    let upcoming = event
        .occurrences
        .iter()
        .find(|occurrence| {
            occurrence.start > now || occurrence.end.map_or(true, |end| end > now)
        });

    let mut properties = Map::new();
    properties.insert("title".to_string(), text_property(core.title.as_deref()));
    properties.insert(
        "description".to_string(),
        text_property(core.description.as_ref().map(|d| d.processed.as_str())),
    );
    properties.insert(
        "address1".to_string(),
        text_property(core.address.as_ref().map(|a| a.address_line1.as_str())),
    );
    properties.insert(
        "address2".to_string(),
        text_property(core.address.as_ref().and_then(|a| a.address_line2.as_deref())),
    );
    properties.insert(
        "actor".to_string(),
        text_property(
            event
                .organizer
                .as_ref()
                .and_then(|organizer| organizer.core.title.as_deref()),
        ),
    );
    properties.insert(
        "url".to_string(),
        text_property(event.external_website.as_ref().map(|u| u.uri.as_str())),
    );
    properties.insert(
        "start".to_string(),
        upcoming
            .map(|occurrence| Value::String(occurrence.start.format(DATE_FORMAT).to_string()))
            .unwrap_or(Value::Null),
    );
    properties.insert(
        "end".to_string(),
        upcoming
            .and_then(|occurrence| occurrence.end)
            .map(|end| Value::String(end.format(DATE_FORMAT).to_string()))
            .unwrap_or(Value::Null),
    );
    feature(core, properties)
}

fn feature(core: &EntityCore, properties: Map<String, Value>) -> Feature {
    Feature {
        bbox: None,
        geometry: point(core.geodata.as_ref()),
        id: Some(Id::String(core.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

// Longitude first, per the GeoJSON position order.
fn point(geodata: Option<&GeoData>) -> Option<Geometry> {
    geodata.map(|geo| Geometry::new(geojson::Value::Point(vec![geo.lon, geo.lat])))
}

/// Wraps the features into a FeatureCollection and overwrites the target
/// file, creating the output directory if needed. Returns the absolute path
/// for the report line.
pub fn write_feature_collection(features: Vec<Feature>, path: &Path) -> Result<PathBuf> {
    let collection = GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    });

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create output directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &collection)
        .with_context(|| format!("unable to write {}", path.display()))?;

    path.canonicalize()
        .with_context(|| format!("unable to resolve {}", path.display()))
}
