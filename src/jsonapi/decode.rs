use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::document::{Document, Resource, ResourceIdentifier};
use crate::models::{
    Actor, Address, Category, Description, District, EntityCore, Event, ExternalUrl, GeoData,
    Image, ImageMetaData, Occurrence, PathAlias, Tag, TargetGroup, Uri,
};

const ACTOR_TYPE: &str = "akteur";
const DISTRICT_TYPE: &str = "bezirk";
const FILE_TYPE: &str = "file";
const TARGET_GROUP_TYPE: &str = "target_group";
const TAG_TYPE: &str = "tag";
const CATEGORY_TYPE: &str = "category";

/// Category trees come from user-editable taxonomy; chains longer than this
/// are treated as broken and cut off.
const MAX_CATEGORY_DEPTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unable to decode {kind} {id}: {source}")]
    Attributes {
        kind: String,
        id: String,
        source: serde_json::Error,
    },
}

/// Decodes a typed entity out of one primary resource, resolving its
/// relationships against the document's side-table.
pub trait FromResource: Sized {
    fn from_resource(resource: &Resource, included: &IncludedTable) -> Result<Self, DecodeError>;
}

/// Side-table of a document's `included` resources, keyed by (type, id).
/// Relationship attachment is a lookup handing out shared references, not a
/// copy of the resource.
#[derive(Default)]
pub struct IncludedTable {
    districts: HashMap<String, Rc<District>>,
    images: HashMap<String, Rc<Image>>,
    target_groups: HashMap<String, Rc<TargetGroup>>,
    tags: HashMap<String, Rc<Tag>>,
    categories: HashMap<String, Rc<Category>>,
    actors: HashMap<String, Rc<Actor>>,
}

impl IncludedTable {
    /// Builds the table in two passes: leaf resources first, then included
    /// actors, whose own relationships resolve against the leaves.
    pub fn from_document(document: &Document) -> Self {
        let mut table = IncludedTable::default();
        let mut actors = Vec::new();

        for resource in &document.included {
            let result = match resource.kind.as_str() {
                DISTRICT_TYPE => table.insert_district(resource),
                FILE_TYPE => table.insert_image(resource),
                TARGET_GROUP_TYPE => table.insert_target_group(resource),
                TAG_TYPE => table.insert_tag(resource),
                CATEGORY_TYPE => table.insert_category(resource),
                ACTOR_TYPE => {
                    actors.push(resource);
                    Ok(())
                }
                // Unknown side-loaded types are irrelevant to the schemas
                // decoded here.
                _ => Ok(()),
            };
            if let Err(err) = result {
                eprintln!("skipping included resource: {err}");
            }
        }

        for resource in actors {
            match Actor::from_resource(resource, &table) {
                Ok(actor) => {
                    table.actors.insert(resource.id.clone(), Rc::new(actor));
                }
                Err(err) => eprintln!("skipping included resource: {err}"),
            }
        }

        table
    }

    fn insert_district(&mut self, resource: &Resource) -> Result<(), DecodeError> {
        let attrs: NamedAttributes = attributes(resource)?;
        self.districts.insert(
            resource.id.clone(),
            Rc::new(District {
                id: resource.id.clone(),
                name: attrs.name,
            }),
        );
        Ok(())
    }

    fn insert_image(&mut self, resource: &Resource) -> Result<(), DecodeError> {
        let attrs: FileAttributes = attributes(resource)?;
        self.images.insert(
            resource.id.clone(),
            Rc::new(Image {
                id: resource.id.clone(),
                filename: attrs.filename,
                uri: attrs.uri,
                filemime: attrs.filemime,
                filesize: attrs.filesize,
                meta: None,
            }),
        );
        Ok(())
    }

    fn insert_target_group(&mut self, resource: &Resource) -> Result<(), DecodeError> {
        let attrs: NamedAttributes = attributes(resource)?;
        self.target_groups.insert(
            resource.id.clone(),
            Rc::new(TargetGroup {
                id: resource.id.clone(),
                name: attrs.name,
            }),
        );
        Ok(())
    }

    fn insert_tag(&mut self, resource: &Resource) -> Result<(), DecodeError> {
        let attrs: NamedAttributes = attributes(resource)?;
        self.tags.insert(
            resource.id.clone(),
            Rc::new(Tag {
                id: resource.id.clone(),
                name: attrs.name,
            }),
        );
        Ok(())
    }

    fn insert_category(&mut self, resource: &Resource) -> Result<(), DecodeError> {
        let attrs: NamedAttributes = attributes(resource)?;
        // The service exposes the parent term under the "region" relationship.
        let parent_id = resource
            .relationship_one("region")
            .map(|identifier| identifier.id.clone());
        self.categories.insert(
            resource.id.clone(),
            Rc::new(Category {
                id: resource.id.clone(),
                name: attrs.name,
                parent_id,
            }),
        );
        Ok(())
    }

    fn district(&self, identifier: &ResourceIdentifier) -> Option<Rc<District>> {
        lookup(&self.districts, DISTRICT_TYPE, identifier)
    }

    fn target_group(&self, identifier: &ResourceIdentifier) -> Option<Rc<TargetGroup>> {
        lookup(&self.target_groups, TARGET_GROUP_TYPE, identifier)
    }

    fn tag(&self, identifier: &ResourceIdentifier) -> Option<Rc<Tag>> {
        lookup(&self.tags, TAG_TYPE, identifier)
    }

    fn category(&self, identifier: &ResourceIdentifier) -> Option<Rc<Category>> {
        lookup(&self.categories, CATEGORY_TYPE, identifier)
    }

    fn actor(&self, identifier: &ResourceIdentifier) -> Option<Rc<Actor>> {
        lookup(&self.actors, ACTOR_TYPE, identifier)
    }

    pub fn category_by_id(&self, id: &str) -> Option<&Rc<Category>> {
        self.categories.get(id)
    }

    /// The alt text and dimensions live on the referencing relationship's
    /// meta, not on the file resource, so the attached image is materialized
    /// per reference with its metadata merged in.
    fn image(&self, identifier: &ResourceIdentifier) -> Option<Image> {
        if identifier.kind != FILE_TYPE {
            return None;
        }
        let file = self.images.get(&identifier.id)?;
        let mut image = (**file).clone();
        image.meta = identifier
            .meta
            .clone()
            .and_then(|meta| serde_json::from_value::<ImageMetaData>(Value::Object(meta)).ok());
        Some(image)
    }
}

fn lookup<T>(
    map: &HashMap<String, Rc<T>>,
    expected_kind: &str,
    identifier: &ResourceIdentifier,
) -> Option<Rc<T>> {
    if identifier.kind != expected_kind {
        return None;
    }
    map.get(&identifier.id).cloned()
}

/// Walks a category's parent chain through the side-table. Traversal is
/// depth-bounded and keeps a seen-set, so cyclic parent references (the
/// schema does not rule them out) terminate instead of recursing forever.
pub fn category_ancestry(table: &IncludedTable, category: &Category) -> Vec<Rc<Category>> {
    let mut chain = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(category.id.clone());

    let mut next = category.parent_id.clone();
    while let Some(id) = next {
        if chain.len() >= MAX_CATEGORY_DEPTH || !seen.insert(id.clone()) {
            break;
        }
        match table.category_by_id(&id) {
            Some(parent) => {
                next = parent.parent_id.clone();
                chain.push(Rc::clone(parent));
            }
            None => break,
        }
    }
    chain
}

/// Decodes all primary resources of one page. Items that fail to decode are
/// reported to stderr and dropped; the rest of the page still counts.
pub fn decode_page<T: FromResource>(document: &Document) -> Vec<T> {
    let included = IncludedTable::from_document(document);
    document
        .data
        .iter()
        .filter_map(|resource| match T::from_resource(resource, &included) {
            Ok(entity) => Some(entity),
            Err(err) => {
                eprintln!("{err}");
                None
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ElementAttributes {
    active: Option<bool>,
    title: Option<String>,
    #[serde(default, deserialize_with = "crate::models::datetime::option")]
    created: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "crate::models::datetime::option")]
    changed: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "crate::models::datetime::option")]
    published_at: Option<NaiveDateTime>,
    path: Option<PathAlias>,
    address: Option<Address>,
    geodata: Option<GeoData>,
    description: Option<Description>,
    barrier_free_location: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ActorAttributes {
    #[serde(flatten)]
    element: ElementAttributes,
    contact_person: Option<String>,
    contact_person_function: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    opening_times: Option<String>,
    external_url: Option<ExternalUrl>,
}

#[derive(Debug, Deserialize)]
struct EventAttributes {
    #[serde(flatten)]
    element: ElementAttributes,
    occurrences: Vec<Occurrence>,
    external_website: Option<ExternalUrl>,
    field_is_featured: bool,
    field_online_event: bool,
}

#[derive(Debug, Deserialize)]
struct NamedAttributes {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileAttributes {
    filename: Option<String>,
    uri: Option<Uri>,
    filemime: Option<String>,
    filesize: Option<u64>,
}

fn attributes<T: DeserializeOwned>(resource: &Resource) -> Result<T, DecodeError> {
    serde_json::from_value(Value::Object(resource.attributes.clone())).map_err(|source| {
        DecodeError::Attributes {
            kind: resource.kind.clone(),
            id: resource.id.clone(),
            source,
        }
    })
}

fn element_core(
    resource: &Resource,
    element: ElementAttributes,
    included: &IncludedTable,
) -> EntityCore {
    EntityCore {
        id: resource.id.clone(),
        active: element.active,
        title: element.title,
        created: element.created,
        changed: element.changed,
        published_at: element.published_at,
        path: element.path,
        address: element.address,
        geodata: element.geodata,
        description: element.description,
        barrier_free_location: element.barrier_free_location,
        district: resource
            .relationship_one("district")
            .and_then(|identifier| included.district(identifier)),
        image: resource
            .relationship_one("image")
            .and_then(|identifier| included.image(identifier)),
        target_groups: resource
            .relationship_many("targetGroups")
            .iter()
            .filter_map(|identifier| included.target_group(identifier))
            .collect(),
        tags: resource
            .relationship_many("tags")
            .iter()
            .filter_map(|identifier| included.tag(identifier))
            .collect(),
        categories: resource
            .relationship_many("categories")
            .iter()
            .filter_map(|identifier| included.category(identifier))
            .collect(),
    }
}

impl FromResource for Actor {
    fn from_resource(resource: &Resource, included: &IncludedTable) -> Result<Self, DecodeError> {
        let attrs: ActorAttributes = attributes(resource)?;
        Ok(Actor {
            core: element_core(resource, attrs.element, included),
            contact_person: attrs.contact_person,
            contact_person_function: attrs.contact_person_function,
            contact_email: attrs.contact_email,
            contact_phone: attrs.contact_phone,
            opening_times: attrs.opening_times,
            external_url: attrs.external_url,
            actor_type: resource
                .relationship_one("typ")
                .map(|identifier| identifier.id.clone()),
        })
    }
}

impl FromResource for Event {
    fn from_resource(resource: &Resource, included: &IncludedTable) -> Result<Self, DecodeError> {
        let attrs: EventAttributes = attributes(resource)?;
        Ok(Event {
            core: element_core(resource, attrs.element, included),
            occurrences: attrs.occurrences,
            external_website: attrs.external_website,
            is_featured: attrs.field_is_featured,
            online_event: attrs.field_online_event,
            organizer: resource
                .relationship_one("akteur")
                .and_then(|identifier| included.actor(identifier)),
        })
    }
}
