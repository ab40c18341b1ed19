//! Celestial object entity and satellite resolution.
//!
//! A [`CelestialObject`] may orbit another object through `orbited_object_id`.
//! The inverse side of that relation, the `satellites` list, is never stored:
//! it is rebuilt one level deep every time an object is read.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

crate::define_id_type!(i32, CelestialObjectId);

/// A body in the catalogue (star, planet, moon, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CelestialObject {
    /// Storage-assigned primary key
    pub id: CelestialObjectId,
    pub name: String,
    /// Duration of one orbit, if known
    pub orbital_period: Option<f64>,
    /// The object this one orbits (`None` for roots such as stars)
    pub orbited_object_id: Option<CelestialObjectId>,
    /// Direct children, computed at read time
    #[serde(default)]
    pub satellites: Vec<CelestialObject>,
}

/// Caller-supplied fields for create and full update.
///
/// `id` and `satellites` are not part of the payload; if a client sends them
/// they are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CelestialObjectPayload {
    pub name: String,
    pub orbital_period: Option<f64>,
    pub orbited_object_id: Option<CelestialObjectId>,
}

impl CelestialObject {
    /// Build a stored object from its assigned id and the caller's payload.
    pub fn new(id: CelestialObjectId, payload: CelestialObjectPayload) -> Self {
        Self {
            id,
            name: payload.name,
            orbital_period: payload.orbital_period,
            orbited_object_id: payload.orbited_object_id,
            satellites: Vec::new(),
        }
    }

    /// Whether this object directly orbits `parent`.
    pub fn orbits(&self, parent: CelestialObjectId) -> bool {
        self.orbited_object_id == Some(parent)
    }

    /// Overwrite the three mutable fields. The id is left untouched.
    pub fn apply(&mut self, payload: CelestialObjectPayload) {
        self.name = payload.name;
        self.orbital_period = payload.orbital_period;
        self.orbited_object_id = payload.orbited_object_id;
    }

    pub fn with_satellites(mut self, satellites: Vec<CelestialObject>) -> Self {
        self.satellites = satellites;
        self
    }

    /// Copy of this object without its satellite view.
    pub fn detached(&self) -> Self {
        Self {
            satellites: Vec::new(),
            ..self.clone()
        }
    }
}

/// Attach direct satellites to every object of an already-fetched set.
///
/// Children are looked up only inside `objects`; no storage access happens
/// here. Each satellite is detached, so the view stays one level deep even
/// when the set contains grandchildren. Input order is preserved, both for the
/// returned objects and inside each satellite list.
pub fn attach_satellites(objects: Vec<CelestialObject>) -> Vec<CelestialObject> {
    let mut by_parent: HashMap<CelestialObjectId, Vec<CelestialObject>> = HashMap::new();
    for object in &objects {
        if let Some(parent) = object.orbited_object_id {
            by_parent.entry(parent).or_default().push(object.detached());
        }
    }

    objects
        .into_iter()
        .map(|object| {
            let satellites = by_parent.remove(&object.id).unwrap_or_default();
            object.with_satellites(satellites)
        })
        .collect()
}
