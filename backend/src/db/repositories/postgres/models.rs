use diesel::prelude::*;

use super::schema::celestial_objects;
use crate::models::{CelestialObject, CelestialObjectId, CelestialObjectPayload};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = celestial_objects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CelestialObjectRow {
    pub id: i32,
    pub name: String,
    pub orbital_period: Option<f64>,
    pub orbited_object_id: Option<i32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = celestial_objects)]
pub struct NewCelestialObjectRow {
    pub name: String,
    pub orbital_period: Option<f64>,
    pub orbited_object_id: Option<i32>,
}

/// Full overwrite of the mutable columns; `None` writes SQL NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = celestial_objects)]
#[diesel(treat_none_as_null = true)]
pub struct CelestialObjectChangeset {
    pub name: String,
    pub orbital_period: Option<f64>,
    pub orbited_object_id: Option<i32>,
}

impl From<CelestialObjectRow> for CelestialObject {
    fn from(row: CelestialObjectRow) -> Self {
        CelestialObject {
            id: CelestialObjectId(row.id),
            name: row.name,
            orbital_period: row.orbital_period,
            orbited_object_id: row.orbited_object_id.map(CelestialObjectId),
            satellites: Vec::new(),
        }
    }
}

impl From<&CelestialObjectPayload> for NewCelestialObjectRow {
    fn from(payload: &CelestialObjectPayload) -> Self {
        NewCelestialObjectRow {
            name: payload.name.clone(),
            orbital_period: payload.orbital_period,
            orbited_object_id: payload.orbited_object_id.map(i32::from),
        }
    }
}

impl From<&CelestialObject> for CelestialObjectChangeset {
    fn from(object: &CelestialObject) -> Self {
        CelestialObjectChangeset {
            name: object.name.clone(),
            orbital_period: object.orbital_period,
            orbited_object_id: object.orbited_object_id.map(i32::from),
        }
    }
}
