//! Domain types for the celestial object catalogue.

pub mod celestial_object;
pub mod macros;

pub use celestial_object::*;
