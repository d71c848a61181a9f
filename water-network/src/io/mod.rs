/// Contains functions for reading and writing feature layers as GeoJSON.
pub mod layers;
