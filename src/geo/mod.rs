//! Geospatial helpers for placing WGS84 coordinates into municipalities.
//!
//! Submodules:
//! - `crs`: coordinate systems and transforms (WGS84, ETRS-TM35FIN, Web Mercator).
//! - `polygon`: polygon geometry and point containment.
//! - `map`: GeoJSON municipality maps and the spatial join.

pub mod crs;
pub mod map;
pub mod polygon;

pub use crs::{Crs, Point};
pub use map::{get_mid_by_coords, Feature, MunicipalityMap, DEFAULT_CODE_PROPERTY};
pub use polygon::{Geometry, Polygon};
