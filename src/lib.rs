//! Helpers for working with Finnish regional statistics.
//!
//! - `model` / `codec`: typed tabular datasets and their two-header-line text format
//! - `regions`: municipality and region id/name lookups
//! - `geo`: placing coordinates into municipalities
//! - `calendar`: quarter ends
//! - `chart`: stacked area, line, bar and facet-grid charts rendered to SVG
//! - `config` / `logging`: TOML configuration and leveled logging for batch runs

pub mod calendar;
pub mod chart;
pub mod codec;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod model;
pub mod pivot;
pub mod regions;

pub use calendar::{last_day_of_quarter, quarter_end_value};
pub use codec::{load_dataset, read_dataset, save_dataset, write_dataset};
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{get_mid_by_coords, MunicipalityMap};
pub use model::{Column, ColumnType, Dataset, Value};
pub use pivot::PivotTable;
pub use regions::{get_mid_by_name, get_name_by_mid, get_rid_by_mid, get_rid_by_name, MappingTable};
