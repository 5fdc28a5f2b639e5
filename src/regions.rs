/// Region (maakunta) and municipality (kunta) identifier lookups.
///
/// A `MappingTable` is the cross-reference between municipality codes, the
/// region each municipality belongs to, and the official names of both in
/// Finnish, Swedish and English. It is built from a dataset with these columns:
///
///   municipality_id, region_id                      (int64)
///   municipality_fi, municipality_sv, municipality_en,
///   region_fi, region_sv, region_en                 (object or category)
///
/// Every lookup is an exact, case-sensitive scan in row order and returns
/// `None` when nothing matches.

use std::path::Path;

use crate::codec;
use crate::error::{Error, Result};
use crate::logging;
use crate::model::{ColumnType, Dataset, Value};

/// Name that stands for the whole country in region-level statistics.
pub const WHOLE_COUNTRY: &str = "WHOLE COUNTRY";

/// Region id used for `WHOLE_COUNTRY`.
pub const WHOLE_COUNTRY_ID: u32 = 0;

pub const ID_COLUMNS: [&str; 2] = ["municipality_id", "region_id"];

pub const NAME_COLUMNS: [&str; 6] = [
    "municipality_fi",
    "municipality_sv",
    "municipality_en",
    "region_fi",
    "region_sv",
    "region_en",
];

// ---------------------------------------------------------------------------
// Mapping rows
// ---------------------------------------------------------------------------

/// One municipality and the region it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub municipality_id: u32,
    pub region_id: u32,
    pub municipality_fi: Option<String>,
    pub municipality_sv: Option<String>,
    pub municipality_en: Option<String>,
    pub region_fi: Option<String>,
    pub region_sv: Option<String>,
    pub region_en: Option<String>,
}

impl MappingRow {
    fn municipality_names(&self) -> [Option<&str>; 3] {
        [
            self.municipality_fi.as_deref(),
            self.municipality_sv.as_deref(),
            self.municipality_en.as_deref(),
        ]
    }

    fn region_names(&self) -> [Option<&str>; 3] {
        [
            self.region_fi.as_deref(),
            self.region_sv.as_deref(),
            self.region_en.as_deref(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    rows: Vec<MappingRow>,
}

impl MappingTable {
    pub fn new(rows: Vec<MappingRow>) -> Self {
        Self { rows }
    }

    /// Reads a mapping dataset file written by `codec::save_dataset`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let dataset = codec::load_dataset(path)?;
        Self::from_dataset(&dataset)
    }

    pub fn from_dataset(data: &Dataset) -> Result<Self> {
        let mut id_idx = [0usize; 2];
        for (slot, name) in id_idx.iter_mut().zip(ID_COLUMNS) {
            *slot = data.require_column(name)?;
            if data.columns()[*slot].dtype != ColumnType::Int64 {
                return Err(Error::schema(format!("column '{}' must be int64", name)));
            }
        }

        let mut name_idx = [0usize; 6];
        for (slot, name) in name_idx.iter_mut().zip(NAME_COLUMNS) {
            *slot = data.require_column(name)?;
            if !matches!(
                data.columns()[*slot].dtype,
                ColumnType::Object | ColumnType::Category
            ) {
                return Err(Error::schema(format!("column '{}' must hold text", name)));
            }
        }

        let mut rows = Vec::with_capacity(data.len());
        for (n, row) in data.rows().iter().enumerate() {
            let id = |col: usize| -> Result<u32> {
                match &row[id_idx[col]] {
                    Value::Int(i) => u32::try_from(*i).map_err(|_| {
                        Error::schema(format!("row {}: {} {} out of range", n, ID_COLUMNS[col], i))
                    }),
                    _ => Err(Error::schema(format!("row {}: {} is missing", n, ID_COLUMNS[col]))),
                }
            };
            let text = |col: usize| row[name_idx[col]].as_str().map(String::from);

            rows.push(MappingRow {
                municipality_id: id(0)?,
                region_id: id(1)?,
                municipality_fi: text(0),
                municipality_sv: text(1),
                municipality_en: text(2),
                region_fi: text(3),
                region_sv: text(4),
                region_en: text(5),
            });
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn find_by_mid(&self, municipality_id: u32) -> Option<&MappingRow> {
        let found = self.rows.iter().find(|r| r.municipality_id == municipality_id);
        if found.is_none() {
            logging::log_lookup_miss("municipality id", &municipality_id.to_string());
        }
        found
    }

    /// Region that contains the municipality.
    pub fn rid_by_mid(&self, municipality_id: u32) -> Option<u32> {
        self.find_by_mid(municipality_id).map(|r| r.region_id)
    }

    /// Region id for a region name in any of the three languages.
    /// `WHOLE_COUNTRY` maps to `WHOLE_COUNTRY_ID`.
    pub fn rid_by_name(&self, region_name: &str) -> Option<u32> {
        if region_name == WHOLE_COUNTRY {
            return Some(WHOLE_COUNTRY_ID);
        }
        let found = self
            .rows
            .iter()
            .find(|r| r.region_names().contains(&Some(region_name)))
            .map(|r| r.region_id);
        if found.is_none() {
            logging::log_lookup_miss("region name", region_name);
        }
        found
    }

    /// Municipality id for a municipality name in any of the three languages.
    pub fn mid_by_name(&self, municipality_name: &str) -> Option<u32> {
        let found = self
            .rows
            .iter()
            .find(|r| r.municipality_names().contains(&Some(municipality_name)))
            .map(|r| r.municipality_id);
        if found.is_none() {
            logging::log_lookup_miss("municipality name", municipality_name);
        }
        found
    }

    /// English name of the municipality.
    pub fn name_by_mid(&self, municipality_id: u32) -> Option<&str> {
        self.find_by_mid(municipality_id)
            .and_then(|r| r.municipality_en.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Free-function forms
// ---------------------------------------------------------------------------

pub fn get_rid_by_mid(municipality_id: u32, mappings: &MappingTable) -> Option<u32> {
    mappings.rid_by_mid(municipality_id)
}

pub fn get_rid_by_name(region_name: &str, mappings: &MappingTable) -> Option<u32> {
    mappings.rid_by_name(region_name)
}

pub fn get_mid_by_name(municipality_name: &str, mappings: &MappingTable) -> Option<u32> {
    mappings.mid_by_name(municipality_name)
}

pub fn get_name_by_mid(municipality_id: u32, mappings: &MappingTable) -> Option<&str> {
    mappings.name_by_mid(municipality_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    fn mapping_dataset() -> Dataset {
        let mut columns = vec![
            Column::new("municipality_id", ColumnType::Int64),
            Column::new("region_id", ColumnType::Int64),
        ];
        columns.extend(NAME_COLUMNS.iter().map(|n| Column::new(*n, ColumnType::Object)));
        let mut ds = Dataset::new(columns).unwrap();

        let rows: [(i64, i64, [&str; 6]); 3] = [
            (91, 1, ["Helsinki", "Helsingfors", "Helsinki", "Uusimaa", "Nyland", "Uusimaa"]),
            (853, 2, ["Turku", "Åbo", "Turku", "Varsinais-Suomi", "Egentliga Finland", "Southwest Finland"]),
            (49, 1, ["Espoo", "Esbo", "Espoo", "Uusimaa", "Nyland", "Uusimaa"]),
        ];
        for (mid, rid, names) in rows {
            let mut values = vec![Value::Int(mid), Value::Int(rid)];
            values.extend(names.iter().map(|n| Value::from(*n)));
            ds.push_row(values).unwrap();
        }
        ds
    }

    fn table() -> MappingTable {
        MappingTable::from_dataset(&mapping_dataset()).expect("fixture is well-formed")
    }

    #[test]
    fn test_rid_by_mid() {
        assert_eq!(table().rid_by_mid(853), Some(2));
        assert_eq!(table().rid_by_mid(49), Some(1));
    }

    #[test]
    fn test_rid_by_name_in_each_language() {
        let t = table();
        assert_eq!(t.rid_by_name("Varsinais-Suomi"), Some(2));
        assert_eq!(t.rid_by_name("Egentliga Finland"), Some(2));
        assert_eq!(t.rid_by_name("Southwest Finland"), Some(2));
    }

    #[test]
    fn test_whole_country_is_region_zero() {
        assert_eq!(table().rid_by_name(WHOLE_COUNTRY), Some(0));
        assert_eq!(MappingTable::default().rid_by_name(WHOLE_COUNTRY), Some(0));
    }

    #[test]
    fn test_mid_by_name_in_each_language() {
        let t = table();
        assert_eq!(t.mid_by_name("Åbo"), Some(853));
        assert_eq!(t.mid_by_name("Esbo"), Some(49));
        assert_eq!(t.mid_by_name("Helsinki"), Some(91));
    }

    #[test]
    fn test_name_by_mid_returns_english_name() {
        assert_eq!(table().name_by_mid(853), Some("Turku"));
    }

    #[test]
    fn test_misses_return_none() {
        let t = table();
        assert_eq!(t.rid_by_mid(999), None);
        assert_eq!(t.rid_by_name("Lappi"), None);
        assert_eq!(t.mid_by_name("Oulu"), None);
        assert_eq!(t.name_by_mid(999), None);
    }

    #[test]
    fn test_names_match_case_sensitively_and_exactly() {
        let t = table();
        assert_eq!(t.mid_by_name("turku"), None);
        assert_eq!(t.mid_by_name("Turk"), None);
        assert_eq!(t.rid_by_name("whole country"), None);
    }

    #[test]
    fn test_first_row_wins_on_duplicates() {
        let mut rows = table().rows().to_vec();
        let mut dup = rows[0].clone();
        dup.municipality_id = 92;
        rows.push(dup);
        assert_eq!(MappingTable::new(rows).mid_by_name("Helsinki"), Some(91));
    }

    #[test]
    fn test_missing_column_rejected() {
        let ds = Dataset::new(vec![Column::new("municipality_id", ColumnType::Int64)]).unwrap();
        let err = MappingTable::from_dataset(&ds).unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { ref name } if name == "region_id"));
    }

    #[test]
    fn test_null_id_rejected() {
        let mut ds = mapping_dataset();
        let mut row = vec![Value::Null, Value::Int(1)];
        row.extend((0..6).map(|_| Value::from("x")));
        ds.push_row(row).unwrap();
        assert!(matches!(MappingTable::from_dataset(&ds), Err(Error::Schema { .. })));
    }

    #[test]
    fn test_free_functions_delegate() {
        let t = table();
        assert_eq!(get_rid_by_mid(91, &t), Some(1));
        assert_eq!(get_rid_by_name("Nyland", &t), Some(1));
        assert_eq!(get_mid_by_name("Turku", &t), Some(853));
        assert_eq!(get_name_by_mid(49, &t), Some("Espoo"));
    }
}
