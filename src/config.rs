/// Configuration for batch runs
///
/// Read from a TOML file. Every key is optional; missing keys fall back to
/// the defaults below. `Config::from_env` additionally reads a `.env` file
/// and lets environment variables pick the config file and override the
/// data directory and log level.
///
/// ```toml
/// data_dir = "data"
/// mapping_file = "mappings.csv"
/// municipality_map = "municipalities.geojson"
/// map_code_property = "NATCODE"
///
/// [charts]
/// style = "ggplot"
/// palette = "tab10"
///
/// [logging]
/// level = "debug"
/// file = "kuntadata.log"
/// ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::{Figure, Palette, Style};
use crate::error::{Error, Result};
use crate::geo::{MunicipalityMap, DEFAULT_CODE_PROPERTY};
use crate::logging::{self, Component, LogLevel};
use crate::regions::MappingTable;

pub const CONFIG_PATH_VAR: &str = "KUNTADATA_CONFIG";
pub const DATA_DIR_VAR: &str = "KUNTADATA_DATA_DIR";
pub const LOG_LEVEL_VAR: &str = "KUNTADATA_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Region mapping dataset, relative to `data_dir`.
    pub mapping_file: String,
    /// Municipality GeoJSON, relative to `data_dir`.
    pub municipality_map: String,
    /// Feature property holding the municipality code.
    pub map_code_property: String,
    pub charts: ChartDefaults,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartDefaults {
    pub style: String,
    /// Inches.
    pub width: f64,
    pub height: f64,
    pub palette: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    /// Full timestamped entries on the console instead of short lines.
    pub timestamps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
            mapping_file: "mappings.csv".to_string(),
            municipality_map: "municipalities.geojson".to_string(),
            map_code_property: DEFAULT_CODE_PROPERTY.to_string(),
            charts: ChartDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ChartDefaults {
    fn default() -> Self {
        ChartDefaults {
            style: "default".to_string(),
            width: 12.0,
            height: 6.0,
            palette: "tab10".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        logging::debug(Component::Config, Some(&path.display().to_string()), "configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `.env` if present, then resolves against the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Builds a config from variables supplied by `lookup`: the file named by
    /// `KUNTADATA_CONFIG` (or the defaults), then the directory and level
    /// overrides.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(dir) = lookup(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            config.logging.level = level;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.log_level()?;
        Style::from_name(&self.charts.style)?;
        Palette::from_name(&self.charts.palette)?;
        if !(self.charts.width > 0.0 && self.charts.height > 0.0) {
            return Err(Error::Config {
                message: format!(
                    "chart size must be positive, got {}x{}",
                    self.charts.width, self.charts.height
                ),
            });
        }
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel> {
        self.logging.level.parse()
    }

    pub fn dataset_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    pub fn init_logging(&self) -> Result<()> {
        logging::init_logger(
            self.log_level()?,
            self.logging.file.as_deref(),
            self.logging.timestamps,
        );
        Ok(())
    }

    pub fn load_mappings(&self) -> Result<MappingTable> {
        MappingTable::load(self.dataset_path(&self.mapping_file))
    }

    pub fn load_map(&self) -> Result<MunicipalityMap> {
        MunicipalityMap::load(self.dataset_path(&self.municipality_map), &self.map_code_property)
    }

    /// An empty figure with the configured size, style and palette.
    pub fn figure(&self) -> Result<Figure> {
        Ok(Figure::new(self.charts.width, self.charts.height)
            .with_style(Style::from_name(&self.charts.style)?)
            .with_palette(self.palette()?))
    }

    pub fn palette(&self) -> Result<Palette> {
        Palette::from_name(&self.charts.palette)
    }
}
