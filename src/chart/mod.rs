//! Chart builders.
//!
//! All plotting state lives in an explicit [`Figure`]. Every draw function
//! takes the figure by value, appends what it draws and hands the figure
//! back, so nothing depends on a "current figure". Finished figures render
//! to SVG (`Figure::to_svg`) or export as JSON (`Figure::to_json`).
//!
//! ```no_run
//! # fn demo(data: &kuntadata::Dataset) -> kuntadata::Result<()> {
//! use kuntadata::chart::{draw_stacked_area, AreaOptions, Figure};
//!
//! let fig = draw_stacked_area(
//!     Figure::new(12.0, 6.0),
//!     data,
//!     "year",
//!     "region",
//!     "people",
//!     &AreaOptions { title: "Population".into(), ..Default::default() },
//! )?;
//! fig.save_svg("population.svg")?;
//! # Ok(())
//! # }
//! ```

mod area;
mod bar;
mod facet;
mod line;
pub mod style;
mod svg;

use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::logging::{self, Component};
use crate::model::Value;

pub use area::{draw_stacked_area, AreaOptions};
pub use bar::{draw_bar_chart, BarOptions};
pub use facet::{draw_facetgrid, FacetOptions};
pub use line::{draw_line_chart, LineOptions};
pub use style::{Color, Palette, Style};

pub const TITLE_FONT_SIZE: f64 = 16.0;
pub const LABEL_FONT_SIZE: f64 = 12.0;
pub const TICK_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

// ---------------------------------------------------------------------------
// Figure model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
    pub font_size: f64,
}

impl Text {
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }

    /// `None` for empty text, so blank titles and labels take no space.
    pub(crate) fn non_empty(text: &str, font_size: f64) -> Option<Text> {
        if text.is_empty() {
            None
        } else {
            Some(Text::new(text, font_size))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grid {
    Off,
    /// Horizontal and vertical lines.
    Both,
    /// Horizontal lines only, drawn behind the data.
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickAlign {
    Center,
    /// The end of the label sits under the tick, for rotated labels.
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub x: f64,
    /// `None` leaves a gap in lines.
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SeriesKind {
    Line,
    /// Filled between `baseline` and the series values, point by point.
    Area { baseline: Vec<f64> },
    /// Bars centred on each point's `x`.
    Bar { width: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub kind: SeriesKind,
    pub color: Color,
    pub alpha: f64,
    pub line_width: f64,
    pub points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LegendPlacement {
    /// Outside the axes, top edge aligned with the axes top.
    OutsideUpperLeft,
    /// Inside the axes, upper right corner.
    UpperRight,
    /// Right of all axes, vertically centred (figure-level legends).
    FigureRight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: Option<String>,
    pub entries: Vec<LegendEntry>,
    pub placement: LegendPlacement,
}

impl Legend {
    /// One entry per series, in series order.
    pub fn for_series(series: &[Series], title: &str, placement: LegendPlacement) -> Legend {
        Legend {
            title: if title.is_empty() { None } else { Some(title.to_string()) },
            entries: series
                .iter()
                .map(|s| LegendEntry {
                    label: s.label.clone(),
                    color: s.color,
                })
                .collect(),
            placement,
        }
    }

    pub fn reversed(mut self) -> Legend {
        self.entries.reverse();
        self
    }
}

/// One plotting area with its own axes, ticks and series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axes {
    pub title: Option<Text>,
    pub xlabel: Option<Text>,
    pub ylabel: Option<Text>,
    pub x_ticks: Vec<Tick>,
    pub tick_rotation: f64,
    pub tick_align: TickAlign,
    pub tick_font_size: f64,
    pub grid: Grid,
    pub series: Vec<Series>,
    pub legend: Option<Legend>,
    /// Fixed y limits; computed from the data when `None`.
    pub y_range: Option<(f64, f64)>,
}

impl Default for Axes {
    fn default() -> Self {
        Axes {
            title: None,
            xlabel: None,
            ylabel: None,
            x_ticks: Vec::new(),
            tick_rotation: 0.0,
            tick_align: TickAlign::Center,
            tick_font_size: TICK_FONT_SIZE,
            grid: Grid::Off,
            series: Vec::new(),
            legend: None,
            y_range: None,
        }
    }
}

impl Axes {
    /// Smallest and largest x over all series, widened by half a bar for bars.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        let mut extent: Option<(f64, f64)> = None;
        for s in &self.series {
            let half = match s.kind {
                SeriesKind::Bar { width } => width / 2.0,
                _ => 0.0,
            };
            for p in &s.points {
                let (lo, hi) = (p.x - half, p.x + half);
                extent = Some(match extent {
                    Some((a, b)) => (a.min(lo), b.max(hi)),
                    None => (lo, hi),
                });
            }
        }
        for t in &self.x_ticks {
            extent = Some(match extent {
                Some((a, b)) => (a.min(t.position), b.max(t.position)),
                None => (t.position, t.position),
            });
        }
        extent
    }

    /// Smallest and largest y over all series; bars and areas include zero.
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        if let Some(range) = self.y_range {
            return Some(range);
        }
        let mut extent: Option<(f64, f64)> = None;
        let mut grow = |v: f64| {
            if v.is_finite() {
                extent = Some(match extent {
                    Some((a, b)) => (a.min(v), b.max(v)),
                    None => (v, v),
                });
            }
        };
        for s in &self.series {
            match &s.kind {
                SeriesKind::Area { baseline } => baseline.iter().for_each(|b| grow(*b)),
                SeriesKind::Bar { .. } => grow(0.0),
                SeriesKind::Line => {}
            }
            s.points.iter().filter_map(|p| p.y).for_each(&mut grow);
        }
        extent
    }
}

/// A whole chart: size, style, optional suptitle and one or more axes laid
/// out left to right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    /// Inches; rendered at `PIXELS_PER_INCH`.
    pub width: f64,
    pub height: f64,
    pub style: Style,
    /// Series colours for area and line charts; the style's own cycle when `None`.
    #[serde(skip)]
    pub palette: Option<Palette>,
    pub suptitle: Option<Text>,
    pub axes: Vec<Axes>,
    /// Legend shared by all axes, drawn right of them.
    pub legend: Option<Legend>,
}

pub const PIXELS_PER_INCH: f64 = 100.0;

impl Default for Figure {
    fn default() -> Self {
        Figure::new(12.0, 6.0)
    }
}

impl Figure {
    pub fn new(width: f64, height: f64) -> Self {
        Figure {
            width,
            height,
            style: Style::default(),
            palette: None,
            suptitle: None,
            axes: Vec::new(),
            legend: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// The palette draw calls colour their series from.
    pub fn palette(&self) -> Palette {
        self.palette.clone().unwrap_or_else(|| self.style.palette())
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.suptitle = Text::non_empty(title, TITLE_FONT_SIZE);
        self
    }

    pub fn to_svg(&self) -> String {
        svg::render(self)
    }

    pub fn save_svg(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_svg()).map_err(|e| Error::io(path, e))?;
        logging::info(
            Component::Chart,
            Some(&path.display().to_string()),
            &format!("rendered {} axes", self.axes.len()),
        );
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers for the draw functions
// ---------------------------------------------------------------------------

/// One tick per key at positions 0, 1, 2, ...
pub(crate) fn category_ticks(keys: &[Value]) -> Vec<Tick> {
    keys.iter()
        .enumerate()
        .map(|(i, k)| Tick {
            position: i as f64,
            label: k.to_string(),
        })
        .collect()
}

pub(crate) fn empty_data_warning(kind: &str) {
    logging::warn(Component::Chart, None, &format!("{} chart has no data to draw", kind));
}
