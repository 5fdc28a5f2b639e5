use std::cmp::Ordering;

use super::{
    empty_data_warning, Axes, DataPoint, Figure, Legend, LegendEntry, LegendPlacement, Palette,
    Series, SeriesKind, Text, Tick, DEFAULT_FONT_SIZE, TITLE_FONT_SIZE,
};
use crate::error::{Error, Result};
use crate::model::{Dataset, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct FacetOptions {
    pub palette: String,
    /// Height of each facet, inches.
    pub height: f64,
    /// Facet width as a multiple of `height`.
    pub aspect: f64,
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub legend_title: Option<String>,
}

impl Default for FacetOptions {
    fn default() -> Self {
        FacetOptions {
            palette: "tab20c".to_string(),
            height: 5.0,
            aspect: 1.5,
            title: None,
            xlabel: None,
            ylabel: None,
            legend_title: None,
        }
    }
}

/// Distinct non-null values of one column. Numeric columns come out sorted,
/// everything else in order of first appearance.
fn levels(data: &Dataset, column: usize, numeric: bool) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for row in data.rows() {
        let v = &row[column];
        if v.is_null() || out.iter().any(|k| k.sort_cmp(v) == Ordering::Equal) {
            continue;
        }
        out.push(v.clone());
    }
    if numeric {
        out.sort_by(|a, b| a.sort_cmp(b));
    }
    out
}

fn level_of(levels: &[Value], v: &Value) -> Option<usize> {
    levels.iter().position(|k| k.sort_cmp(v) == Ordering::Equal)
}

/// Running mean of y for each x.
#[derive(Default)]
struct MeanLine {
    sums: Vec<(f64, f64, usize)>,
}

impl MeanLine {
    fn add(&mut self, x: f64, y: f64) {
        match self.sums.iter_mut().find(|(sx, _, _)| *sx == x) {
            Some(entry) => {
                entry.1 += y;
                entry.2 += 1;
            }
            None => self.sums.push((x, y, 1)),
        }
    }

    fn points(mut self) -> Vec<DataPoint> {
        self.sums.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.sums
            .into_iter()
            .map(|(x, sum, n)| DataPoint {
                x,
                y: Some(sum / n as f64),
            })
            .collect()
    }
}

/// A row of line plots, one per distinct `col` value.
///
/// Within each facet every `hue` level gets a line of the mean `y` per `x`.
/// All facets share the y range and one figure-level legend. The figure is
/// resized to `height * aspect` inches per facet.
pub fn draw_facetgrid(
    mut fig: Figure,
    data: &Dataset,
    col: &str,
    hue: &str,
    x: &str,
    y: &str,
    opts: &FacetOptions,
) -> Result<Figure> {
    let (ci, hi, xi, yi) = (
        data.require_column(col)?,
        data.require_column(hue)?,
        data.require_column(x)?,
        data.require_column(y)?,
    );
    let palette = Palette::from_name(&opts.palette)?;
    let numeric = |name: &str| data.dtype(name).is_some_and(|t| t.is_numeric());

    let facets = levels(data, ci, numeric(col));
    let hues = levels(data, hi, numeric(hue));
    let numeric_x = numeric(x);
    let x_levels = if numeric_x { Vec::new() } else { levels(data, xi, false) };

    let mut lines: Vec<Vec<MeanLine>> = facets
        .iter()
        .map(|_| hues.iter().map(|_| MeanLine::default()).collect())
        .collect();
    for row in data.rows() {
        let (Some(f), Some(h)) = (level_of(&facets, &row[ci]), level_of(&hues, &row[hi])) else {
            continue;
        };
        let xv = if numeric_x {
            row[xi].as_f64()
        } else {
            level_of(&x_levels, &row[xi]).map(|p| p as f64)
        };
        let yv = match &row[yi] {
            Value::Null => None,
            other => Some(other.as_f64().ok_or_else(|| Error::Chart {
                message: format!("column '{}' holds non-numeric value {:?}", y, other),
            })?),
        };
        if let (Some(xv), Some(yv)) = (xv, yv) {
            if !xv.is_nan() && !yv.is_nan() {
                lines[f][h].add(xv, yv);
            }
        }
    }

    let x_ticks: Vec<Tick> = x_levels
        .iter()
        .enumerate()
        .map(|(i, v)| Tick {
            position: i as f64,
            label: v.to_string(),
        })
        .collect();
    let xlabel = opts.xlabel.as_deref().unwrap_or(x);
    let ylabel = opts.ylabel.as_deref().unwrap_or(y);

    let mut axes: Vec<Axes> = Vec::with_capacity(facets.len().max(1));
    for (f, (level, hue_lines)) in facets.iter().zip(lines).enumerate() {
        let series = hue_lines
            .into_iter()
            .enumerate()
            .map(|(h, line)| Series {
                label: hues[h].to_string(),
                kind: SeriesKind::Line,
                color: palette.color(h, hues.len()),
                alpha: 1.0,
                line_width: 1.5,
                points: line.points(),
            })
            .collect();
        axes.push(Axes {
            title: Some(Text::new(format!("{} = {}", col, level), DEFAULT_FONT_SIZE)),
            xlabel: Text::non_empty(xlabel, DEFAULT_FONT_SIZE),
            ylabel: if f == 0 { Text::non_empty(ylabel, DEFAULT_FONT_SIZE) } else { None },
            x_ticks: x_ticks.clone(),
            series,
            ..Default::default()
        });
    }
    if axes.is_empty() {
        empty_data_warning("facet grid");
        axes.push(Axes {
            xlabel: Text::non_empty(xlabel, DEFAULT_FONT_SIZE),
            ylabel: Text::non_empty(ylabel, DEFAULT_FONT_SIZE),
            ..Default::default()
        });
    }

    let shared = axes
        .iter()
        .filter_map(|a| a.y_extent())
        .reduce(|(a, b), (c, d)| (a.min(c), b.max(d)));
    for a in &mut axes {
        a.y_range = shared;
    }

    let legend = Legend {
        title: Some(opts.legend_title.clone().unwrap_or_else(|| hue.to_string())),
        entries: hues
            .iter()
            .enumerate()
            .map(|(h, level)| LegendEntry {
                label: level.to_string(),
                color: palette.color(h, hues.len()),
            })
            .collect(),
        placement: LegendPlacement::FigureRight,
    };

    if let Some(title) = &opts.title {
        fig.suptitle = Text::non_empty(title, TITLE_FONT_SIZE);
    }
    fig.axes.extend(axes);
    // Every axes on the figure, including ones drawn earlier, gets a facet-sized slot.
    fig.width = opts.height * opts.aspect * fig.axes.len() as f64;
    fig.height = opts.height;
    fig.legend = Some(legend);
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ColumnType};

    fn prices() -> Dataset {
        let mut ds = Dataset::new(vec![
            Column::new("year", ColumnType::Int64),
            Column::new("rooms", ColumnType::Category),
            Column::new("quarter", ColumnType::Int64),
            Column::new("price", ColumnType::Float64),
        ])
        .unwrap();
        for (year, rooms, quarter, price) in [
            (2023, "one", 1, 3000.0),
            (2023, "one", 1, 3200.0),
            (2023, "two", 1, 2800.0),
            (2023, "one", 2, 3150.0),
            (2022, "one", 1, 3300.0),
            (2022, "two", 2, 2900.0),
        ] {
            ds.push_row(vec![Value::Int(year), rooms.into(), Value::Int(quarter), Value::Float(price)])
                .unwrap();
        }
        ds
    }

    #[test]
    fn test_one_axes_per_facet_sorted_numerically() {
        let fig = draw_facetgrid(Figure::default(), &prices(), "year", "rooms", "quarter", "price", &FacetOptions::default())
            .unwrap();
        assert_eq!(fig.axes.len(), 2, "one facet per distinct year");
        let titles: Vec<&str> = fig.axes.iter().map(|a| a.title.as_ref().unwrap().text.as_str()).collect();
        assert_eq!(titles, vec!["year = 2022", "year = 2023"]);
    }

    #[test]
    fn test_repeated_x_is_averaged() {
        let fig = draw_facetgrid(Figure::default(), &prices(), "year", "rooms", "quarter", "price", &FacetOptions::default())
            .unwrap();
        let one_2023 = &fig.axes[1].series[0];
        assert_eq!(one_2023.label, "one");
        assert_eq!(one_2023.points[0], DataPoint { x: 1.0, y: Some(3100.0) });
        assert_eq!(one_2023.points[1], DataPoint { x: 2.0, y: Some(3150.0) });
    }

    #[test]
    fn test_shared_y_range_and_figure_size() {
        let fig = draw_facetgrid(Figure::default(), &prices(), "year", "rooms", "quarter", "price", &FacetOptions::default())
            .unwrap();
        assert_eq!(fig.axes[0].y_range, Some((2800.0, 3300.0)));
        assert_eq!(fig.axes[0].y_range, fig.axes[1].y_range);
        assert_eq!(fig.width, 15.0);
        assert_eq!(fig.height, 5.0);
    }

    #[test]
    fn test_width_counts_axes_already_on_figure() {
        let mut fig = Figure::default();
        fig.axes.push(Axes::default());
        let fig = draw_facetgrid(fig, &prices(), "year", "rooms", "quarter", "price", &FacetOptions::default())
            .unwrap();
        assert_eq!(fig.axes.len(), 3);
        assert_eq!(fig.width, 5.0 * 1.5 * 3.0, "earlier axes keep a full slot");
    }

    #[test]
    fn test_labels_and_legend_default_to_column_names() {
        let fig = draw_facetgrid(Figure::default(), &prices(), "year", "rooms", "quarter", "price", &FacetOptions::default())
            .unwrap();
        assert_eq!(fig.axes[0].xlabel.as_ref().unwrap().text, "quarter");
        assert_eq!(fig.axes[0].ylabel.as_ref().unwrap().text, "price");
        assert!(fig.axes[1].ylabel.is_none(), "only the first facet carries the y label");

        let legend = fig.legend.as_ref().unwrap();
        assert_eq!(legend.title.as_deref(), Some("rooms"));
        assert_eq!(legend.placement, LegendPlacement::FigureRight);
        assert_eq!(legend.entries.len(), 2);
    }

    #[test]
    fn test_options_override_labels_and_title() {
        let opts = FacetOptions {
            title: Some("Prices per m²".into()),
            xlabel: Some("Quarter".into()),
            legend_title: Some("Rooms".into()),
            ..Default::default()
        };
        let fig = draw_facetgrid(Figure::default(), &prices(), "year", "rooms", "quarter", "price", &opts).unwrap();
        assert_eq!(fig.suptitle.as_ref().unwrap().text, "Prices per m²");
        assert_eq!(fig.axes[1].xlabel.as_ref().unwrap().text, "Quarter");
        assert_eq!(fig.legend.as_ref().unwrap().title.as_deref(), Some("Rooms"));
    }

    #[test]
    fn test_text_x_is_positional() {
        let mut ds = Dataset::new(vec![
            Column::new("region", ColumnType::Object),
            Column::new("sex", ColumnType::Object),
            Column::new("month", ColumnType::Object),
            Column::new("count", ColumnType::Int64),
        ])
        .unwrap();
        ds.push_row(vec!["Lappi".into(), "f".into(), "Jan".into(), Value::Int(3)]).unwrap();
        ds.push_row(vec!["Lappi".into(), "f".into(), "Feb".into(), Value::Int(5)]).unwrap();

        let fig = draw_facetgrid(Figure::default(), &ds, "region", "sex", "month", "count", &FacetOptions::default())
            .unwrap();
        let labels: Vec<&str> = fig.axes[0].x_ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb"], "text levels keep order of appearance");
        assert_eq!(fig.axes[0].series[0].points[1].x, 1.0);
    }

    #[test]
    fn test_unknown_column() {
        let err = draw_facetgrid(Figure::default(), &prices(), "decade", "rooms", "quarter", "price", &FacetOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { .. }));
    }

    #[test]
    fn test_empty_data_gives_one_empty_axes() {
        let empty = Dataset::new(prices().columns().to_vec()).unwrap();
        let fig = draw_facetgrid(Figure::default(), &empty, "year", "rooms", "quarter", "price", &FacetOptions::default())
            .unwrap();
        assert_eq!(fig.axes.len(), 1);
        assert!(fig.axes[0].series.is_empty());
        assert!(fig.to_svg().starts_with("<svg"));
    }
}
