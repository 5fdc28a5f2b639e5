use super::{
    category_ticks, empty_data_warning, Axes, DataPoint, Figure, Grid, Legend, LegendPlacement,
    Palette, Series, SeriesKind, Text, TickAlign, Tick, DEFAULT_FONT_SIZE, LABEL_FONT_SIZE,
    TITLE_FONT_SIZE,
};
use crate::error::{Error, Result};
use crate::model::{Dataset, Value};

/// Total width of one group of bars when `hue` splits it.
const GROUP_WIDTH: f64 = 0.5;
/// Width of a lone bar.
const BAR_WIDTH: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct BarOptions {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub legend_title: String,
    /// A colour for plain bars, or a palette name when `hue` is given.
    pub color: String,
}

impl Default for BarOptions {
    fn default() -> Self {
        BarOptions {
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            legend_title: String::new(),
            color: "skyblue".to_string(),
        }
    }
}

/// Bar chart of `values` per `index` value.
///
/// Without `hue` every row becomes one bar, in data order. With `hue` the
/// data is pivoted and each `hue` level gets its own bar within each group.
pub fn draw_bar_chart(
    mut fig: Figure,
    data: &Dataset,
    index: &str,
    values: &str,
    hue: Option<&str>,
    opts: &BarOptions,
) -> Result<Figure> {
    let palette = Palette::from_name(&opts.color)?;
    let axes = match hue {
        Some(hue) => grouped_bars(data, index, values, hue, &palette, opts)?,
        None => plain_bars(data, index, values, &palette, opts)?,
    };
    fig.axes.push(axes);
    Ok(fig)
}

fn grouped_bars(
    data: &Dataset,
    index: &str,
    values: &str,
    hue: &str,
    palette: &Palette,
    opts: &BarOptions,
) -> Result<Axes> {
    let table = data.pivot(index, hue, values)?;
    if table.index.is_empty() {
        empty_data_warning("bar");
    }

    let groups = table.columns.len().max(1);
    let width = GROUP_WIDTH / groups as f64;
    let series: Vec<Series> = table
        .columns
        .iter()
        .enumerate()
        .map(|(c, key)| {
            let offset = -GROUP_WIDTH / 2.0 + width * (c as f64 + 0.5);
            Series {
                label: key.to_string(),
                kind: SeriesKind::Bar { width },
                color: palette.color(c, table.columns.len()),
                alpha: 1.0,
                line_width: 0.0,
                points: table
                    .column_values(c)
                    .into_iter()
                    .enumerate()
                    .map(|(i, y)| DataPoint {
                        x: i as f64 + offset,
                        y,
                    })
                    .collect(),
            }
        })
        .collect();

    let legend = Legend::for_series(&series, &opts.legend_title, LegendPlacement::UpperRight);
    Ok(Axes {
        title: Text::non_empty(&opts.title, DEFAULT_FONT_SIZE),
        xlabel: Text::non_empty(&opts.xlabel, DEFAULT_FONT_SIZE),
        ylabel: Text::non_empty(&opts.ylabel, DEFAULT_FONT_SIZE),
        x_ticks: category_ticks(&table.index),
        tick_rotation: 45.0,
        tick_align: TickAlign::Right,
        grid: Grid::Y,
        series,
        legend: Some(legend),
        ..Default::default()
    })
}

fn plain_bars(
    data: &Dataset,
    index: &str,
    values: &str,
    palette: &Palette,
    opts: &BarOptions,
) -> Result<Axes> {
    let labels = data.column(index)?;
    let heights = data.column(values)?;
    if data.is_empty() {
        empty_data_warning("bar");
    }

    let mut points = Vec::with_capacity(heights.len());
    for (i, h) in heights.iter().enumerate() {
        let y = match h {
            Value::Null => None,
            other => Some(other.as_f64().ok_or_else(|| Error::Chart {
                message: format!("bar height {:?} in column '{}' is not numeric", other, values),
            })?),
        };
        points.push(DataPoint { x: i as f64, y });
    }

    Ok(Axes {
        title: Text::non_empty(&opts.title, TITLE_FONT_SIZE),
        xlabel: Text::non_empty(&opts.xlabel, LABEL_FONT_SIZE),
        ylabel: Text::non_empty(&opts.ylabel, LABEL_FONT_SIZE),
        x_ticks: labels
            .iter()
            .enumerate()
            .map(|(i, v)| Tick {
                position: i as f64,
                label: v.to_string(),
            })
            .collect(),
        tick_rotation: 45.0,
        tick_align: TickAlign::Right,
        grid: Grid::Y,
        series: vec![Series {
            label: values.to_string(),
            kind: SeriesKind::Bar { width: BAR_WIDTH },
            color: palette.color(0, 1),
            alpha: 1.0,
            line_width: 0.0,
            points,
        }],
        legend: None,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Color;
    use crate::model::{Column, ColumnType};

    fn births() -> Dataset {
        let mut ds = Dataset::new(vec![
            Column::new("region", ColumnType::Object),
            Column::new("sex", ColumnType::Category),
            Column::new("births", ColumnType::Int64),
        ])
        .unwrap();
        for (region, sex, births) in [
            ("Uusimaa", "female", 8000),
            ("Uusimaa", "male", 8400),
            ("Lappi", "female", 700),
            ("Lappi", "male", 760),
        ] {
            ds.push_row(vec![region.into(), sex.into(), Value::Int(births)]).unwrap();
        }
        ds
    }

    #[test]
    fn test_plain_bars_keep_data_order_and_colour() {
        let fig = draw_bar_chart(Figure::default(), &births(), "region", "births", None, &BarOptions::default())
            .unwrap();
        let axes = &fig.axes[0];
        assert_eq!(axes.series.len(), 1);
        assert_eq!(axes.series[0].color, Color::rgb(0x87, 0xce, 0xeb));
        assert_eq!(axes.x_ticks[0].label, "Uusimaa");
        assert_eq!(axes.x_ticks[2].label, "Lappi");
        assert_eq!(axes.series[0].points[1].y, Some(8400.0));
        assert!(axes.legend.is_none());
        assert_eq!(axes.grid, Grid::Y);
        assert_eq!(axes.tick_align, TickAlign::Right);
    }

    #[test]
    fn test_hue_groups_bars_side_by_side() {
        let opts = BarOptions {
            color: "Set2".into(),
            legend_title: "Sex".into(),
            ..Default::default()
        };
        let fig = draw_bar_chart(Figure::default(), &births(), "region", "births", Some("sex"), &opts).unwrap();
        let axes = &fig.axes[0];
        assert_eq!(axes.series.len(), 2);
        let (female, male) = (&axes.series[0], &axes.series[1]);
        assert!(female.points[0].x < male.points[0].x, "hue levels sit side by side");
        assert_eq!(female.kind, SeriesKind::Bar { width: 0.25 });
        assert_ne!(female.color, male.color);

        let legend = axes.legend.as_ref().unwrap();
        assert_eq!(legend.title.as_deref(), Some("Sex"));
        assert_eq!(legend.entries[0].label, "female", "grouped legend keeps level order");
    }

    #[test]
    fn test_unknown_colour_rejected() {
        let opts = BarOptions {
            color: "ultraviolet".into(),
            ..Default::default()
        };
        let err = draw_bar_chart(Figure::default(), &births(), "region", "births", None, &opts).unwrap_err();
        assert!(matches!(err, Error::Chart { .. }));
    }

    #[test]
    fn test_text_heights_rejected() {
        let err = draw_bar_chart(Figure::default(), &births(), "births", "region", None, &BarOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Chart { .. }));
    }
}
