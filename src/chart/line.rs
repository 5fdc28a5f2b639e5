use super::{
    category_ticks, empty_data_warning, Axes, DataPoint, Figure, Legend, LegendPlacement, Series,
    SeriesKind, Text, DEFAULT_FONT_SIZE,
};
use crate::error::Result;
use crate::model::Dataset;

#[derive(Debug, Clone, PartialEq)]
pub struct LineOptions {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub legend_title: String,
    /// Keep only every n-th x tick.
    pub tick_frequency: Option<usize>,
    /// Degrees, counter-clockwise.
    pub label_rotation: f64,
}

impl Default for LineOptions {
    fn default() -> Self {
        LineOptions {
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            legend_title: String::new(),
            tick_frequency: None,
            label_rotation: 45.0,
        }
    }
}

/// One line per distinct `columns` value, plotting `values` against `index`.
///
/// The data must hold at most one row per (`index`, `columns`) pair; missing
/// pairs leave gaps in the line.
pub fn draw_line_chart(
    mut fig: Figure,
    data: &Dataset,
    index: &str,
    columns: &str,
    values: &str,
    opts: &LineOptions,
) -> Result<Figure> {
    let table = data.pivot(index, columns, values)?;
    if table.index.is_empty() {
        empty_data_warning("line");
    }

    let palette = fig.palette();
    let series: Vec<Series> = table
        .columns
        .iter()
        .enumerate()
        .map(|(c, key)| Series {
            label: key.to_string(),
            kind: SeriesKind::Line,
            color: palette.color(c, table.columns.len()),
            alpha: 1.0,
            line_width: 1.0,
            points: table
                .column_values(c)
                .into_iter()
                .enumerate()
                .map(|(i, y)| DataPoint { x: i as f64, y })
                .collect(),
        })
        .collect();

    let mut ticks = category_ticks(&table.index);
    if let Some(every) = opts.tick_frequency.filter(|n| *n > 1) {
        ticks = ticks.into_iter().step_by(every).collect();
    }

    let legend = Legend::for_series(&series, &opts.legend_title, LegendPlacement::OutsideUpperLeft)
        .reversed();
    fig.axes.push(Axes {
        title: Text::non_empty(&opts.title, DEFAULT_FONT_SIZE),
        xlabel: Text::non_empty(&opts.xlabel, DEFAULT_FONT_SIZE),
        ylabel: Text::non_empty(&opts.ylabel, DEFAULT_FONT_SIZE),
        x_ticks: ticks,
        tick_rotation: opts.label_rotation,
        series,
        legend: Some(legend),
        ..Default::default()
    });
    Ok(fig)
}
