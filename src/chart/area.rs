use super::{
    category_ticks, empty_data_warning, Axes, DataPoint, Figure, Grid, Legend, LegendPlacement,
    Series, SeriesKind, Text, LABEL_FONT_SIZE, TITLE_FONT_SIZE,
};
use crate::error::Result;
use crate::model::Dataset;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaOptions {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub legend_title: String,
}

/// Stacked area chart of `values` summed per (`index`, `columns`) pair.
///
/// Each distinct `columns` value becomes one band, stacked in sorted key
/// order; missing combinations count as zero. The legend lists the bands
/// top-down, i.e. in reverse stacking order, outside the axes.
pub fn draw_stacked_area(
    mut fig: Figure,
    data: &Dataset,
    index: &str,
    columns: &str,
    values: &str,
    opts: &AreaOptions,
) -> Result<Figure> {
    let table = data.pivot_table(index, columns, values)?;
    if table.index.is_empty() {
        empty_data_warning("stacked area");
    }

    let palette = fig.palette();
    let mut baseline = vec![0.0; table.index.len()];
    let mut series = Vec::with_capacity(table.columns.len());
    for (c, key) in table.columns.iter().enumerate() {
        let tops: Vec<f64> = table
            .column_values(c)
            .iter()
            .zip(&baseline)
            .map(|(v, base)| base + v.unwrap_or(0.0))
            .collect();
        series.push(Series {
            label: key.to_string(),
            kind: SeriesKind::Area {
                baseline: baseline.clone(),
            },
            color: palette.color(c, table.columns.len()),
            alpha: 0.6,
            line_width: 1.0,
            points: tops
                .iter()
                .enumerate()
                .map(|(i, y)| DataPoint {
                    x: i as f64,
                    y: Some(*y),
                })
                .collect(),
        });
        baseline = tops;
    }

    let legend = Legend::for_series(&series, &opts.legend_title, LegendPlacement::OutsideUpperLeft)
        .reversed();
    fig.axes.push(Axes {
        title: Text::non_empty(&opts.title, TITLE_FONT_SIZE),
        xlabel: Text::non_empty(&opts.xlabel, LABEL_FONT_SIZE),
        ylabel: Text::non_empty(&opts.ylabel, LABEL_FONT_SIZE),
        x_ticks: category_ticks(&table.index),
        tick_rotation: 45.0,
        grid: Grid::Both,
        series,
        legend: Some(legend),
        ..Default::default()
    });
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ColumnType, Value};

    fn jobs() -> Dataset {
        let mut ds = Dataset::new(vec![
            Column::new("year", ColumnType::Int64),
            Column::new("sector", ColumnType::Object),
            Column::new("jobs", ColumnType::Float64),
        ])
        .unwrap();
        for (year, sector, jobs) in [
            (2020, "industry", 2.0),
            (2020, "services", 5.0),
            (2021, "industry", 3.0),
            (2021, "services", 4.0),
            (2021, "services", 1.0),
        ] {
            ds.push_row(vec![Value::Int(year), sector.into(), Value::Float(jobs)]).unwrap();
        }
        ds
    }

    #[test]
    fn test_bands_stack_on_previous_band() {
        let fig = draw_stacked_area(Figure::default(), &jobs(), "year", "sector", "jobs", &AreaOptions::default())
            .unwrap();
        let axes = &fig.axes[0];
        assert_eq!(axes.series.len(), 2);

        let services = &axes.series[1];
        assert_eq!(services.label, "services");
        assert_eq!(services.kind, SeriesKind::Area { baseline: vec![2.0, 3.0] });
        let tops: Vec<Option<f64>> = services.points.iter().map(|p| p.y).collect();
        assert_eq!(tops, vec![Some(7.0), Some(8.0)], "2021 services summed to 5 on top of 3");
    }

    #[test]
    fn test_legend_is_reversed_and_titled() {
        let opts = AreaOptions {
            legend_title: "Sector".into(),
            ..Default::default()
        };
        let fig = draw_stacked_area(Figure::default(), &jobs(), "year", "sector", "jobs", &opts).unwrap();
        let legend = fig.axes[0].legend.as_ref().unwrap();
        assert_eq!(legend.title.as_deref(), Some("Sector"));
        assert_eq!(legend.entries[0].label, "services");
        assert_eq!(legend.entries[1].label, "industry");
        assert_eq!(legend.placement, LegendPlacement::OutsideUpperLeft);
    }

    #[test]
    fn test_ticks_follow_sorted_index() {
        let fig = draw_stacked_area(Figure::default(), &jobs(), "year", "sector", "jobs", &AreaOptions::default())
            .unwrap();
        let labels: Vec<&str> = fig.axes[0].x_ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["2020", "2021"]);
        assert_eq!(fig.axes[0].tick_rotation, 45.0);
    }
}
