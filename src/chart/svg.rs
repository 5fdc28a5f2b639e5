//! SVG rendering of a [`Figure`].
//!
//! Layout is deliberately simple: axes sit side by side in equal slots,
//! legends placed outside an axes take room from that slot, and a
//! figure-level legend takes a column on the right of the figure.

use super::{
    Axes, Color, DataPoint, Figure, Grid, Legend, LegendPlacement, Series, SeriesKind, Text,
    TickAlign, PIXELS_PER_INCH, TICK_FONT_SIZE,
};

const PAD: f64 = 12.0;
const SWATCH: f64 = 14.0;
/// Rough advance width of one glyph, as a fraction of the font size.
const GLYPH_WIDTH: f64 = 0.6;
const TARGET_TICKS: usize = 6;

fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_WIDTH
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tick placement
// ---------------------------------------------------------------------------

/// Evenly spaced "round" tick values covering `lo..=hi`, with the widened
/// limits they imply.
fn nice_ticks(lo: f64, hi: f64) -> (Vec<f64>, f64, f64) {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let (lo, hi) = if lo == hi {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.5 };
        (lo - pad, hi + pad)
    } else {
        (lo, hi)
    };
    let raw = (hi - lo) / TARGET_TICKS as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).floor() * step;
    let last = (hi / step).ceil() * step;
    let count = ((last - first) / step).round() as usize;
    let ticks = (0..=count).map(|i| first + i as f64 * step).collect();
    (ticks, first, last)
}

fn tick_decimals(ticks: &[f64]) -> usize {
    match ticks {
        [a, b, ..] => {
            let step = (b - a).abs();
            if step >= 1.0 || step == 0.0 {
                0
            } else {
                (-step.log10().floor()) as usize + 1
            }
        }
        _ => 0,
    }
}

fn format_tick(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Legends
// ---------------------------------------------------------------------------

fn legend_size(legend: &Legend) -> (f64, f64) {
    let font = TICK_FONT_SIZE;
    let widest = legend
        .entries
        .iter()
        .map(|e| text_width(&e.label, font) + SWATCH + 6.0)
        .chain(legend.title.iter().map(|t| text_width(t, font)))
        .fold(0.0, f64::max);
    let rows = legend.entries.len() + usize::from(legend.title.is_some());
    (widest + 2.0 * 8.0, rows as f64 * (font + 6.0) + 2.0 * 6.0)
}

fn render_legend(out: &mut String, legend: &Legend, x: f64, y: f64, fg: Color, bg: Color) {
    let font = TICK_FONT_SIZE;
    let (w, h) = legend_size(legend);
    out.push_str(&format!(
        "<g class=\"legend\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" fill-opacity=\"0.8\" stroke=\"#cccccc\"/>\n",
        x, y, w, h, bg
    ));
    let mut row_y = y + 6.0;
    if let Some(title) = &legend.title {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" fill=\"{}\">{}</text>\n",
            x + 8.0,
            row_y + font,
            font,
            fg,
            escape(title)
        ));
        row_y += font + 6.0;
    }
    for entry in &legend.entries {
        out.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{}\" height=\"{:.2}\" fill=\"{}\"/>\n",
            x + 8.0,
            row_y + 1.0,
            SWATCH,
            font - 2.0,
            entry.color
        ));
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" fill=\"{}\">{}</text>\n",
            x + 8.0 + SWATCH + 6.0,
            row_y + font,
            font,
            fg,
            escape(&entry.label)
        ));
        row_y += font + 6.0;
    }
    out.push_str("</g>\n");
}

// ---------------------------------------------------------------------------
// Axes
// ---------------------------------------------------------------------------

/// Pixel rectangle of a plotting area.
struct Frame {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

struct Scale {
    lo: f64,
    hi: f64,
    from: f64,
    to: f64,
}

impl Scale {
    fn map(&self, v: f64) -> f64 {
        self.from + (v - self.lo) / (self.hi - self.lo) * (self.to - self.from)
    }
}

fn text_height(text: &Option<Text>) -> f64 {
    text.as_ref().map_or(0.0, |t| t.font_size + 8.0)
}

/// Vertical room taken by the x tick labels.
fn tick_label_height(axes: &Axes) -> f64 {
    let longest = axes
        .x_ticks
        .iter()
        .map(|t| text_width(&t.label, axes.tick_font_size))
        .fold(0.0, f64::max);
    let angle = axes.tick_rotation.to_radians();
    longest * angle.sin().abs() + axes.tick_font_size * angle.cos().abs() + 8.0
}

fn render_axes(out: &mut String, axes: &Axes, slot_x: f64, slot_w: f64, top: f64, bottom: f64, fig: &Figure) {
    let style = &fig.style;
    let outside_legend = axes
        .legend
        .as_ref()
        .filter(|l| l.placement == LegendPlacement::OutsideUpperLeft)
        .map_or(0.0, |l| legend_size(l).0 + PAD);

    let left = PAD + 48.0 + text_height(&axes.ylabel);
    let frame = Frame {
        x: slot_x + left,
        y: top + text_height(&axes.title),
        w: (slot_w - left - PAD - outside_legend).max(1.0),
        h: (bottom - top - text_height(&axes.title) - tick_label_height(axes) - text_height(&axes.xlabel))
            .max(1.0),
    };

    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>\n",
        frame.x, frame.y, frame.w, frame.h, style.axes_background
    ));

    let (x_lo, x_hi) = match axes.x_extent() {
        Some((a, b)) if a < b => {
            let pad = (b - a) * 0.05;
            (a - pad, b + pad)
        }
        Some((a, _)) => (a - 0.5, a + 0.5),
        None => (0.0, 1.0),
    };
    let (y_ticks, y_lo, y_hi) = match axes.y_extent() {
        Some((a, b)) => nice_ticks(a, b),
        None => nice_ticks(0.0, 1.0),
    };
    let xs = Scale {
        lo: x_lo,
        hi: x_hi,
        from: frame.x,
        to: frame.x + frame.w,
    };
    let ys = Scale {
        lo: y_lo,
        hi: y_hi,
        from: frame.y + frame.h,
        to: frame.y,
    };

    let x_ticks: Vec<(f64, String)> = if axes.x_ticks.is_empty() && !axes.series.is_empty() {
        let (ticks, _, _) = nice_ticks(x_lo, x_hi);
        let decimals = tick_decimals(&ticks);
        ticks
            .into_iter()
            .filter(|t| *t >= x_lo && *t <= x_hi)
            .map(|t| (t, format_tick(t, decimals)))
            .collect()
    } else {
        axes.x_ticks.iter().map(|t| (t.position, t.label.clone())).collect()
    };

    // grid lines go under the data
    if axes.grid != Grid::Off {
        for v in &y_ticks {
            let py = ys.map(*v);
            out.push_str(&format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"0.8\"/>\n",
                frame.x,
                py,
                frame.x + frame.w,
                py,
                style.grid
            ));
        }
    }
    if axes.grid == Grid::Both {
        for (pos, _) in &x_ticks {
            let px = xs.map(*pos);
            out.push_str(&format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"0.8\"/>\n",
                px,
                frame.y,
                px,
                frame.y + frame.h,
                style.grid
            ));
        }
    }

    for series in &axes.series {
        render_series(out, series, &xs, &ys);
    }

    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"0.8\"/>\n",
        frame.x, frame.y, frame.w, frame.h, style.foreground
    ));

    // y ticks
    let decimals = tick_decimals(&y_ticks);
    for v in &y_ticks {
        let py = ys.map(*v);
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" text-anchor=\"end\" fill=\"{}\">{}</text>\n",
            frame.x - 6.0,
            py + axes.tick_font_size / 3.0,
            axes.tick_font_size,
            style.foreground,
            format_tick(*v, decimals)
        ));
    }

    // x ticks
    let label_y = frame.y + frame.h + axes.tick_font_size + 4.0;
    for (pos, label) in &x_ticks {
        let px = xs.map(*pos);
        if axes.tick_rotation == 0.0 {
            out.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" text-anchor=\"middle\" fill=\"{}\">{}</text>\n",
                px,
                label_y,
                axes.tick_font_size,
                style.foreground,
                escape(label)
            ));
        } else {
            let anchor = match axes.tick_align {
                TickAlign::Center => "middle",
                TickAlign::Right => "end",
            };
            out.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" text-anchor=\"{}\" fill=\"{}\" transform=\"rotate({:.1} {:.2} {:.2})\">{}</text>\n",
                px,
                label_y,
                axes.tick_font_size,
                anchor,
                style.foreground,
                -axes.tick_rotation,
                px,
                label_y,
                escape(label)
            ));
        }
    }

    if let Some(title) = &axes.title {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" text-anchor=\"middle\" fill=\"{}\">{}</text>\n",
            frame.x + frame.w / 2.0,
            frame.y - 8.0,
            title.font_size,
            style.foreground,
            escape(&title.text)
        ));
    }
    if let Some(xlabel) = &axes.xlabel {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" text-anchor=\"middle\" fill=\"{}\">{}</text>\n",
            frame.x + frame.w / 2.0,
            frame.y + frame.h + tick_label_height(axes) + xlabel.font_size,
            xlabel.font_size,
            style.foreground,
            escape(&xlabel.text)
        ));
    }
    if let Some(ylabel) = &axes.ylabel {
        let (lx, ly) = (slot_x + PAD + ylabel.font_size, frame.y + frame.h / 2.0);
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" text-anchor=\"middle\" fill=\"{}\" transform=\"rotate(-90 {:.2} {:.2})\">{}</text>\n",
            lx,
            ly,
            ylabel.font_size,
            style.foreground,
            lx,
            ly,
            escape(&ylabel.text)
        ));
    }

    if let Some(legend) = &axes.legend {
        let (w, _) = legend_size(legend);
        let (lx, ly) = match legend.placement {
            LegendPlacement::OutsideUpperLeft => (frame.x + frame.w + PAD, frame.y),
            _ => (frame.x + frame.w - w - 8.0, frame.y + 8.0),
        };
        render_legend(out, legend, lx, ly, style.foreground, style.axes_background);
    }
}

/// Runs of consecutive points with a value; `None` splits a line.
fn segments(points: &[DataPoint]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for p in points {
        match p.y {
            Some(y) if y.is_finite() => current.push((p.x, y)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn render_series(out: &mut String, series: &Series, xs: &Scale, ys: &Scale) {
    let coords = |pts: &[(f64, f64)]| {
        pts.iter()
            .map(|(x, y)| format!("{:.2},{:.2}", xs.map(*x), ys.map(*y)))
            .collect::<Vec<_>>()
            .join(" ")
    };
    match &series.kind {
        SeriesKind::Line => {
            for seg in segments(&series.points) {
                out.push_str(&format!(
                    "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\"/>\n",
                    coords(&seg),
                    series.color,
                    series.line_width,
                    series.alpha
                ));
            }
        }
        SeriesKind::Area { baseline } => {
            let top: Vec<(f64, f64)> = series
                .points
                .iter()
                .map(|p| (p.x, p.y.unwrap_or(0.0)))
                .collect();
            if top.is_empty() {
                return;
            }
            let bottom: Vec<(f64, f64)> = series
                .points
                .iter()
                .zip(baseline)
                .rev()
                .map(|(p, b)| (p.x, *b))
                .collect();
            out.push_str(&format!(
                "<polygon points=\"{} {}\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
                coords(&top),
                coords(&bottom),
                series.color,
                series.alpha,
                series.color,
                series.line_width
            ));
        }
        SeriesKind::Bar { width } => {
            let zero = ys.map(0.0_f64.max(ys.lo).min(ys.hi));
            for p in &series.points {
                let Some(y) = p.y.filter(|y| y.is_finite()) else {
                    continue;
                };
                let left = xs.map(p.x - width / 2.0);
                let right = xs.map(p.x + width / 2.0);
                let top = ys.map(y);
                out.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" fill-opacity=\"{}\"/>\n",
                    left,
                    top.min(zero),
                    right - left,
                    (zero - top).abs(),
                    series.color,
                    series.alpha
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

pub(crate) fn render(fig: &Figure) -> String {
    let width = fig.width * PIXELS_PER_INCH;
    let height = fig.height * PIXELS_PER_INCH;
    let style = &fig.style;

    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.2} {:.2}\" font-family=\"DejaVu Sans, Arial, sans-serif\">\n",
        width, height, width, height
    );
    out.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
        style.background
    ));

    let mut top = PAD;
    if let Some(title) = &fig.suptitle {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" text-anchor=\"middle\" fill=\"{}\">{}</text>\n",
            width / 2.0,
            top + title.font_size,
            title.font_size,
            style.foreground,
            escape(&title.text)
        ));
        top += title.font_size + PAD;
    }

    let legend_column = fig.legend.as_ref().map_or(0.0, |l| legend_size(l).0 + 2.0 * PAD);
    if !fig.axes.is_empty() {
        let slot_w = (width - legend_column) / fig.axes.len() as f64;
        for (i, axes) in fig.axes.iter().enumerate() {
            render_axes(&mut out, axes, i as f64 * slot_w, slot_w, top, height - PAD, fig);
        }
    }

    if let Some(legend) = &fig.legend {
        let (_, h) = legend_size(legend);
        render_legend(
            &mut out,
            legend,
            width - legend_column + PAD,
            ((height - h) / 2.0).max(top),
            style.foreground,
            style.background,
        );
    }

    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{LegendEntry, Tick};

    fn series(kind: SeriesKind, ys: &[Option<f64>]) -> Series {
        Series {
            label: "s".into(),
            kind,
            color: Color::rgb(31, 119, 180),
            alpha: 1.0,
            line_width: 1.0,
            points: ys
                .iter()
                .enumerate()
                .map(|(i, y)| DataPoint { x: i as f64, y: *y })
                .collect(),
        }
    }

    #[test]
    fn test_nice_ticks_cover_range() {
        let (ticks, lo, hi) = nice_ticks(3.0, 97.0);
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 100.0);
        assert!(ticks.len() >= 4 && ticks.len() <= 12, "got {:?}", ticks);

        let (_, lo, hi) = nice_ticks(5.0, 5.0);
        assert!(lo < 5.0 && hi > 5.0, "flat data still gets a range");
    }

    #[test]
    fn test_tick_labels_trim_zeros() {
        assert_eq!(format_tick(2.50, 2), "2.5");
        assert_eq!(format_tick(1000.0, 0), "1000");
        assert_eq!(tick_decimals(&[0.0, 0.25, 0.5]), 2);
        assert_eq!(tick_decimals(&[0.0, 20.0]), 0);
    }

    #[test]
    fn test_titles_and_labels_escaped() {
        let mut fig = Figure::default().with_title("Births & deaths");
        fig.axes.push(Axes {
            title: Some(Text::new("Uusimaa <2024>", 16.0)),
            xlabel: Some(Text::new("Year", 12.0)),
            ylabel: Some(Text::new("People", 12.0)),
            series: vec![series(SeriesKind::Line, &[Some(1.0), Some(2.0)])],
            ..Default::default()
        });
        let svg = fig.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Births &amp; deaths"));
        assert!(svg.contains("Uusimaa &lt;2024&gt;"));
        assert!(svg.contains(">Year<") && svg.contains(">People<"));
    }

    #[test]
    fn test_gaps_split_lines() {
        let mut fig = Figure::default();
        fig.axes.push(Axes {
            series: vec![series(SeriesKind::Line, &[Some(1.0), Some(2.0), None, Some(3.0), Some(1.0)])],
            ..Default::default()
        });
        assert_eq!(fig.to_svg().matches("<polyline").count(), 2);
    }

    #[test]
    fn test_bars_areas_and_rotated_ticks() {
        let mut fig = Figure::default();
        fig.axes.push(Axes {
            x_ticks: vec![
                Tick { position: 0.0, label: "Helsinki".into() },
                Tick { position: 1.0, label: "Espoo".into() },
            ],
            tick_rotation: 45.0,
            tick_align: TickAlign::Right,
            series: vec![
                series(SeriesKind::Bar { width: 0.8 }, &[Some(5.0), None]),
                series(SeriesKind::Area { baseline: vec![0.0, 0.0] }, &[Some(1.0), Some(2.0)]),
            ],
            ..Default::default()
        });
        let svg = fig.to_svg();
        assert_eq!(svg.matches("fill=\"#1f77b4\" fill-opacity").count(), 2, "one bar plus one area");
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("rotate(-45.0"));
        assert!(svg.contains("text-anchor=\"end\""));
    }

    #[test]
    fn test_figure_legend_rendered() {
        let mut fig = Figure::default();
        fig.axes.push(Axes::default());
        fig.legend = Some(Legend {
            title: Some("Region".into()),
            entries: vec![LegendEntry {
                label: "Lappi".into(),
                color: Color::rgb(0, 0, 0),
            }],
            placement: LegendPlacement::FigureRight,
        });
        let svg = fig.to_svg();
        assert!(svg.contains(">Region<"));
        assert!(svg.contains(">Lappi<"));
    }
}
