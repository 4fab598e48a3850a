use crate::models::ViewRow;
use crate::ui::escape_html;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

const X_TITLE: &str = "Date";
const Y_TITLE: &str = "Count";
const LEGEND_TITLE: &str = "Operation Type";
const CHART_HEIGHT: u32 = 600;

const WIDTH: f64 = 1100.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 200.0;
const MARGIN_TOP: f64 = 64.0;
const MARGIN_BOTTOM: f64 = 64.0;
const SEGMENT_FONT: u32 = 10;
const TOTAL_FONT: u32 = 12;
const MAX_X_LABELS: i64 = 14;

const COLORS: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub legend_title: String,
    pub height: u32,
    pub series: Vec<Series>,
    pub totals: Vec<DatePoint>,
}

/// One stacked layer: a category and its count on each date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub category: String,
    pub color: String,
    pub points: Vec<DatePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatePoint {
    pub date: NaiveDate,
    pub value: i64,
}

pub fn chart_title(start: NaiveDate, end: NaiveDate) -> String {
    format!("Stacked Daily Operations（{start} — {end}）")
}

pub fn color_for(index: usize) -> &'static str {
    COLORS[index % COLORS.len()]
}

/// One series per value column, taken from `row.values` by position so that
/// repeated headers stay separate. Rows sharing a date stack onto the same bar.
pub fn build_chart(
    rows: &[ViewRow],
    value_columns: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> ChartSpec {
    let series = value_columns
        .iter()
        .enumerate()
        .map(|(idx, category)| {
            let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
            for row in rows {
                let count = row.values.get(idx).copied().flatten().unwrap_or(0);
                let entry = per_day.entry(row.date).or_default();
                *entry = entry.saturating_add(count);
            }
            Series {
                category: category.clone(),
                color: color_for(idx).to_string(),
                points: to_points(per_day),
            }
        })
        .collect();

    let mut totals: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for row in rows {
        let entry = totals.entry(row.date).or_default();
        *entry = entry.saturating_add(row.total);
    }

    ChartSpec {
        title: chart_title(start, end),
        x_title: X_TITLE.to_string(),
        y_title: Y_TITLE.to_string(),
        legend_title: LEGEND_TITLE.to_string(),
        height: CHART_HEIGHT,
        series,
        totals: to_points(totals),
    }
}

fn to_points(map: BTreeMap<NaiveDate, i64>) -> Vec<DatePoint> {
    map.into_iter()
        .map(|(date, value)| DatePoint { date, value })
        .collect()
}

struct Segment<'a> {
    series: &'a Series,
    date: NaiveDate,
    value: i64,
    from: i64,
    to: i64,
}

pub fn render_svg(spec: &ChartSpec) -> String {
    let height = f64::from(spec.height);
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = height - MARGIN_TOP - MARGIN_BOTTOM;

    let mut svg = format!(
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {height}" width="100%" preserveAspectRatio="xMidYMid meet" role="img" aria-label="{title}" xmlns="http://www.w3.org/2000/svg">"#,
        title = escape_html(&spec.title)
    );
    svg.push_str(&format!(
        r#"<text class="chart-title" x="{MARGIN_LEFT}" y="32">{}</text>"#,
        escape_html(&spec.title)
    ));

    let (Some(first), Some(last)) = (spec.totals.first(), spec.totals.last()) else {
        svg.push_str(&format!(
            r#"<text class="chart-label" x="{}" y="{}" text-anchor="middle">No data</text></svg>"#,
            MARGIN_LEFT + plot_w / 2.0,
            MARGIN_TOP + plot_h / 2.0
        ));
        return svg;
    };
    let first_day = first.date;
    let days = (last.date - first_day).num_days() + 1;
    let band = plot_w / days as f64;
    let bar_w = band * 0.8;

    // Stack positives upward and negatives downward from zero, per date.
    let mut tops: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    let mut segments = Vec::new();
    for series in &spec.series {
        for point in &series.points {
            if point.value == 0 {
                continue;
            }
            let (pos, neg) = tops.entry(point.date).or_insert((0, 0));
            let base = if point.value > 0 { pos } else { neg };
            let from = *base;
            *base = base.saturating_add(point.value);
            segments.push(Segment {
                series,
                date: point.date,
                value: point.value,
                from,
                to: *base,
            });
        }
    }

    let y_max = tops.values().map(|(pos, _)| *pos).max().unwrap_or(0);
    let y_min = tops.values().map(|(_, neg)| *neg).min().unwrap_or(0);
    let (axis_min, axis_max, step) = y_axis(y_min, y_max);
    let y = |value: f64| MARGIN_TOP + (axis_max - value) / (axis_max - axis_min) * plot_h;
    let x_center = |date: NaiveDate| {
        MARGIN_LEFT + ((date - first_day).num_days() as f64 + 0.5) * band
    };

    let mut tick = axis_min;
    while tick <= axis_max + step / 2.0 {
        let pos = y(tick);
        svg.push_str(&format!(
            r#"<line class="chart-grid" x1="{MARGIN_LEFT}" y1="{pos:.1}" x2="{:.1}" y2="{pos:.1}" />"#,
            MARGIN_LEFT + plot_w
        ));
        svg.push_str(&format!(
            r#"<text class="chart-label" x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            MARGIN_LEFT - 8.0,
            pos + 4.0,
            format_tick(tick)
        ));
        tick += step;
    }
    svg.push_str(&format!(
        r#"<line class="chart-axis" x1="{MARGIN_LEFT}" y1="{zero:.1}" x2="{:.1}" y2="{zero:.1}" />"#,
        MARGIN_LEFT + plot_w,
        zero = y(0.0)
    ));

    for segment in &segments {
        let top = y(segment.from.max(segment.to) as f64);
        let bottom = y(segment.from.min(segment.to) as f64);
        let cx = x_center(segment.date);
        svg.push_str(&format!(
            r#"<rect class="chart-bar" x="{:.1}" y="{top:.1}" width="{bar_w:.1}" height="{:.1}" fill="{}"><title>{}&#10;{LEGEND_TITLE}={}&#10;{Y_TITLE}={}</title></rect>"#,
            cx - bar_w / 2.0,
            bottom - top,
            segment.series.color,
            segment.date,
            escape_html(&segment.series.category),
            segment.value
        ));
        if bottom - top >= f64::from(SEGMENT_FONT) + 2.0 {
            svg.push_str(&format!(
                r#"<text class="chart-segment-label" x="{cx:.1}" y="{:.1}" text-anchor="middle" dominant-baseline="central" font-size="{SEGMENT_FONT}">{}</text>"#,
                (top + bottom) / 2.0,
                segment.value
            ));
        }
    }

    for point in &spec.totals {
        let stack_top = tops.get(&point.date).map(|(pos, _)| *pos).unwrap_or(0);
        svg.push_str(&format!(
            r#"<text class="chart-total" x="{:.1}" y="{:.1}" text-anchor="middle" font-size="{TOTAL_FONT}" fill="black">{}</text>"#,
            x_center(point.date),
            y(stack_top as f64) - 6.0,
            point.value
        ));
    }

    let label_every = (days + MAX_X_LABELS - 1) / MAX_X_LABELS;
    let axis_bottom = MARGIN_TOP + plot_h;
    for offset in (0..days).step_by(label_every.max(1) as usize) {
        let date = first_day + chrono::Duration::days(offset);
        svg.push_str(&format!(
            r#"<text class="chart-label" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            x_center(date),
            axis_bottom + 18.0,
            date.format("%m-%d")
        ));
    }

    svg.push_str(&format!(
        r#"<text class="chart-axis-title" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        height - 16.0,
        escape_html(&spec.x_title)
    ));
    svg.push_str(&format!(
        r#"<text class="chart-axis-title" x="18" y="{mid:.1}" text-anchor="middle" transform="rotate(-90 18 {mid:.1})">{}</text>"#,
        escape_html(&spec.y_title),
        mid = MARGIN_TOP + plot_h / 2.0
    ));

    let legend_x = MARGIN_LEFT + plot_w + 24.0;
    svg.push_str(&format!(
        r#"<text class="chart-legend-title" x="{legend_x:.1}" y="{MARGIN_TOP}">{}</text>"#,
        escape_html(&spec.legend_title)
    ));
    for (idx, series) in spec.series.iter().enumerate() {
        let row_y = MARGIN_TOP + 22.0 + idx as f64 * 22.0;
        svg.push_str(&format!(
            r#"<g class="chart-legend-item"><rect x="{legend_x:.1}" y="{:.1}" width="12" height="12" fill="{}" /><text class="chart-label" x="{:.1}" y="{row_y:.1}">{}</text></g>"#,
            row_y - 10.0,
            series.color,
            legend_x + 18.0,
            escape_html(&series.category)
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Axis range and tick step covering `[min, max]` plus room for total labels.
fn y_axis(min: i64, max: i64) -> (f64, f64, f64) {
    let padded_max = max as f64 * 1.1;
    let padded_min = if min < 0 { min as f64 * 1.1 } else { 0.0 };
    let span = (padded_max - padded_min).max(1.0);
    let step = nice_step(span / 5.0);
    let axis_max = ((padded_max / step).ceil() * step).max(step);
    let axis_min = (padded_min / step).floor() * step;
    (axis_min, axis_max, step)
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    (nice * magnitude).max(1.0)
}

fn format_tick(value: f64) -> String {
    format!("{}", value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{value_columns, with_totals};
    use crate::models::{Dataset, Record};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn spec_for(records: Vec<Record>) -> ChartSpec {
        let data = Dataset {
            columns: vec!["入库".into(), "B<&>".into()],
            records,
        };
        let columns = value_columns(&data);
        let rows = with_totals(&data, &data.records);
        build_chart(&rows, &columns, day(1), day(3))
    }

    fn sample() -> ChartSpec {
        spec_for(vec![
            Record {
                date: day(1),
                values: vec![Some(2), Some(3)],
            },
            Record {
                date: day(3),
                values: vec![Some(0), Some(5)],
            },
        ])
    }

    #[test]
    fn spec_has_fixed_presentation() {
        let spec = sample();
        assert_eq!(spec.title, "Stacked Daily Operations（2024-03-01 — 2024-03-03）");
        assert_eq!(spec.x_title, "Date");
        assert_eq!(spec.y_title, "Count");
        assert_eq!(spec.legend_title, "Operation Type");
        assert_eq!(spec.height, 600);
        assert_eq!(spec.series.len(), 2);
        assert_ne!(spec.series[0].color, spec.series[1].color);
    }

    #[test]
    fn totals_are_per_date() {
        let spec = sample();
        assert_eq!(
            spec.totals,
            vec![
                DatePoint { date: day(1), value: 5 },
                DatePoint { date: day(3), value: 5 },
            ]
        );
    }

    #[test]
    fn duplicate_dates_share_a_bar() {
        let spec = spec_for(vec![
            Record {
                date: day(2),
                values: vec![Some(1), Some(1)],
            },
            Record {
                date: day(2),
                values: vec![Some(4), None],
            },
        ]);
        assert_eq!(spec.totals, vec![DatePoint { date: day(2), value: 6 }]);
        assert_eq!(spec.series[0].points, vec![DatePoint { date: day(2), value: 5 }]);
    }

    #[test]
    fn svg_contains_segments_totals_and_legend() {
        let svg = render_svg(&sample());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        // zero-count segments are not drawn
        assert_eq!(svg.matches(r#"class="chart-bar""#).count(), 3);
        assert_eq!(svg.matches(r#"class="chart-total""#).count(), 2);
        assert_eq!(svg.matches(r#"class="chart-legend-item""#).count(), 2);
        assert!(svg.contains("Operation Type"));
        assert!(svg.contains("入库"));
        assert!(svg.contains("B&lt;&amp;&gt;"));
        assert!(!svg.contains("B<&>"));
    }

    #[test]
    fn svg_without_points_says_so() {
        let svg = render_svg(&spec_for(Vec::new()));
        assert!(svg.contains("No data"));
        assert!(!svg.contains("chart-bar"));
    }

    #[test]
    fn colors_cycle() {
        assert_eq!(color_for(0), color_for(COLORS.len()));
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(1.1), 2.0);
        assert_eq!(nice_step(3.0), 5.0);
        assert_eq!(nice_step(7.0), 10.0);
        assert_eq!(nice_step(0.2), 1.0);
        assert_eq!(y_axis(0, 0), (0.0, 1.0, 1.0));
    }

    #[test]
    fn repeated_headers_get_separate_series() {
        let data = Dataset {
            columns: vec!["A".into(), "A".into()],
            records: vec![Record {
                date: day(1),
                values: vec![Some(1), Some(10)],
            }],
        };
        let columns = value_columns(&data);
        let rows = with_totals(&data, &data.records);
        let spec = build_chart(&rows, &columns, day(1), day(1));

        assert_eq!(spec.series.len(), 2);
        assert_eq!(spec.series[0].points, vec![DatePoint { date: day(1), value: 1 }]);
        assert_eq!(spec.series[1].points, vec![DatePoint { date: day(1), value: 10 }]);
        assert_eq!(spec.totals, vec![DatePoint { date: day(1), value: 11 }]);
    }
}
