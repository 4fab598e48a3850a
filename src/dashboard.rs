use crate::aggregate::{melt, value_columns, with_totals};
use crate::chart::{ChartSpec, build_chart};
use crate::filter::{DateBounds, DateSelection, filter_view};
use crate::models::{Dataset, LongRow, ViewResponse, ViewRow};
use crate::ui::{Page, render_page};
use chrono::NaiveDate;
use tracing::debug;

/// One pass of filter → aggregate → chart over a freshly loaded dataset.
#[derive(Debug)]
pub struct Dashboard {
    pub dataset: Dataset,
    pub bounds: Option<DateBounds>,
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub value_columns: Vec<String>,
    pub rows: Vec<ViewRow>,
    pub long: Vec<LongRow>,
    /// Only built when the window holds at least one row.
    pub chart: Option<ChartSpec>,
}

impl Dashboard {
    pub fn build(dataset: Dataset, selection: DateSelection) -> Self {
        let bounds = DateBounds::of(&dataset);
        let range = selection.resolve(bounds);
        let view = match range {
            Some((start, end)) => filter_view(&dataset, start, end),
            None => Vec::new(),
        };
        debug!(?selection, ?range, rows = view.len(), "filtered view");

        let value_columns = value_columns(&dataset);
        let (rows, long, chart) = match range {
            Some((start, end)) if !view.is_empty() => {
                let rows = with_totals(&dataset, &view);
                let long = melt(&rows, &value_columns);
                let chart = build_chart(&rows, &value_columns, start, end);
                (rows, long, Some(chart))
            }
            _ => (Vec::new(), Vec::new(), None),
        };

        Self {
            dataset,
            bounds,
            range,
            value_columns,
            rows,
            long,
            chart,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render_html(&self) -> String {
        render_page(&Page {
            dataset: &self.dataset,
            bounds: self.bounds,
            range: self.range,
            chart: self.chart.as_ref(),
        })
    }

    pub fn into_view_response(self) -> ViewResponse {
        ViewResponse {
            start: self.range.map(|(start, _)| start),
            end: self.range.map(|(_, end)| end),
            min_date: self.bounds.map(|bounds| bounds.min),
            max_date: self.bounds.map(|bounds| bounds.max),
            empty: self.rows.is_empty(),
            value_columns: self.value_columns,
            rows: self.rows,
            long: self.long,
            chart: self.chart,
        }
    }
}
