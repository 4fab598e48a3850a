use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::chart::ChartSpec;

pub const DATE_COLUMN: &str = "Date";
pub const TOTAL_COLUMN: &str = "Total";

/// One CSV line: a date plus one count per non-date column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub values: Vec<Option<i64>>,
}

/// The cleaned input file, sorted ascending by date.
///
/// `columns` holds every header except `Date`, in file order, so a `Total`
/// column from the file is kept here with whatever the file said.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow {
    pub date: NaiveDate,
    pub values: Vec<Option<i64>>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRow {
    pub date: NaiveDate,
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub empty: bool,
    pub value_columns: Vec<String>,
    pub rows: Vec<ViewRow>,
    pub long: Vec<LongRow>,
    pub chart: Option<ChartSpec>,
}
