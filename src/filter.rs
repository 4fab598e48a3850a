use crate::models::{Dataset, Record};
use chrono::NaiveDate;

/// Observed date span of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    /// `None` for a dataset without records.
    pub fn of(dataset: &Dataset) -> Option<Self> {
        let min = dataset.records.iter().map(|record| record.date).min()?;
        let max = dataset.records.iter().map(|record| record.date).max()?;
        Some(Self { min, max })
    }
}

/// What the range picker handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelection {
    Range(NaiveDate, NaiveDate),
    Single(NaiveDate),
    Full,
}

impl DateSelection {
    pub fn from_dates(dates: &[NaiveDate]) -> Self {
        match dates {
            [start, end] => Self::Range(*start, *end),
            [date] => Self::Single(*date),
            _ => Self::Full,
        }
    }

    /// Inclusive `(start, end)` window, or `None` when the selection is the
    /// full span of an empty dataset.
    pub fn resolve(self, bounds: Option<DateBounds>) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Range(start, end) => Some((start, end)),
            Self::Single(date) => Some((date, date)),
            Self::Full => bounds.map(|bounds| (bounds.min, bounds.max)),
        }
    }
}

/// Records with `start <= date <= end`, in dataset order.
pub fn filter_view(dataset: &Dataset, start: NaiveDate, end: NaiveDate) -> Vec<Record> {
    dataset
        .records
        .iter()
        .filter(|record| record.date >= start && record.date <= end)
        .cloned()
        .collect()
}
