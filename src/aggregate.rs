use crate::models::{DATE_COLUMN, Dataset, LongRow, Record, TOTAL_COLUMN, ViewRow};

/// Positions in `dataset.columns` of the operation-category columns:
/// everything but the date and any `Total`. Headers may repeat.
pub fn value_indices(dataset: &Dataset) -> Vec<usize> {
    dataset
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.as_str() != DATE_COLUMN && column.as_str() != TOTAL_COLUMN)
        .map(|(idx, _)| idx)
        .collect()
}

/// Names of the columns at [`value_indices`], in the same order.
pub fn value_columns(dataset: &Dataset) -> Vec<String> {
    value_indices(dataset)
        .into_iter()
        .map(|idx| dataset.columns[idx].clone())
        .collect()
}

/// Projects `view` onto the value columns and recomputes the row totals.
/// Empty cells add nothing to the total.
pub fn with_totals(dataset: &Dataset, view: &[Record]) -> Vec<ViewRow> {
    let indices = value_indices(dataset);

    view.iter()
        .map(|record| {
            let values: Vec<Option<i64>> = indices
                .iter()
                .map(|&idx| record.values.get(idx).copied().flatten())
                .collect();
            let total = values
                .iter()
                .fold(0i64, |acc, value| acc.saturating_add(value.unwrap_or(0)));
            ViewRow {
                date: record.date,
                values,
                total,
            }
        })
        .collect()
}

/// Wide to long: one `(date, category, count)` per row and value column,
/// row by row, columns in order. `value_columns` pairs with `row.values`
/// by position.
pub fn melt(rows: &[ViewRow], value_columns: &[String]) -> Vec<LongRow> {
    let mut long = Vec::with_capacity(rows.len() * value_columns.len());
    for row in rows {
        for (category, value) in value_columns.iter().zip(&row.values) {
            long.push(LongRow {
                date: row.date,
                category: category.clone(),
                count: value.unwrap_or(0),
            });
        }
    }
    long
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample() -> Dataset {
        Dataset {
            columns: vec!["A".into(), "B".into()],
            records: vec![
                Record {
                    date: day(1),
                    values: vec![Some(2), Some(3)],
                },
                Record {
                    date: day(2),
                    values: vec![Some(0), Some(5)],
                },
            ],
        }
    }

    #[test]
    fn totals_sum_value_columns() {
        let data = sample();
        let rows = with_totals(&data, &data.records);
        let totals: Vec<i64> = rows.iter().map(|row| row.total).collect();
        assert_eq!(totals, vec![5, 5]);
    }

    #[test]
    fn melt_is_row_major() {
        let data = sample();
        let columns = value_columns(&data);
        let long = melt(&with_totals(&data, &data.records), &columns);

        let flat: Vec<(NaiveDate, &str, i64)> = long
            .iter()
            .map(|row| (row.date, row.category.as_str(), row.count))
            .collect();
        assert_eq!(
            flat,
            vec![
                (day(1), "A", 2),
                (day(1), "B", 3),
                (day(2), "A", 0),
                (day(2), "B", 5),
            ]
        );
    }

    #[test]
    fn existing_total_column_is_ignored_and_overwritten() {
        let data = Dataset {
            columns: vec!["A".into(), "Total".into(), "B".into()],
            records: vec![Record {
                date: day(1),
                values: vec![Some(4), Some(100), None],
            }],
        };
        assert_eq!(value_columns(&data), vec!["A", "B"]);

        let rows = with_totals(&data, &data.records);
        assert_eq!(rows[0].values, vec![Some(4), None]);
        assert_eq!(rows[0].total, 4);

        let long = melt(&rows, &value_columns(&data));
        assert_eq!(long.len(), rows.len() * 2);
        assert_eq!(long[1].count, 0);
    }

    #[test]
    fn repeated_headers_keep_their_own_counts() {
        let data =
            crate::storage::parse_dataset("Date, A,A ,Total\n3月01日,1,10,0\n", 2024).unwrap();
        assert_eq!(value_indices(&data), vec![0, 1]);
        assert_eq!(value_columns(&data), vec!["A", "A"]);

        let rows = with_totals(&data, &data.records);
        assert_eq!(rows[0].values, vec![Some(1), Some(10)]);
        assert_eq!(rows[0].total, 11);

        let counts: Vec<i64> = melt(&rows, &value_columns(&data))
            .iter()
            .map(|row| row.count)
            .collect();
        assert_eq!(counts, vec![1, 10]);
    }
}
