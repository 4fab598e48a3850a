use crate::dashboard::Dashboard;
use crate::errors::AppError;
use crate::filter::DateSelection;
use crate::models::{Dataset, RangeQuery, ViewResponse};
use crate::state::AppState;
use crate::storage::load_dataset;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use chrono::NaiveDate;

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Html<String>, AppError> {
    let dashboard = run(&state, &query).await?;
    Ok(Html(dashboard.render_html()))
}

pub async fn get_dataset(State(state): State<AppState>) -> Result<Json<Dataset>, AppError> {
    let dataset = load_dataset(state.data_path(), state.year()).await?;
    Ok(Json(dataset))
}

pub async fn get_view(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ViewResponse>, AppError> {
    let dashboard = run(&state, &query).await?;
    Ok(Json(dashboard.into_view_response()))
}

async fn run(state: &AppState, query: &RangeQuery) -> Result<Dashboard, AppError> {
    let selection = parse_selection(query)?;
    let dataset = load_dataset(state.data_path(), state.year()).await?;
    Ok(Dashboard::build(dataset, selection))
}

/// Blank parameters count as absent, so a lone `start` or `end` is a
/// single-day window.
fn parse_selection(query: &RangeQuery) -> Result<DateSelection, AppError> {
    let mut dates = Vec::with_capacity(2);
    for raw in [&query.start, &query.end].into_iter().flatten() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            AppError::bad_request(format!("invalid date '{raw}', expected YYYY-MM-DD"))
        })?;
        dates.push(date);
    }
    Ok(DateSelection::from_dates(&dates))
}
