pub mod aggregate;
pub mod app;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod errors;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{load_dataset, parse_dataset};
