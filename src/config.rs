use std::{env, net::SocketAddr, path::PathBuf};

const DEFAULT_DATA_PATH: &str = "data.csv";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    /// Year prepended to the partial `<m>月<d>日` dates. `None` means the
    /// current local year, looked up on every load.
    pub year: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
#[error("DASHBOARD_YEAR must be a calendar year, got {0:?}")]
pub struct ConfigError(String);

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            data_path: resolve_data_path(),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            year: resolve_year(env::var("DASHBOARD_YEAR").ok())?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_DATA_PATH)
}

fn resolve_year(raw: Option<String>) -> Result<Option<i32>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<i32>() {
        Ok(year) if (1..=9999).contains(&year) => Ok(Some(year)),
        _ => Err(ConfigError(raw)),
    }
}
