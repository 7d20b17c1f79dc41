//! Runtime configuration.
//!
//! The listening port is the only externally configurable parameter;
//! timeouts and the attempt budget are fixed constants in [`crate::scrape`].

/// Port used when neither `SITELENS_PORT` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        let port = std::env::var("SITELENS_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok();
        Self {
            port: parse_port(port.as_deref()),
        }
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
