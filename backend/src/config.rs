use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firebase,
    Memory,
}

/// Server settings read from the environment (`.env` is loaded first by `main`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store_backend: StoreBackend,
    /// Seconds between background reloads; `None` disables them.
    pub refresh_interval_secs: Option<u64>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("firebase") => StoreBackend::Firebase,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "STORE_BACKEND must be 'firebase' or 'memory', got '{}'",
                    other
                )));
            }
        };

        let refresh_interval_secs = match lookup("REFRESH_INTERVAL_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    AppError::Config(format!("REFRESH_INTERVAL_SECS is invalid: {}", e))
                })?;
                (secs > 0).then_some(secs)
            }
            None => None,
        };

        Ok(Self {
            bind_addr,
            store_backend,
            refresh_interval_secs,
        })
    }
}
