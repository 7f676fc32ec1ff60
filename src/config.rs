use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,

    // Backend
    pub api_base_url: String,
    pub request_timeout: Duration,

    // Session persistence
    pub session_dir: PathBuf,

    // Query cache
    pub task_list_ttl: Duration,
    pub detail_ttl: Duration,

    // Interaction timing
    pub search_debounce: Duration,
    pub toggle_window: Duration,

    // Due-task notifications
    pub notify_poll_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        // Load .env if present; real environment variables win
        dotenvy::dotenv().ok();

        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));

        let api_base_url = env::var("TASKMAN_API_URL").context("TASKMAN_API_URL must be set")?;
        let request_timeout = duration_var("TASKMAN_REQUEST_TIMEOUT_SECONDS", 30);

        let session_dir = env::var("TASKMAN_SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                env::var("HOME")
                    .map(|home| PathBuf::from(home).join(".taskman"))
                    .unwrap_or_else(|_| PathBuf::from(".taskman"))
            });

        // Task lists tolerate more staleness than detail views
        let task_list_ttl = duration_var("TASKMAN_LIST_TTL_SECONDS", 300);
        let detail_ttl = duration_var("TASKMAN_DETAIL_TTL_SECONDS", 60);

        let search_debounce = millis_var("TASKMAN_SEARCH_DEBOUNCE_MS", 800);
        let toggle_window = millis_var("TASKMAN_TOGGLE_WINDOW_MS", 300);
        let notify_poll_interval = duration_var("TASKMAN_NOTIFY_POLL_SECONDS", 60);

        Ok(Settings {
            env,
            api_base_url,
            request_timeout,
            session_dir,
            task_list_ttl,
            detail_ttl,
            search_debounce,
            toggle_window,
            notify_poll_interval,
        })
    }
}

fn duration_var(name: &str, default_secs: u64) -> Duration {
    Duration::from_secs(
        env::var(name)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_secs),
    )
}

fn millis_var(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(
        env::var(name)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_ms),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing() {
        assert_eq!(Environment::from_str("PROD"), Environment::Prod);
        assert_eq!(Environment::from_str("production"), Environment::Prod);
        assert_eq!(Environment::from_str("staging"), Environment::Staging);
        assert_eq!(Environment::from_str("anything"), Environment::Dev);
        assert!(Environment::Dev.is_dev());
        assert!(Environment::Prod.is_prod());
    }
}
