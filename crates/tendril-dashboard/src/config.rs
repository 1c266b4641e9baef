//! Dashboard configuration, read from process environment per §6.3.

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub port: u16,
    /// Bearer token required by the restart control endpoint. `None` means
    /// the control endpoint is unauthenticated (auth is opt-in, per §6.4:
    /// "requires bearer auth if `API_TOKEN` is set").
    pub api_token: Option<String>,
    pub hot_store_url: String,
    pub cold_log_url: Option<String>,
    pub cold_log_org: Option<String>,
    pub cold_log_token: Option<String>,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default_port()),
            api_token: std::env::var("API_TOKEN").ok().filter(|s| !s.is_empty()),
            hot_store_url: std::env::var("HOT_STORE_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            cold_log_url: std::env::var("COLD_LOG_URL").ok().filter(|s| !s.is_empty()),
            cold_log_org: std::env::var("COLD_LOG_ORG").ok(),
            cold_log_token: std::env::var("COLD_LOG_TOKEN").ok(),
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.api_token.is_some()
    }
}

fn default_port() -> u16 {
    8080
}
