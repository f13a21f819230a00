use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_base_url() -> String { "http://localhost:8080/api".into() }
fn default_request_timeout_secs() -> u64 { 10 }
fn default_user_agent() -> String { concat!("bobmap-client/", env!("CARGO_PKG_VERSION")).into() }

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("BOBMAP").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_default())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert!(config.api_base_url.starts_with("http"));
        assert!(config.request_timeout_secs > 0);
        assert!(config.user_agent.starts_with("bobmap-client/"));
    }
}
