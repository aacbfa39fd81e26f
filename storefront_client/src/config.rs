use gaura_common::Secret;
use log::*;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const DEFAULT_HOST_URL: &str = "http://localhost:3000";
pub const DEFAULT_USER_AGENT: &str = "Gaura Naturals Storefront Client";

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the storefront backend. Requests go to `{api_url}/api/...`.
    pub api_url: String,
    /// The storefront's own origin, which the payment provider sends the shopper back to.
    pub host_url: String,
    pub user_agent: String,
    /// Bearer token for authenticated calls
    pub access_token: Option<Secret<String>>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            host_url: DEFAULT_HOST_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            access_token: None,
        }
    }
}

impl StorefrontConfig {
    pub fn new<S: Into<String>>(api_url: S) -> Self {
        Self { api_url: api_url.into(), ..Default::default() }
    }

    pub fn with_access_token(mut self, token: Secret<String>) -> Self {
        self.access_token = Some(token);
        self
    }

    pub fn from_env_or_default() -> Self {
        let api_url = url_from_env("GAURA_API_URL", DEFAULT_API_URL);
        let host_url = url_from_env("GAURA_HOST_URL", DEFAULT_HOST_URL);
        let user_agent = std::env::var("GAURA_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let access_token = std::env::var("GAURA_ACCESS_TOKEN").ok().filter(|s| !s.is_empty()).map(Secret::new);
        if access_token.is_none() {
            debug!("🪛️ GAURA_ACCESS_TOKEN is not set. Only public endpoints will be available.");
        }
        Self { api_url, host_url, user_agent, access_token }
    }

    /// The storefront origin as a URL.
    pub fn host_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.host_url)
    }
}

fn url_from_env(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(s) => match Url::parse(&s) {
            Ok(_) => s,
            Err(e) => {
                warn!("🪛️ {var} is not a valid URL ({e}). Using {default} instead.");
                default.to_string()
            },
        },
        Err(_) => {
            info!("🪛️ {var} is not set. Using {default}.");
            default.to_string()
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bad_urls_fall_back() {
        std::env::set_var("GAURA_API_URL", "not a url");
        std::env::set_var("GAURA_HOST_URL", "https://gauranaturals.example");
        let config = StorefrontConfig::from_env_or_default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.host_url().unwrap().as_str(), "https://gauranaturals.example/");
        std::env::remove_var("GAURA_API_URL");
        std::env::remove_var("GAURA_HOST_URL");
    }
}
