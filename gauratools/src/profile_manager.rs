use std::{
    fs,
    io,
    io::{Error, ErrorKind},
    path::{Path, PathBuf},
    time::Duration,
};

use checkout_engine::PollPolicy;
use dirs::home_dir;
use gaura_common::Secret;
use log::*;
use serde::{Deserialize, Serialize};
use storefront_client::StorefrontConfig;

pub const DEFAULT_TOKEN_ENVAR: &str = "GAURA_ACCESS_TOKEN";
const CONFIG_DIR: &str = ".gauratools";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct UserData {
    pub profiles: Vec<Profile>,
}

impl UserData {
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Adds `profile`, replacing any existing profile with the same name.
    pub fn upsert(&mut self, profile: Profile) {
        match self.profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub api_url: String,
    pub host_url: String,
    /// Name of the environment variable holding this profile's access token. Tokens are never written to disk.
    pub token_envar: Option<String>,
    /// Where the cart is kept. Defaults to `cart-{name}.json` in the config directory.
    pub cart_file: Option<PathBuf>,
    pub poll_max_attempts: Option<u32>,
    pub poll_interval_ms: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        let env = StorefrontConfig::from_env_or_default();
        Profile {
            name: "default".to_string(),
            api_url: env.api_url,
            host_url: env.host_url,
            token_envar: Some(DEFAULT_TOKEN_ENVAR.to_string()),
            cart_file: None,
            poll_max_attempts: None,
            poll_interval_ms: None,
        }
    }
}

impl Profile {
    pub fn token_envar(&self) -> &str {
        self.token_envar.as_deref().unwrap_or(DEFAULT_TOKEN_ENVAR)
    }

    pub fn access_token(&self) -> Option<Secret<String>> {
        std::env::var(self.token_envar()).ok().filter(|s| !s.trim().is_empty()).map(Secret::new)
    }

    pub fn storefront_config(&self) -> StorefrontConfig {
        let mut config = StorefrontConfig::from_env_or_default();
        config.api_url = self.api_url.clone();
        config.host_url = self.host_url.clone();
        config.access_token = self.access_token();
        config
    }

    /// The profile's poll settings, with anything unset taken from the environment (or the defaults).
    pub fn poll_policy(&self) -> PollPolicy {
        let env = PollPolicy::from_env_or_default();
        let max_attempts = self.poll_max_attempts.unwrap_or(env.max_attempts);
        let interval = self.poll_interval_ms.map(Duration::from_millis).unwrap_or(env.interval);
        PollPolicy::new(max_attempts, interval)
    }

    pub fn cart_path(&self, config_dir: &Path) -> PathBuf {
        self.cart_file.clone().unwrap_or_else(|| config_dir.join(format!("cart-{}.json", self.name)))
    }
}

pub fn get_config_dir() -> io::Result<PathBuf> {
    let home = home_dir().ok_or_else(|| Error::new(ErrorKind::NotFound, "Home directory not found"))?;
    let config_dir = home.join(CONFIG_DIR);
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
        set_permissions(&config_dir, 0o700)?;
    }
    Ok(config_dir)
}

pub fn get_config_path() -> io::Result<PathBuf> {
    let config_file = get_config_dir()?.join("config.toml");
    if !config_file.exists() {
        info!("🪛️ Creating default config file at {}", config_file.display());
        let default_config = UserData { profiles: vec![Profile::default()] };
        let config_str =
            toml::to_string(&default_config).map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
        fs::write(&config_file, config_str)?;
        set_permissions(&config_file, 0o600)?;
    }
    Ok(config_file)
}

fn set_permissions(path: &Path, perms: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_mode(perms);
        fs::set_permissions(path, permissions)?;
    }
    #[cfg(not(unix))]
    let _ = (path, perms);
    Ok(())
}

pub fn read_config() -> io::Result<UserData> {
    let config_str = fs::read_to_string(get_config_path()?)?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> io::Result<UserData> {
    toml::from_str(config_str).map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))
}

pub fn write_config(config: &UserData) -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    let config_str = toml::to_string(config)?;
    fs::write(config_path, config_str)?;
    Ok(())
}

/// Loads the named profile. If there is no such profile, a profile built from the environment is used instead.
pub fn load_profile(name: &str) -> io::Result<Profile> {
    let config = read_config()?;
    match config.profile(name) {
        Some(p) => Ok(p.clone()),
        None => {
            warn!("🪛️ Profile '{name}' not found. Using settings from the environment.");
            Ok(Profile { name: name.to_string(), ..Profile::default() })
        },
    }
}
