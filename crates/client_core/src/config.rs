use std::{fs, io, path::Path, time::Duration};

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{
    error::ConfigError,
    feedback::DEFAULT_TOAST_DURATION,
    navigation::{DEFAULT_LOGIN_PATH, DEFAULT_LOGIN_REDIRECT_DELAY},
};

pub const SETTINGS_FILE: &str = "storefront.toml";
const ENV_PREFIX: &str = "STOREFRONT__";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    pub server_url: String,
    pub add_path: String,
    pub remove_path_prefix: String,
    pub clear_path: String,
    pub login_path: String,
    pub csrf_cookie: String,
    pub csrf_header: String,
    pub toast_duration_ms: u64,
    pub login_redirect_delay_ms: u64,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            add_path: "/carrito/agregar/".into(),
            remove_path_prefix: "/carrito/eliminar/".into(),
            clear_path: "/carrito/vaciar/".into(),
            login_path: DEFAULT_LOGIN_PATH.into(),
            csrf_cookie: "csrftoken".into(),
            csrf_header: "X-CSRFToken".into(),
            toast_duration_ms: DEFAULT_TOAST_DURATION.as_millis() as u64,
            login_redirect_delay_ms: DEFAULT_LOGIN_REDIRECT_DELAY.as_millis() as u64,
        }
    }
}

impl WidgetSettings {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn login_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.login_redirect_delay_ms)
    }

    pub fn server_base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.server_url).map_err(|source| ConfigError::InvalidServerUrl {
            url: self.server_url.clone(),
            source,
        })
    }

    /// Absolute login URL the client is sent to after an authentication failure.
    pub fn login_target(&self) -> Result<String, ConfigError> {
        let base = self.server_base()?;
        base.join(&self.login_path)
            .map(String::from)
            .map_err(|source| ConfigError::InvalidServerUrl {
                url: self.login_path.clone(),
                source,
            })
    }
}

/// Defaults, then `path` when it exists, then `STOREFRONT__*` environment variables.
pub fn load_settings(path: &Path) -> Result<WidgetSettings, ConfigError> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<WidgetSettings>(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "settings file not found; using defaults");
            WidgetSettings::default()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    apply_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.server_base()?;
    Ok(settings)
}

pub(crate) fn apply_overrides(
    settings: &mut WidgetSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

    if let Some(v) = var("SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("ADD_PATH") {
        settings.add_path = v;
    }
    if let Some(v) = var("REMOVE_PATH_PREFIX") {
        settings.remove_path_prefix = v;
    }
    if let Some(v) = var("CLEAR_PATH") {
        settings.clear_path = v;
    }
    if let Some(v) = var("LOGIN_PATH") {
        settings.login_path = v;
    }
    if let Some(v) = var("CSRF_COOKIE") {
        settings.csrf_cookie = v;
    }
    if let Some(v) = var("CSRF_HEADER") {
        settings.csrf_header = v;
    }
    if let Some(v) = var("TOAST_DURATION_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.toast_duration_ms = parsed;
        }
    }
    if let Some(v) = var("LOGIN_REDIRECT_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.login_redirect_delay_ms = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
