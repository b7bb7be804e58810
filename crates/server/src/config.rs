use std::fs;

use integrations::SessionConfig;
use serde::Deserialize;
use server_api::DEFAULT_MAX_RESUME_BYTES;
use tracing::warn;

pub const SETTINGS_FILE: &str = "server.toml";
pub const DEV_SESSION_SECRET: &str = "devsecret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub session_secret: String,
    pub session_ttl_seconds: i64,
    pub staff_username: String,
    pub staff_password: String,
    pub storage_base_url: Option<String>,
    pub storage_public_url: Option<String>,
    pub storage_token: Option<String>,
    pub max_resume_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            session_secret: DEV_SESSION_SECRET.into(),
            session_ttl_seconds: 8 * 3600,
            staff_username: "staff".into(),
            staff_password: "devpassword".into(),
            storage_base_url: None,
            storage_public_url: None,
            storage_token: None,
            max_resume_bytes: DEFAULT_MAX_RESUME_BYTES,
        }
    }
}

impl Settings {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            secret: self.session_secret.clone(),
            ttl_seconds: self.session_ttl_seconds,
            staff_username: self.staff_username.clone(),
            staff_password: self.staff_password.clone(),
        }
    }
}

/// Keys accepted in `server.toml`. Anything omitted keeps its default.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    session_secret: Option<String>,
    session_ttl_seconds: Option<i64>,
    staff_username: Option<String>,
    staff_password: Option<String>,
    storage_base_url: Option<String>,
    storage_public_url: Option<String>,
    storage_token: Option<String>,
    max_resume_bytes: Option<usize>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(cfg) => cfg,
        Err(error) => {
            warn!(%error, file = SETTINGS_FILE, "ignoring unreadable settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.session_secret {
        settings.session_secret = v;
    }
    if let Some(v) = file_cfg.session_ttl_seconds {
        settings.session_ttl_seconds = v;
    }
    if let Some(v) = file_cfg.staff_username {
        settings.staff_username = v;
    }
    if let Some(v) = file_cfg.staff_password {
        settings.staff_password = v;
    }
    if file_cfg.storage_base_url.is_some() {
        settings.storage_base_url = file_cfg.storage_base_url;
    }
    if file_cfg.storage_public_url.is_some() {
        settings.storage_public_url = file_cfg.storage_public_url;
    }
    if file_cfg.storage_token.is_some() {
        settings.storage_token = file_cfg.storage_token;
    }
    if let Some(v) = file_cfg.max_resume_bytes {
        settings.max_resume_bytes = v;
    }
}

/// Environment overrides. `APP__*` wins over the bare name when both are set.
pub(crate) fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = lookup("APP__SESSION_SECRET") {
        settings.session_secret = v;
    }
    if let Some(v) = lookup("APP__SESSION_TTL_SECONDS") {
        if let Ok(parsed) = v.parse::<i64>() {
            settings.session_ttl_seconds = parsed;
        }
    }

    if let Some(v) = lookup("APP__STAFF_USERNAME") {
        settings.staff_username = v;
    }
    if let Some(v) = lookup("APP__STAFF_PASSWORD") {
        settings.staff_password = v;
    }

    if let Some(v) = lookup("STORAGE_BASE_URL") {
        settings.storage_base_url = Some(v);
    }
    if let Some(v) = lookup("APP__STORAGE_BASE_URL") {
        settings.storage_base_url = Some(v);
    }
    if let Some(v) = lookup("APP__STORAGE_PUBLIC_URL") {
        settings.storage_public_url = Some(v);
    }
    if let Some(v) = lookup("APP__STORAGE_TOKEN") {
        settings.storage_token = Some(v);
    }

    if let Some(v) = lookup("APP__MAX_RESUME_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_resume_bytes = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
