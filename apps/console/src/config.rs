use std::{collections::HashMap, fs};

use shared::protocol::StatsPeriod;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub log_level: String,
    pub stats_period: StatsPeriod,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            log_level: "info".into(),
            stats_period: StatsPeriod::Week,
            request_timeout_secs: 10,
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("moderator.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the flat `moderator.toml` table, then environment.
pub fn load_settings_from<F>(file: Option<&str>, env: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("log_level") {
                settings.log_level = v.clone();
            }
            if let Some(period) = file_cfg.get("stats_period").and_then(|v| StatsPeriod::from_label(v)) {
                settings.stats_period = period;
            }
            if let Some(parsed) = file_cfg
                .get("request_timeout_secs")
                .and_then(|v| v.parse::<u64>().ok())
            {
                settings.request_timeout_secs = parsed;
            }
        }
    }

    if let Some(v) = env("MODERATION_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__LOG_LEVEL") {
        settings.log_level = v;
    }

    if let Some(v) = env("APP__STATS_PERIOD") {
        if let Some(period) = StatsPeriod::from_label(&v) {
            settings.stats_period = period;
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings.api_base_url = normalize_api_base_url(&settings.api_base_url);
    settings
}

pub fn normalize_api_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }
    if trimmed.ends_with("/api") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/api")
    }
}
