use std::{fs, num::NonZeroUsize, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_SETTINGS_FILE: &str = "spot_admin.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub rows_per_page: usize,
    pub notification_auto_hide_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub keep_dialog_open_on_failure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080/api/".into(),
            rows_per_page: 5,
            notification_auto_hide_ms: 4000,
            request_timeout_secs: None,
            keep_dialog_open_on_failure: false,
        }
    }
}

impl Settings {
    pub fn rows_per_page(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.rows_per_page).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn notification_auto_hide(&self) -> Duration {
        Duration::from_millis(self.notification_auto_hide_ms)
    }
}

pub fn load_settings() -> Settings {
    let mut settings = load_settings_file(Path::new(DEFAULT_SETTINGS_FILE));
    apply_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Reads a settings file, falling back to defaults when it is missing or
/// malformed.
pub fn load_settings_file(path: &Path) -> Settings {
    let Ok(raw) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match toml::from_str::<Settings>(&raw) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring malformed settings file");
            Settings::default()
        }
    }
}

/// Applies `SPOT_*` / `APP__*` overrides; the `APP__` form wins when both are set.
pub fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SPOT_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__ROWS_PER_PAGE") {
        if let Ok(parsed) = v.parse::<usize>() {
            if parsed > 0 {
                settings.rows_per_page = parsed;
            }
        }
    }

    if let Some(v) = lookup("APP__NOTIFICATION_AUTO_HIDE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notification_auto_hide_ms = parsed;
        }
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }

    if let Some(v) = lookup("APP__KEEP_DIALOG_OPEN_ON_FAILURE") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.keep_dialog_open_on_failure = parsed;
        }
    }
}

/// Parses the api base url, making sure relative endpoints resolve beneath it.
pub fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
    let raw = raw.trim();
    let raw = if raw.is_empty() {
        Settings::default().api_base_url
    } else if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&raw).map_err(|source| ClientError::InvalidBaseUrl {
        url: raw.clone(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::OpaqueBaseUrl(raw));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn appends_trailing_slash_to_base_url() {
        let url = normalize_base_url("http://localhost:3000/api").expect("url");
        assert_eq!(url.as_str(), "http://localhost:3000/api/");
        assert_eq!(
            url.join("spots").expect("join").as_str(),
            "http://localhost:3000/api/spots"
        );
    }

    #[test]
    fn empty_base_url_falls_back_to_default() {
        let url = normalize_base_url("   ").expect("url");
        assert_eq!(url.as_str(), Settings::default().api_base_url);
    }

    #[test]
    fn rejects_unparsable_base_url() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            normalize_base_url("mailto:admin@example.com"),
            Err(ClientError::OpaqueBaseUrl(_))
        ));
    }

    #[test]
    fn app_prefixed_overrides_win_and_bad_values_are_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SPOT_API_BASE_URL", "http://a.example/"),
            ("APP__API_BASE_URL", "http://b.example/"),
            ("APP__ROWS_PER_PAGE", "0"),
            ("APP__NOTIFICATION_AUTO_HIDE_MS", "1500"),
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
            ("APP__KEEP_DIALOG_OPEN_ON_FAILURE", "true"),
        ]);
        let mut settings = Settings::default();
        apply_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.api_base_url, "http://b.example/");
        assert_eq!(settings.rows_per_page, 5);
        assert_eq!(settings.notification_auto_hide(), Duration::from_millis(1500));
        assert_eq!(settings.request_timeout_secs, None);
        assert!(settings.keep_dialog_open_on_failure);
    }

    #[test]
    fn reads_partial_settings_file() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let temp_root = env::temp_dir().join(format!("spot_admin_settings_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");
        let path = temp_root.join(DEFAULT_SETTINGS_FILE);
        fs::write(&path, "rows_per_page = 10\nrequest_timeout_secs = 30\n").expect("write");

        let settings = load_settings_file(&path);
        assert_eq!(settings.rows_per_page().get(), 10);
        assert_eq!(settings.request_timeout_secs, Some(30));
        assert_eq!(settings.api_base_url, Settings::default().api_base_url);

        fs::remove_dir_all(temp_root).expect("cleanup");
    }

    #[test]
    fn missing_settings_file_yields_defaults() {
        let settings = load_settings_file(Path::new("/definitely/not/here.toml"));
        assert_eq!(settings, Settings::default());
    }
}
