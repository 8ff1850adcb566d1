//! Filter settings loader standing in for the host's configuration store.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::context::RewriteContext;

/// File name looked up by [`FilterConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "applink.config.json";

/// Administrator settings for the app link filter.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterConfig {
    /// Scheme of a custom app to open instead of the official one. Empty keeps the default.
    #[serde(alias = "urlscheme")]
    pub url_scheme: String,
    /// Canonical root URL of the site.
    #[serde(alias = "wwwroot")]
    pub base_url: String,
}

impl FilterConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// A missing or unreadable file yields the defaults: no scheme override and no base URL.
    pub fn discover(dir: &Path) -> Self {
        Self::from_path(&dir.join(DEFAULT_CONFIG_FILE)).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Scheme override, or `None` when the setting is blank.
    pub fn url_scheme(&self) -> Option<&str> {
        let scheme = self.url_scheme.trim();
        (!scheme.is_empty()).then_some(scheme)
    }

    /// Start a per-call context from these settings.
    pub fn to_context(&self) -> RewriteContext {
        let context = RewriteContext::new(self.base_url.trim_end());
        match self.url_scheme() {
            Some(scheme) => context.with_configured_scheme(scheme),
            None => context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_plugin_setting_names() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{ "urlscheme": "myschool", "wwwroot": "https://school.test" }"#,
        )
        .unwrap();

        let config = FilterConfig::discover(dir.path());
        assert_eq!(config.url_scheme(), Some("myschool"));
        assert_eq!(config.base_url, "https://school.test");
    }

    #[test]
    fn falls_back_to_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let config = FilterConfig::discover(dir.path());
        assert_eq!(config, FilterConfig::default());
        assert_eq!(config.url_scheme(), None);
    }

    #[test]
    fn reports_malformed_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FilterConfig::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
        assert_eq!(FilterConfig::discover(dir.path()), FilterConfig::default());
    }

    #[test]
    fn builds_context_from_settings() {
        let config = FilterConfig {
            url_scheme: " custom ".into(),
            base_url: "https://school.test".into(),
        };
        let context = config.to_context();
        assert_eq!(context.configured_scheme, "custom");
        assert_eq!(context.base_url, "https://school.test");
        assert!(!context.is_non_interactive_request);

        let blank = FilterConfig {
            url_scheme: "   ".into(),
            ..config
        };
        assert!(blank.to_context().configured_scheme.is_empty());
    }
}
