use std::path::{Path, PathBuf};
use std::time::Duration;

use paths::PathContext;
use profile_form::remote::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use profile_form::selector::{DEFAULT_LARGE_LIST_THRESHOLD, DEFAULT_MAX_VISIBLE, DEFAULT_MIN_QUERY_LEN};
use profile_form::{FormSettings, SelectorConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;

/// Prefix for environment overrides, e.g. `PROFILE_TUI_API__BASE_URL`.
pub const ENV_PREFIX: &str = "PROFILE_TUI";

/// Dataset picked up from the data directory when no path is configured.
pub const DATASET_NAME: &str = "world";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub enabled: bool,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            enabled: true,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Selector limits. Whether a field accepts free text is fixed per field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorLimits {
    pub large_list_threshold: usize,
    pub min_query_len: usize,
    pub max_visible: usize,
}

impl Default for SelectorLimits {
    fn default() -> Self {
        Self {
            large_list_threshold: DEFAULT_LARGE_LIST_THRESHOLD,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            max_visible: DEFAULT_MAX_VISIBLE,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// RON dataset replacing the bundled one.
    pub dataset_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate: f64,
    pub frame_rate: f64,
    pub mouse: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate: 4.0,
            frame_rate: 30.0,
            mouse: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub selector: SelectorLimits,
    pub geo: GeoConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Defaults, then `<app>.settings.toml` and `config.json5` from the
    /// project root, then `PROFILE_TUI_*` environment variables.
    pub fn new(paths: &PathContext) -> Result<Self, config::ConfigError> {
        Self::from_sources(
            &paths.settings_file(None),
            &paths.project_root().join("config.json5"),
            ENV_PREFIX,
        )
    }

    pub fn from_sources(
        settings_file: &Path,
        json5_file: &Path,
        env_prefix: &str,
    ) -> Result<Self, config::ConfigError> {
        let config_files = [
            (settings_file, config::FileFormat::Toml),
            (json5_file, config::FileFormat::Json5),
        ];
        let mut builder = config::Config::builder();
        for (file, format) in config_files {
            if file.exists() {
                debug!(path = %file.display(), "loading settings file");
            }
            builder = builder.add_source(
                config::File::from(file)
                    .format(format)
                    .required(false),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Command line flags win over every other source.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base) = &cli.api_base {
            self.api.base_url = base.clone();
        }
        if cli.offline {
            self.api.enabled = false;
        }
        if let Some(path) = &cli.geo {
            self.geo.dataset_path = Some(path.clone());
        }
    }

    /// Configured dataset, else `data/geo/world.ron` if present.
    /// `None` means the bundled dataset.
    pub fn dataset_path(&self, paths: &PathContext) -> Option<PathBuf> {
        if let Some(path) = &self.geo.dataset_path {
            return Some(path.clone());
        }
        let file = paths.dataset_file(DATASET_NAME);
        if file.is_file() {
            debug!(path = %file.display(), "using dataset from data directory");
            return Some(file);
        }
        None
    }

    pub fn form_settings(&self) -> FormSettings {
        FormSettings {
            selector: SelectorConfig::default()
                .large_list_threshold(self.selector.large_list_threshold)
                .min_query_len(self.selector.min_query_len)
                .max_visible(self.selector.max_visible),
            remote_enabled: self.api.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn missing() -> PathBuf {
        PathBuf::from("/nonexistent/profile_tui/config.json5")
    }

    #[test]
    fn defaults_without_any_source() {
        let cfg = Config::from_sources(&missing(), &missing(), "PROFILE_TUI_TEST_NONE")
            .expect("config");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert_eq!(cfg.api.timeout(), Duration::from_millis(3000));
        assert_eq!(cfg.selector.large_list_threshold, 500);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(
            file,
            "[api]\nbase_url = \"http://backend:9000\"\nenabled = false\n\n[selector]\nmax_visible = 50"
        )
        .expect("write");
        let cfg = Config::from_sources(file.path(), &missing(), "PROFILE_TUI_TEST_TOML")
            .expect("config");
        assert_eq!(cfg.api.base_url, "http://backend:9000");
        assert!(!cfg.api.enabled);
        assert_eq!(cfg.api.timeout_ms, 3000);
        assert_eq!(cfg.selector.max_visible, 50);
        assert_eq!(cfg.selector.min_query_len, 2);
    }

    #[test]
    fn json5_file_is_read() {
        let mut file = tempfile::Builder::new()
            .suffix(".json5")
            .tempfile()
            .expect("tempfile");
        writeln!(file, "{{ geo: {{ dataset_path: '/data/world.ron' }}, }}").expect("write");
        let cfg = Config::from_sources(&missing(), file.path(), "PROFILE_TUI_TEST_JSON5")
            .expect("config");
        assert_eq!(cfg.geo.dataset_path, Some(PathBuf::from("/data/world.ron")));
    }

    #[test]
    fn cli_flags_win() {
        let mut cfg = Config::default();
        let cli = Cli::try_parse_from([
            "profile_tui",
            "--offline",
            "--api-base",
            "http://other:1",
            "--geo",
            "custom.ron",
        ])
        .expect("parse");
        cfg.apply_cli(&cli);
        assert!(!cfg.api.enabled);
        assert_eq!(cfg.api.base_url, "http://other:1");
        assert_eq!(cfg.geo.dataset_path, Some(PathBuf::from("custom.ron")));
        assert!(!cfg.form_settings().remote_enabled);
    }

    #[test]
    fn dataset_file_in_data_directory_is_used() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths =
            PathContext::with_base_path(dir.path().to_path_buf(), "studio", "project", "app");
        let mut cfg = Config::default();
        assert_eq!(cfg.dataset_path(&paths), None);

        paths.ensure_directories().expect("directories");
        let file = paths.dataset_file(DATASET_NAME);
        std::fs::write(&file, "(countries: [])").expect("write");
        assert_eq!(cfg.dataset_path(&paths), Some(file));

        cfg.geo.dataset_path = Some(PathBuf::from("custom.ron"));
        assert_eq!(
            cfg.dataset_path(&paths),
            Some(PathBuf::from("custom.ron"))
        );
    }

    #[test]
    fn selector_limits_reach_form_settings() {
        let mut cfg = Config::default();
        cfg.selector.large_list_threshold = 10;
        cfg.selector.max_visible = 5;
        let settings = cfg.form_settings();
        assert_eq!(settings.selector.large_list_threshold, 10);
        assert_eq!(settings.selector.max_visible, 5);
        assert_eq!(settings.selector.min_query_len, 2);
    }
}
