use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

/// Public World Bank climate data API.
pub const DEFAULT_BASE_URL: &str = "http://climatedataapi.worldbank.org/climateweb/rest/v1";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// base_url = "http://climatedataapi.worldbank.org/climateweb/rest/v1"
/// timeout_secs = 30
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Base endpoint; `DEFAULT_BASE_URL` when unset.
    pub base_url: Option<String>,

    /// Per-call deadline. No deadline when unset.
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Store the base URL, rejecting anything that is not an absolute http(s) URL.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        let parsed = url::Url::parse(base_url)
            .with_context(|| format!("Base URL '{base_url}' is not a valid URL"))?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
            return Err(anyhow!(
                "Base URL '{base_url}' must be an absolute http or https URL.\n\
                 Hint: the default is {DEFAULT_BASE_URL}"
            ));
        }

        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        Ok(())
    }

    pub fn set_timeout_secs(&mut self, secs: Option<u64>) {
        self.timeout_secs = secs.filter(|s| *s > 0);
    }

    /// Config at the platform path; see [`Config::load_from`].
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Reads `path`. A missing file is the default (unconfigured) config.
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("Config file {} is not valid TOML", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Could not read config file {}", path.display()))
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Writes the config as TOML to `path`, creating missing directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Could not create {}", dir.display()))?;
        }

        let text = toml::to_string_pretty(self).context("Could not serialize climate config")?;
        fs::write(path, text).with_context(|| format!("Could not write {}", path.display()))
    }

    /// `config.toml` inside the platform config directory for `climate-cli`.
    pub fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "climate-client", "climate-cli")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| anyhow!("No config directory available on this platform"))
    }

    fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url_when_not_set() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout(), None);
    }

    #[test]
    fn set_base_url_trims_trailing_slash() {
        let mut cfg = Config::default();
        cfg.set_base_url("https://climate.example/api/v1/").expect("url should be accepted");
        assert_eq!(cfg.base_url(), "https://climate.example/api/v1");
    }

    #[test]
    fn set_base_url_rejects_relative_and_non_http() {
        let mut cfg = Config::default();

        let err = cfg.set_base_url("/climateweb/rest/v1").unwrap_err();
        assert!(err.to_string().contains("is not a valid URL"));

        let err = cfg.set_base_url("ftp://climate.example/v1").unwrap_err();
        assert!(err.to_string().contains("must be an absolute http or https URL"));

        assert_eq!(cfg.base_url, None);
    }

    #[test]
    fn zero_timeout_means_no_timeout() {
        let mut cfg = Config::default();
        cfg.set_timeout_secs(Some(0));
        assert_eq!(cfg.timeout(), None);

        cfg.set_timeout_secs(Some(15));
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_base_url("http://localhost:8080/rest/v1").unwrap();
        cfg.set_timeout_secs(Some(30));

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("climate-config-{}-{name}", std::process::id()))
            .join("nested")
            .join("config.toml")
    }

    #[test]
    fn missing_file_loads_default() {
        let path = scratch_path("missing");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn save_then_load_from_disk() {
        let path = scratch_path("saved");
        let mut cfg = Config::default();
        cfg.set_base_url("https://climate.example/v1").unwrap();
        cfg.set_timeout_secs(Some(5));

        cfg.save_to(&path).expect("config should be written");
        assert_eq!(Config::load_from(&path).unwrap(), cfg);

        let _ = fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let path = scratch_path("broken");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("is not valid TOML"));

        let _ = fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }
}
