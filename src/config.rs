use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub ui: UiConfig,
  /// Custom title for header (defaults to "MS Admin")
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// REST API root, e.g. https://api.example.org/
  #[serde(default)]
  pub base_url: String,
  /// Root for relative image paths; falls back to `base_url`
  pub image_url: Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: String::new(),
      image_url: None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Seconds an unreferenced query stays cached
  #[serde(default = "default_gc_secs")]
  pub gc_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      gc_secs: default_gc_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      page_size: default_page_size(),
    }
  }
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_gc_secs() -> u64 {
  60
}

fn default_page_size() -> usize {
  10
}

pub const API_URL_ENV: &str = "MS_ADMIN_API_URL";
pub const IMAGE_URL_ENV: &str = "MS_ADMIN_IMAGE_URL";

impl Config {
  /// Load configuration from file, then apply environment overrides.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./ms-admin.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/ms-admin/config.yaml
  ///
  /// A missing file is not an error as long as the API URL comes from the
  /// environment or the command line.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("ms-admin.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("ms-admin").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
    if let Some(url) = var(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
      self.api.base_url = url;
    }
    if let Some(url) = var(IMAGE_URL_ENV).filter(|v| !v.trim().is_empty()) {
      self.api.image_url = Some(url);
    }
  }

  /// Parsed API root
  pub fn base_url(&self) -> Result<Url> {
    if self.api.base_url.trim().is_empty() {
      return Err(eyre!(
        "No API URL configured. Set api.base_url in ~/.config/ms-admin/config.yaml, \
         export {} or pass --api-url.\nSee config.example.yaml for the format.",
        API_URL_ENV
      ));
    }
    Url::parse(self.api.base_url.trim())
      .map_err(|e| eyre!("Invalid API URL {}: {}", self.api.base_url, e))
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.api.timeout_secs.max(1))
  }

  pub fn gc_time(&self) -> Duration {
    Duration::from_secs(self.cache.gc_secs)
  }

  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("MS Admin")
  }

  /// Absolute URL for an image path returned by the API
  pub fn image_url(&self, path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
      return path.to_string();
    }
    let root = self
      .api
      .image_url
      .as_deref()
      .unwrap_or(&self.api.base_url)
      .trim_end_matches('/');
    format!("{}/{}", root, path.trim_start_matches('/'))
  }
}
