use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Connection settings for the catalog API, resolved once at startup and
/// handed to [`crate::tmdb::TmdbClient::new`].
#[derive(Clone)]
pub struct CatalogConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
}

impl CatalogConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with_key(None)
    }

    /// Like [`CatalogConfig::from_env`], but an explicit key wins over
    /// `TMDB_API_KEY`.
    pub fn from_env_with_key(api_key: Option<String>) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?,
        };
        let mut config = Self::new(api_key);
        if let Some(base) = non_empty_var("TMDB_BASE_URL") {
            config = config.with_base_url(base);
        }
        if let Some(images) = non_empty_var("TMDB_IMAGE_BASE_URL") {
            config = config.with_image_base_url(images);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_slash(base_url.into());
        self
    }

    pub fn with_image_base_url(mut self, image_base_url: impl Into<String>) -> Self {
        self.image_base_url = trim_slash(image_base_url.into());
        self
    }

    /// Full image URL for a path returned by the API. Paths already start
    /// with `/`.
    pub fn image_url(&self, path: Option<&str>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.image_base_url, p))
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("image_base_url", &self.image_base_url)
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
