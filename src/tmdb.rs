use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::models::{MovieDetail, MovieSummary, PageResponse};

/// Read-only view of the catalog. Results keep upstream order.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_popular(&self, page: u32) -> Result<Vec<MovieSummary>>;
    async fn search(&self, query: &str, page: u32) -> Result<Vec<MovieSummary>>;
    /// `Ok(None)` when the catalog has no item with this id.
    async fn get_detail(&self, id: i32) -> Result<Option<MovieDetail>>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: CatalogConfig,
}

impl TmdbClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let user_agent = format!("cinescope/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}{}?api_key={}",
            self.config.base_url,
            path,
            urlencoding::encode(&self.config.api_key)
        );
        for (k, v) in params {
            url.push('&');
            url.push_str(k);
            url.push('=');
            url.push_str(&urlencoding::encode(v));
        }
        url
    }

    /// GET and decode; a 404 yields `Ok(None)`, any other failure an error.
    /// `label` stands in for the URL in messages so the key is never logged.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        label: &str,
    ) -> Result<Option<T>> {
        debug!("GET {}", label);
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("{label}: request failed"))?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = res
            .text()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("{label}: reading body failed"))?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {}: {}", label, status, text));
        }
        let parsed: T = serde_json::from_str(&text)
            .with_context(|| format!("{label}: JSON parse failed"))?;
        Ok(Some(parsed))
    }

    async fn get_page(&self, url: &str, label: &str) -> Result<Vec<MovieSummary>> {
        let page: PageResponse = self
            .get_json(url, label)
            .await?
            .ok_or_else(|| anyhow!("{label}: endpoint not found"))?;
        Ok(page.results)
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn list_popular(&self, page: u32) -> Result<Vec<MovieSummary>> {
        let url = self.url("/movie/popular", &[("page", page.to_string())]);
        self.get_page(&url, &format!("popular page {page}")).await
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<MovieSummary>> {
        let url = self.url(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        );
        self.get_page(&url, &format!("search '{query}' page {page}"))
            .await
    }

    async fn get_detail(&self, id: i32) -> Result<Option<MovieDetail>> {
        let url = self.url(&format!("/movie/{id}"), &[]);
        self.get_json(&url, &format!("movie {id}")).await
    }
}
