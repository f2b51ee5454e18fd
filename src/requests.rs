use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, header::LOCATION, redirect::Policy};

use crate::{
    config::CrawlConfig,
    ratelimit::RateLimiter,
    redirect_resolver::{ArchiveMirror, Probe},
};

pub struct RequestClient {
    client: Client,
    rate_limiter: RateLimiter,
    archive_base_url: String,
}

impl RequestClient {
    pub fn new(config: &CrawlConfig) -> anyhow::Result<Self> {
        // Redirects are walked by the resolver, one probe per hop.
        let client = ClientBuilder::new().redirect(Policy::none()).build()?;
        let rate_limiter = RateLimiter::new(config.requests_per_second);
        Ok(Self {
            client,
            rate_limiter,
            archive_base_url: config.archive_base_url.clone(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.archive_base_url, path)
    }

    pub async fn head_url_response(&self, path: &str) -> anyhow::Result<Response> {
        // Wait (non-blocking) until we're allowed to make a request according
        // to our self-imposed rate-limiting policy.
        self.rate_limiter.wait_until_ready().await;

        let response = self.client.head(self.url_for(path)).send().await?;
        Ok(response)
    }

    pub async fn fetch_url_response(&self, path: &str) -> anyhow::Result<Response> {
        self.rate_limiter.wait_until_ready().await;

        let response = self.client.get(self.url_for(path)).send().await?;
        Ok(response)
    }

    pub async fn fetch_url_body(&self, path: &str) -> anyhow::Result<String> {
        let response = self.fetch_url_response(path).await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("GET {} returned {}", path, status);
        }
        let body = response.text().await?;
        Ok(body)
    }
}

#[async_trait]
impl ArchiveMirror for RequestClient {
    async fn probe(&self, path: &str) -> anyhow::Result<Probe> {
        let response = self.head_url_response(path).await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Ok(Probe {
            status: response.status(),
            location,
        })
    }

    async fn fetch(&self, path: &str) -> anyhow::Result<String> {
        self.fetch_url_body(path).await
    }
}
