use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for JSON endpoints
pub struct JsonClient {
    client: Client,
}

impl JsonClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout)?;
        Ok(Self { client })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(self.client.get(url)).await?;
        Self::parse_body(response, url).await
    }

    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.post(url).json(body)).await?;
        Self::parse_body(response, url).await
    }

    fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await.context("Failed to send request")?;

        if !response.status().is_success() {
            bail!("Backend returned status: {}", response.status());
        }

        Ok(response)
    }

    async fn parse_body<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
        let text = response.text().await.context("Failed to read response body")?;

        serde_json::from_str(&text).with_context(|| {
            format!(
                "Failed to parse JSON from {}. First 200 chars: {}",
                url,
                text.chars().take(200).collect::<String>()
            )
        })
    }
}
