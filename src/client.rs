use crate::error::Result;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client. Every source is fetched through this, sequentially,
/// with a fixed timeout and a browser user agent. No retries.
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    pub fn new() -> Result<Client> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Client { http })
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetch {}", url);
        Ok(self.http.get(url).send().await?.text().await?)
    }

    pub async fn fetch_text_with_query(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String> {
        debug!("Fetch {} {:?}", url, query);
        Ok(self.http.get(url).query(query).send().await?.text().await?)
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.fetch_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
