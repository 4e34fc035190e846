use reqwest::Client;

use crate::models::MarketEvent;

#[derive(Clone)]
pub struct NewsFeedClient {
    http: Client,
    url: String,
}

impl NewsFeedClient {
    pub fn new(url: String) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Fetches the latest items. The feed answers with a JSON array of events.
    pub async fn latest(&self) -> Result<Vec<MarketEvent>, String> {
        if !self.is_configured() {
            return Err("FEED_URL is missing in .env".to_string());
        }

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("news feed request failed: {status} {body}"));
        }

        res.json::<Vec<MarketEvent>>().await.map_err(|e| e.to_string())
    }
}
