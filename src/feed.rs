use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::error::FetchError;

/// Upper bound on records rendered per fetch.
pub const MAX_RECORDS: usize = 10;

const HEADER: &str = "Recent changes:";

/// Source of the latest content changes, rendered for display.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn fetch(&self) -> Result<String, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeRecord {
    /// Suppressed entries omit fields (`userhidden`); they render empty.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    query: FeedQuery,
}

#[derive(Debug, Deserialize)]
struct FeedQuery {
    #[serde(rename = "recentchanges")]
    recent_changes: Vec<ChangeRecord>,
}

/// Decode a MediaWiki `list=recentchanges` response body.
pub fn parse_records(body: &str) -> Result<Vec<ChangeRecord>, FetchError> {
    let response: FeedResponse = serde_json::from_str(body)?;
    Ok(response.query.recent_changes)
}

/// Header line followed by one line per record, in feed order.
pub fn render(records: &[ChangeRecord]) -> String {
    let mut out = format!("{}\n", HEADER);
    for record in records.iter().take(MAX_RECORDS) {
        out.push_str(&format!("- Title: {}, User: {}\n", record.title, record.user));
    }
    out
}

pub struct FeedClient {
    client: reqwest::Client,
    config: FeedConfig,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ChangeFeed for FeedClient {
    async fn fetch(&self) -> Result<String, FetchError> {
        debug!("Fetching recent changes: {}", self.config.url);

        let response = self
            .client
            .get(&self.config.url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await.map_err(FetchError::Body)?;
        let records = parse_records(&body)?;

        info!("Fetched {} recent change(s)", records.len());
        Ok(render(&records))
    }
}
