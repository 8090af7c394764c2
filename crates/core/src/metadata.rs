//! YouTube Data API v3 enrichment.
//!
//! Two sequential reads: `search.list` for relevance-ranked ids, then
//! `videos.list` for snippet, statistics and duration. Any failure is logged
//! and turned into an empty list, so callers cannot tell "service down" from
//! "nothing found".

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::MetadataConfig,
    error::MetadataError,
    format::{Locale, format_published_date, format_views, parse_duration},
    types::VideoRecord,
};

/// Authoritative video metadata lookup.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Up to `max_results` videos for `keyword`. Never fails: problems
    /// surface as an empty list.
    async fn search(&self, credential: &str, keyword: &str, max_results: u32) -> Vec<VideoRecord>;
}

#[derive(Clone, Debug)]
pub struct YouTubeClient {
    client: reqwest::Client,
    api_base: String,
    locale: Locale,
}

impl YouTubeClient {
    pub fn new(config: &MetadataConfig, locale: Locale) -> Self {
        Self::with_client(reqwest::Client::new(), config, locale)
    }

    pub fn with_client(client: reqwest::Client, config: &MetadataConfig, locale: Locale) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            locale,
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, MetadataError> {
        // The key travels in the query string; keep it out of error messages.
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MetadataError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| MetadataError::Http(e.without_url()))
    }

    pub async fn try_search(
        &self,
        credential: &str,
        keyword: &str,
        max_results: u32,
    ) -> Result<Vec<VideoRecord>, MetadataError> {
        let max_results = max_results.to_string();
        let search = self
            .get_json(
                &format!("{}/search", self.api_base),
                &[
                    ("part", "snippet"),
                    ("q", keyword),
                    ("type", "video"),
                    ("maxResults", &max_results),
                    ("key", credential),
                ],
            )
            .await?;

        let ids = search_ids(&search);
        debug!(count = ids.len(), "metadata search returned ids");
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let details = self
            .get_json(
                &format!("{}/videos", self.api_base),
                &[
                    ("part", "snippet,contentDetails,statistics"),
                    ("id", &joined),
                    ("key", credential),
                ],
            )
            .await?;

        Ok(merge_details(&ids, &details, self.locale))
    }
}

#[async_trait]
impl MetadataSource for YouTubeClient {
    async fn search(&self, credential: &str, keyword: &str, max_results: u32) -> Vec<VideoRecord> {
        match self.try_search(credential, keyword, max_results).await {
            Ok(videos) => videos,
            Err(e) => {
                warn!(error = %e, "video metadata unavailable, continuing without enrichment");
                Vec::new()
            }
        }
    }
}

/// Video ids from a `search.list` payload, in relevance order.
pub fn search_ids(search: &Value) -> Vec<String> {
    search["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"]["videoId"].as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Re-key `videos.list` items by id and emit them in `ids` order. Ids the
/// detail call did not return are dropped.
pub fn merge_details(ids: &[String], details: &Value, locale: Locale) -> Vec<VideoRecord> {
    let by_id: HashMap<&str, &Value> = details["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| Some((item["id"].as_str()?, item)))
                .collect()
        })
        .unwrap_or_default();

    ids.iter()
        .filter_map(|id| by_id.get(id.as_str()))
        .map(|item| normalize_video(item, locale))
        .collect()
}

/// Normalize one `videos.list` item into a display-ready record.
pub fn normalize_video(item: &Value, locale: Locale) -> VideoRecord {
    let id = item["id"].as_str().unwrap_or_default().to_string();
    let snippet = &item["snippet"];
    let text = |v: &Value| v.as_str().map(str::to_string);

    let views = match &item["statistics"]["viewCount"] {
        Value::String(count) => count.clone(),
        Value::Number(count) => count.to_string(),
        _ => "0".to_string(),
    };

    VideoRecord {
        title: text(&snippet["title"]).unwrap_or_else(|| locale.untitled().to_string()),
        channel: text(&snippet["channelTitle"]).unwrap_or_else(|| locale.unknown().to_string()),
        views: format_views(&views),
        published_date: text(&snippet["publishedAt"])
            .map(|ts| format_published_date(&ts, locale))
            .unwrap_or_else(|| "-".to_string()),
        url: format!("https://www.youtube.com/watch?v={}", id),
        duration: parse_duration(item["contentDetails"]["duration"].as_str().unwrap_or_default()),
        video_id: id,
    }
}
