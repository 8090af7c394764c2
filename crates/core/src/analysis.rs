use std::{sync::Arc, time::Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::AnalysisError,
    extract::{ParsedResponse, parse_json_object},
    format::Locale,
    metadata::MetadataSource,
    model::{ModelClient, ModelRequest, generate_with_timeout},
    prompts,
    session::Session,
    types::{
        CompetitionLevel, ContentIdea, SearchParameters, Source, TrendReport, TrendTopic, VideoRecord,
    },
    video_id::extract_video_id,
};

const DEFAULT_GROWTH_SCORE: u8 = 50;
const DEFAULT_IDEA_KIND: &str = "Video";

/// Where a report's related videos came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoSource {
    /// The metadata service answered with at least one video.
    Metadata,
    /// The model's own suggestions, normalized.
    Model,
}

/// Result of [`TrendAnalyzer::run`].
#[derive(Debug)]
pub enum AnalysisOutcome {
    Current {
        report: Arc<TrendReport>,
        videos: VideoSource,
    },
    /// A newer analysis started while this one was in flight; its result,
    /// success or failure, was dropped.
    Superseded,
}

/// Runs the keyword → trend report stage.
pub struct TrendAnalyzer {
    model: Arc<dyn ModelClient>,
    metadata: Arc<dyn MetadataSource>,
    config: Config,
}

impl TrendAnalyzer {
    pub fn new(model: Arc<dyn ModelClient>, metadata: Arc<dyn MetadataSource>, config: Config) -> Self {
        Self {
            model,
            metadata,
            config,
        }
    }

    /// Analyze and publish into `session`, unless a newer analysis overtook this one.
    pub async fn run(
        &self,
        session: &Session,
        params: &SearchParameters,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let ticket = session.begin_analysis();
        let (report, videos) = match self.analyze_with_source(session, params).await {
            Ok(analysis) => analysis,
            Err(e) if !session.is_current(ticket) => {
                debug!(keyword = %params.keyword, error = %e, "analysis superseded, dropping error");
                return Ok(AnalysisOutcome::Superseded);
            }
            Err(e) => return Err(e),
        };

        match session.publish_report(ticket, report) {
            Some(report) => Ok(AnalysisOutcome::Current { report, videos }),
            None => {
                debug!(keyword = %params.keyword, "analysis superseded, dropping result");
                Ok(AnalysisOutcome::Superseded)
            }
        }
    }

    pub async fn analyze(
        &self,
        session: &Session,
        params: &SearchParameters,
    ) -> Result<TrendReport, AnalysisError> {
        self.analyze_with_source(session, params)
            .await
            .map(|(report, _)| report)
    }

    async fn analyze_with_source(
        &self,
        session: &Session,
        params: &SearchParameters,
    ) -> Result<(TrendReport, VideoSource), AnalysisError> {
        let credential = params.model_credential.trim();
        if credential.is_empty() {
            return Err(AnalysisError::MissingCredential);
        }
        session.capture_credential(credential);

        let started = Instant::now();
        let metadata_credential = params.metadata_credential();
        let ask_for_videos = metadata_credential.is_none();

        let request = ModelRequest {
            prompt: prompts::trend_analysis(
                params,
                ask_for_videos,
                self.config.ideas_count,
                self.config.topics_count,
            ),
            temperature: self.config.model.analysis_temperature,
            web_search: true,
        };

        info!(
            keyword = %params.keyword,
            language = %params.language,
            enrichment = !ask_for_videos,
            "starting trend analysis"
        );

        let model_call = generate_with_timeout(
            self.model.as_ref(),
            credential,
            &request,
            self.config.model.timeout(),
        );
        let metadata_call = async {
            let Some(key) = metadata_credential else {
                return Vec::new();
            };
            let limit = self.config.metadata.timeout();
            let search =
                self.metadata
                    .search(key, &params.keyword, self.config.metadata.max_results);
            match tokio::time::timeout(limit, search).await {
                Ok(videos) => videos,
                Err(_) => {
                    warn!(?limit, "video metadata timed out, continuing without enrichment");
                    Vec::new()
                }
            }
        };

        let (response, real_videos) = tokio::join!(model_call, metadata_call);
        let response = response.map_err(AnalysisError::ModelRequest)?;

        let document = match parse_json_object(&response.text) {
            ParsedResponse::Parsed(document) => document,
            ParsedResponse::ParseFailed(reason) => {
                warn!(%reason, "model answer was not usable JSON");
                return Err(AnalysisError::ResponseParse { reason });
            }
        };

        let locale = Locale::from_language(&params.language);
        let (related_videos, video_source) =
            if metadata_credential.is_some() && !real_videos.is_empty() {
                (real_videos, VideoSource::Metadata)
            } else {
                (
                    normalize_model_videos(&document["relatedVideos"], &params.keyword, locale),
                    VideoSource::Model,
                )
            };

        let report = assemble_report(&document, related_videos, response.sources, locale);
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            videos = report.related_videos.len(),
            ideas = report.content_ideas.len(),
            sources = report.sources.len(),
            video_source = ?video_source,
            "trend analysis complete"
        );
        Ok((report, video_source))
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match &value[key] {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Score in 0..=100; numbers and numeric strings are accepted.
fn score_field(value: &Value, key: &str) -> Option<u8> {
    let raw = match &value[key] {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    raw.is_finite().then(|| raw.round().clamp(0.0, 100.0) as u8)
}

fn results_page_url(query: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(query)
    )
}

/// Normalize the model's own video list.
///
/// Every record ends up with a link: either the model's link when it carries a
/// readable video id, or a search-results page for the title (or keyword).
pub fn normalize_model_videos(videos: &Value, keyword: &str, locale: Locale) -> Vec<VideoRecord> {
    let Some(items) = videos.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| {
            let title = text_field(item, "title");
            let url = text_field(item, "url").map(|url| {
                if url.starts_with("http") {
                    url
                } else {
                    format!("https://{}", url)
                }
            });
            let video_id = url.as_deref().map(extract_video_id).unwrap_or_default();
            let url = match url {
                Some(url) if !video_id.is_empty() => url,
                _ => results_page_url(title.as_deref().unwrap_or(keyword)),
            };

            VideoRecord {
                title: title.unwrap_or_else(|| locale.untitled().to_string()),
                channel: text_field(item, "channel").unwrap_or_else(|| locale.unknown().to_string()),
                views: text_field(item, "views").unwrap_or_else(|| "-".to_string()),
                published_date: text_field(item, "publishedDate").unwrap_or_else(|| "-".to_string()),
                url,
                video_id,
                duration: text_field(item, "duration").unwrap_or_else(|| "0:00".to_string()),
            }
        })
        .collect()
}

fn trend_topics(value: &Value) -> Vec<TrendTopic> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(TrendTopic {
                        topic: text_field(item, "topic")?,
                        score: score_field(item, "score").unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn content_ideas(value: &Value) -> Vec<ContentIdea> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(ContentIdea {
                        title: text_field(item, "title")?,
                        hook: text_field(item, "hook").unwrap_or_default(),
                        description: text_field(item, "description").unwrap_or_default(),
                        kind: text_field(item, "type")
                            .unwrap_or_else(|| DEFAULT_IDEA_KIND.to_string()),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Build the report from a parsed model document, defaulting whatever is
/// missing or malformed.
pub fn assemble_report(
    document: &Value,
    related_videos: Vec<VideoRecord>,
    sources: Vec<Source>,
    locale: Locale,
) -> TrendReport {
    TrendReport {
        growth_score: score_field(document, "growthScore").unwrap_or(DEFAULT_GROWTH_SCORE),
        competition_level: document["competitionLevel"]
            .as_str()
            .and_then(CompetitionLevel::parse)
            .unwrap_or_default(),
        summary: text_field(document, "summary")
            .unwrap_or_else(|| locale.summary_fallback().to_string()),
        trend_topics: trend_topics(&document["trendTopics"]),
        related_videos,
        content_ideas: content_ideas(&document["contentIdeas"]),
        sources,
    }
}
