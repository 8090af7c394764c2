use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Value, json};
use trendscout_core::{
    AnalysisError, AnalysisOutcome, Config, GenerationError, ModelClient, ModelError,
    ModelRequest, ModelResponse, MetadataSource, ScriptOptions, ScriptWriter, SearchParameters,
    Session, SessionError, Source, TrendAnalyzer, VideoRecord, VideoSource,
};

enum Reply {
    Text(String),
    Delayed(Duration, String),
    Status(u16),
}

#[derive(Default)]
struct MockModel {
    replies: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, ModelRequest)>>,
    sources: Vec<Source>,
}

impl MockModel {
    fn replying(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> (String, ModelRequest) {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ModelClient for MockModel {
    async fn generate(
        &self,
        credential: &str,
        request: &ModelRequest,
    ) -> Result<ModelResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((credential.to_string(), request.clone()));

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Text(String::new()));
        let text = match reply {
            Reply::Text(text) => text,
            Reply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                text
            }
            Reply::Status(status) => {
                return Err(ModelError::Status {
                    status,
                    body: "API key not valid".into(),
                });
            }
        };
        Ok(ModelResponse {
            text,
            sources: self.sources.clone(),
        })
    }
}

struct MockMetadata {
    videos: Vec<VideoRecord>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockMetadata {
    fn returning(videos: Vec<VideoRecord>) -> Arc<Self> {
        Arc::new(Self {
            videos,
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for MockMetadata {
    async fn search(&self, _credential: &str, _keyword: &str, max_results: u32) -> Vec<VideoRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(max_results, 12);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.videos.clone()
    }
}

fn params(metadata_key: Option<&str>) -> SearchParameters {
    SearchParameters {
        language: "English".into(),
        keyword: "stock investing".into(),
        model_credential: "x".into(),
        metadata_credential: metadata_key.map(str::to_string),
        ..Default::default()
    }
}

fn model_document(videos: usize, ideas: usize) -> Value {
    json!({
        "growthScore": 78,
        "competitionLevel": "High",
        "summary": "Retail investing content keeps growing.",
        "trendTopics": (0..5)
            .map(|i| json!({ "topic": format!("topic {i}"), "score": 90 - i * 10 }))
            .collect::<Vec<_>>(),
        "relatedVideos": (0..videos)
            .map(|i| {
                // Alternate between usable links and broken ones.
                let url = if i % 2 == 0 {
                    format!("https://www.youtube.com/watch?v=abcdefghi{:02}", i)
                } else {
                    "#".to_string()
                };
                json!({
                    "title": format!("Video {i}"),
                    "channel": "Money Lab",
                    "views": "10K",
                    "publishedDate": "1 week ago",
                    "url": url,
                    "duration": "10:00"
                })
            })
            .collect::<Vec<_>>(),
        "contentIdeas": (0..ideas)
            .map(|i| json!({
                "title": format!("Idea {i}"),
                "hook": format!("Hook {i}"),
                "description": format!("Description {i}"),
                "type": "Video"
            }))
            .collect::<Vec<_>>()
    })
}

fn fenced(document: &Value) -> String {
    format!("Here is the analysis:\n```json\n{}\n```", document)
}

fn real_video(id: &str) -> VideoRecord {
    VideoRecord {
        title: format!("Real {id}"),
        channel: "Official".into(),
        views: "1.5K".into(),
        published_date: "3/7/2024".into(),
        url: format!("https://www.youtube.com/watch?v={id}"),
        video_id: id.into(),
        duration: "12:03".into(),
    }
}

fn analyzer(model: Arc<MockModel>, metadata: Arc<MockMetadata>) -> TrendAnalyzer {
    TrendAnalyzer::new(model, metadata, Config::default())
}

#[tokio::test]
async fn missing_credential_fails_before_any_call() {
    let model = MockModel::replying(vec![]);
    let metadata = MockMetadata::returning(vec![real_video("aaaaaaaaaaa")]);
    let session = Session::new();

    let mut p = params(Some("yt-key"));
    p.model_credential = "   ".into();
    let err = analyzer(model.clone(), metadata.clone())
        .analyze(&session, &p)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::MissingCredential));
    assert_eq!(model.calls(), 0);
    assert_eq!(metadata.calls(), 0);
    assert!(!session.has_credential());
}

#[tokio::test]
async fn end_to_end_without_metadata_key() {
    let model = MockModel::replying(vec![Reply::Text(fenced(&model_document(12, 8)))]);
    let metadata = MockMetadata::returning(vec![real_video("aaaaaaaaaaa")]);
    let session = Session::new();

    let report = analyzer(model.clone(), metadata.clone())
        .analyze(&session, &params(None))
        .await
        .unwrap();

    assert_eq!(report.content_ideas.len(), 8);
    assert_eq!(report.related_videos.len(), 12);
    assert!(report.related_videos.iter().all(|v| !v.url.is_empty() && v.url != "#"));
    assert_eq!(report.related_videos[0].video_id, "abcdefghi00");
    assert!(report.related_videos[1].url.starts_with("https://www.youtube.com/results?search_query="));
    assert_eq!(report.growth_score, 78);
    assert_eq!(report.trend_topics.len(), 5);

    assert_eq!(metadata.calls(), 0);
    let (credential, request) = model.last_request();
    assert_eq!(credential, "x");
    assert!(request.web_search);
    assert!(request.prompt.contains("find 12 real trending videos"));
    assert!(session.has_credential());
}

#[tokio::test]
async fn metadata_results_replace_model_videos() {
    let model = MockModel::replying(vec![Reply::Text(fenced(&model_document(3, 8)))]);
    let real = vec![real_video("aaaaaaaaaaa"), real_video("bbbbbbbbbbb")];
    let metadata = MockMetadata::returning(real.clone());
    let session = Session::new();

    let report = analyzer(model.clone(), metadata.clone())
        .analyze(&session, &params(Some("yt-key")))
        .await
        .unwrap();

    assert_eq!(report.related_videos, real);
    assert_eq!(metadata.calls(), 1);
    assert!(model.last_request().1.prompt.contains("\"relatedVideos\": [] (leave empty"));
}

#[tokio::test]
async fn empty_metadata_result_falls_back_to_model_videos() {
    let model = MockModel::replying(vec![Reply::Text(fenced(&model_document(4, 8)))]);
    let metadata = MockMetadata::returning(Vec::new());
    let session = Session::new();

    let report = analyzer(model, metadata.clone())
        .analyze(&session, &params(Some("yt-key")))
        .await
        .unwrap();

    assert_eq!(metadata.calls(), 1);
    assert_eq!(report.related_videos.len(), 4);
    assert_eq!(report.related_videos[0].title, "Video 0");
}

#[tokio::test(start_paused = true)]
async fn slow_metadata_degrades_to_model_videos() {
    let model = MockModel::replying(vec![Reply::Text(fenced(&model_document(2, 8)))]);
    let metadata = Arc::new(MockMetadata {
        videos: vec![real_video("aaaaaaaaaaa")],
        delay: Some(Duration::from_secs(600)),
        calls: AtomicUsize::new(0),
    });
    let session = Session::new();

    let report = analyzer(model, metadata)
        .analyze(&session, &params(Some("yt-key")))
        .await
        .unwrap();

    assert_eq!(report.related_videos.len(), 2);
    assert_eq!(report.related_videos[0].title, "Video 0");
}

#[tokio::test]
async fn prose_answer_is_a_parse_error() {
    let model = MockModel::replying(vec![Reply::Text(
        "Sorry, I could not analyze that keyword.".into(),
    )]);
    let session = Session::new();

    let err = analyzer(model, MockMetadata::returning(Vec::new()))
        .analyze(&session, &params(None))
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::ResponseParse { .. }));
}

#[tokio::test]
async fn model_failure_is_surfaced_with_key_hint() {
    let model = MockModel::replying(vec![Reply::Status(400)]);
    let session = Session::new();

    let err = analyzer(model.clone(), MockMetadata::returning(Vec::new()))
        .analyze(&session, &params(None))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::ModelRequest(ModelError::Status { status: 400, .. })
    ));
    assert!(err.is_credential_hint());
    assert_eq!(model.calls(), 1);
    // The attempt still captured the key for later script requests.
    assert!(session.has_credential());
}

#[tokio::test(start_paused = true)]
async fn model_timeout_is_a_request_error() {
    let model = MockModel::replying(vec![Reply::Delayed(
        Duration::from_secs(3_600),
        fenced(&model_document(1, 1)),
    )]);
    let session = Session::new();

    let err = analyzer(model, MockMetadata::returning(Vec::new()))
        .analyze(&session, &params(None))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::ModelRequest(ModelError::Timeout(_))
    ));
}

#[tokio::test]
async fn grounding_sources_are_attached() {
    let model = Arc::new(MockModel {
        replies: Mutex::new(VecDeque::from([Reply::Text(fenced(&model_document(0, 8)))])),
        sources: vec![Source {
            uri: "https://news.example/etf".into(),
            title: "ETF inflows".into(),
        }],
        ..Default::default()
    });
    let session = Session::new();

    let report = analyzer(model, MockMetadata::returning(Vec::new()))
        .analyze(&session, &params(None))
        .await
        .unwrap();

    assert_eq!(report.sources.len(), 1);
    assert_eq!(report.sources[0].title, "ETF inflows");
}

#[tokio::test(start_paused = true)]
async fn newer_analysis_supersedes_older_one() {
    let mut older = model_document(0, 8);
    older["summary"] = json!("old");
    let mut newer = model_document(0, 8);
    newer["summary"] = json!("new");

    let model = MockModel::replying(vec![
        Reply::Delayed(Duration::from_secs(5), fenced(&older)),
        Reply::Text(fenced(&newer)),
    ]);
    let analyzer = analyzer(model, MockMetadata::returning(Vec::new()));
    let session = Session::new();
    let p = params(None);

    let (first, second) = tokio::join!(analyzer.run(&session, &p), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        analyzer.run(&session, &p).await
    });

    assert!(matches!(first.unwrap(), AnalysisOutcome::Superseded));
    assert!(matches!(second.unwrap(), AnalysisOutcome::Current { .. }));
    assert_eq!(session.report().unwrap().summary, "new");
}

#[tokio::test(start_paused = true)]
async fn superseded_failure_is_dropped() {
    let model = MockModel::replying(vec![
        Reply::Delayed(Duration::from_secs(5), "not json at all".into()),
        Reply::Text(fenced(&model_document(0, 8))),
    ]);
    let analyzer = analyzer(model, MockMetadata::returning(Vec::new()));
    let session = Session::new();
    let p = params(None);

    let (first, second) = tokio::join!(analyzer.run(&session, &p), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        analyzer.run(&session, &p).await
    });

    assert!(matches!(first.unwrap(), AnalysisOutcome::Superseded));
    assert!(matches!(second.unwrap(), AnalysisOutcome::Current { .. }));
    assert!(session.report().is_some());
}

#[tokio::test]
async fn current_failure_is_still_reported() {
    let model = MockModel::replying(vec![Reply::Text("not json at all".into())]);
    let analyzer = analyzer(model, MockMetadata::returning(Vec::new()));
    let session = Session::new();

    let err = analyzer.run(&session, &params(None)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::ResponseParse { .. }));
}

#[tokio::test]
async fn outcome_names_the_video_source() {
    let document = fenced(&model_document(3, 8));
    let session = Session::new();

    let enriched = analyzer(
        MockModel::replying(vec![Reply::Text(document.clone())]),
        MockMetadata::returning(vec![real_video("aaaaaaaaaaa")]),
    );
    let AnalysisOutcome::Current { videos, .. } =
        enriched.run(&session, &params(Some("yt-key"))).await.unwrap()
    else {
        panic!("analysis should be current");
    };
    assert_eq!(videos, VideoSource::Metadata);

    // A metadata key alone does not make the list authoritative.
    let outage = analyzer(
        MockModel::replying(vec![Reply::Text(document)]),
        MockMetadata::returning(Vec::new()),
    );
    let AnalysisOutcome::Current { report, videos } =
        outage.run(&session, &params(Some("yt-key"))).await.unwrap()
    else {
        panic!("analysis should be current");
    };
    assert_eq!(videos, VideoSource::Model);
    assert_eq!(report.related_videos[0].title, "Video 0");
}

#[tokio::test]
async fn script_requires_prior_analysis() {
    let model = MockModel::replying(vec![Reply::Text("script".into())]);
    let writer = ScriptWriter::new(model.clone(), Config::default().model);
    let session = Session::new();

    let idea = trendscout_core::ContentIdea {
        title: "t".into(),
        hook: "h".into(),
        description: "d".into(),
        kind: "Video".into(),
    };
    let err = writer
        .generate(&session, &idea, &ScriptOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::MissingCredential));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn selected_idea_drives_script_generation() {
    let model = MockModel::replying(vec![
        Reply::Text(fenced(&model_document(0, 8))),
        Reply::Text("Did you know most investors lose money?".into()),
        Reply::Text(fenced(&model_document(0, 8))),
    ]);
    let analyzer = TrendAnalyzer::new(model.clone(), MockMetadata::returning(Vec::new()), Config::default());
    let writer = ScriptWriter::new(model.clone(), Config::default().model);
    let session = Session::new();

    let AnalysisOutcome::Current { report, .. } =
        analyzer.run(&session, &params(None)).await.unwrap()
    else {
        panic!("analysis should be current");
    };
    session.select_idea(3).unwrap();

    let options = ScriptOptions {
        target_length: 1500,
        ..Default::default()
    };
    let script = writer.generate_selected(&session, &options).await.unwrap();
    assert_eq!(script.text, "Did you know most investors lose money?");

    let (credential, request) = model.last_request();
    assert_eq!(credential, "x");
    assert!(!request.web_search);
    assert!(request.prompt.contains(&format!("Title: {}", report.content_ideas[3].title)));
    assert!(request.prompt.contains("strict range: 1350 ~ 1650"));

    analyzer.run(&session, &params(None)).await.unwrap();
    assert_eq!(session.selected_index(), None);
    let err = writer.generate_selected(&session, &options).await.unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Selection(SessionError::NothingSelected)
    ));
}

#[tokio::test]
async fn empty_script_becomes_placeholder() {
    let model = MockModel::replying(vec![Reply::Text("   ".into())]);
    let writer = ScriptWriter::new(model, Config::default().model);
    let session = Session::new();
    session.capture_credential("x");

    let idea = trendscout_core::ContentIdea {
        title: "t".into(),
        hook: "h".into(),
        description: "d".into(),
        kind: "Video".into(),
    };
    let script = writer
        .generate(&session, &idea, &ScriptOptions::default())
        .await
        .unwrap();
    assert_eq!(script.text, "Script generation failed.");
}
