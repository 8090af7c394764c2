//! Trendscout Core Library
//!
//! Keyword trend analysis backed by a generative model with optional
//! YouTube Data API enrichment, plus narration script generation for the
//! resulting content ideas.

pub mod analysis;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod metadata;
pub mod model;
pub mod prompts;
pub mod script;
pub mod session;
pub mod types;
pub mod video_id;

// Re-export commonly used items at crate root
pub use analysis::{AnalysisOutcome, TrendAnalyzer, VideoSource};
pub use config::{Config, METADATA_KEY_ENV, MODEL_KEY_ENV, MetadataConfig, ModelConfig, env_credential};
pub use error::{AnalysisError, ConfigError, GenerationError, ModelError, SessionError};
pub use format::{Locale, format_report_readable, format_views, parse_duration};
pub use metadata::{MetadataSource, YouTubeClient};
pub use model::{GeminiClient, ModelClient, ModelRequest, ModelResponse};
pub use script::{CharacterBand, ScriptOptions, ScriptWriter};
pub use session::Session;
pub use types::{
    CompetitionLevel, ContentIdea, DateRange, DurationBucket, GeneratedScript, ScriptFormat,
    ScriptStyle, SearchParameters, Source, TrendReport, TrendTopic, VideoRecord,
};
pub use video_id::extract_video_id;
