use std::fmt;

use serde::{Deserialize, Serialize};

/// Time window the trend analysis should consider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl DateRange {
    pub fn prompt_text(&self) -> &'static str {
        match self {
            DateRange::Week => "this week",
            DateRange::Month => "this month",
            DateRange::Quarter => "the last 3 months",
            DateRange::Year => "this year",
        }
    }
}

/// Preferred video length, used to steer the prompt only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    Shorts,
    Short,
    #[default]
    Medium,
    Long,
    Extended,
    Feature,
}

impl DurationBucket {
    pub fn prompt_text(&self) -> &'static str {
        match self {
            DurationBucket::Shorts => "Shorts (under 1 minute)",
            DurationBucket::Short => "short videos (1-5 minutes)",
            DurationBucket::Medium => "medium videos (5-15 minutes)",
            DurationBucket::Long => "long videos (15-30 minutes)",
            DurationBucket::Extended => "extended videos (over 30 minutes)",
            DurationBucket::Feature => "feature-length videos (over 1 hour)",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchParameters {
    pub language: String,
    pub keyword: String,
    pub date_range: DateRange,
    pub video_duration: DurationBucket,
    pub model_credential: String,
    pub metadata_credential: Option<String>,
}

impl SearchParameters {
    /// Metadata credential, treating an empty string as absent.
    pub fn metadata_credential(&self) -> Option<&str> {
        self.metadata_credential
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionLevel {
    Low,
    #[default]
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl CompetitionLevel {
    /// Lenient parse of the model's label. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "low" => Some(CompetitionLevel::Low),
            "medium" => Some(CompetitionLevel::Medium),
            "high" => Some(CompetitionLevel::High),
            "very high" | "veryhigh" => Some(CompetitionLevel::VeryHigh),
            _ => None,
        }
    }
}

impl fmt::Display for CompetitionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CompetitionLevel::Low => "Low",
            CompetitionLevel::Medium => "Medium",
            CompetitionLevel::High => "High",
            CompetitionLevel::VeryHigh => "Very High",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendTopic {
    pub topic: String,
    pub score: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub title: String,
    pub channel: String,
    pub views: String,
    pub published_date: String,
    pub url: String,
    pub video_id: String,
    pub duration: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub title: String,
    pub hook: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub growth_score: u8,
    pub competition_level: CompetitionLevel,
    pub summary: String,
    pub trend_topics: Vec<TrendTopic>,
    pub related_videos: Vec<VideoRecord>,
    pub content_ideas: Vec<ContentIdea>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

/// Voice the narration script is written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStyle {
    FirstPerson,
    ThirdPerson,
    #[default]
    Narration,
    Host,
}

impl ScriptStyle {
    pub fn label(&self) -> &'static str {
        match self {
            ScriptStyle::FirstPerson => "first-person (vlog / creator)",
            ScriptStyle::ThirdPerson => "third-person (observer)",
            ScriptStyle::Narration => "narration (voice-over)",
            ScriptStyle::Host => "host (MC)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScriptStyle::FirstPerson => "Tell it as if the speaker lived through it personally.",
            ScriptStyle::ThirdPerson => "Deliver it objectively, focused on facts.",
            ScriptStyle::Narration => "Explain what is on screen and pass on information.",
            ScriptStyle::Host => "Speak energetically, as if running a show.",
        }
    }
}

/// Layout of the generated script text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptFormat {
    /// Five plain paragraphs separated by blank lines.
    #[default]
    Plain,
    /// Each of the five parts opens with a bracketed header.
    Headed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedScript {
    pub text: String,
}
