use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::TrendReport;

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern is valid")
});

/// Display conventions for placeholder text and dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locale {
    English,
    Korean,
}

impl Locale {
    /// Picks a locale from a free-text language name such as "Korean (한국어)".
    pub fn from_language(language: &str) -> Self {
        let lower = language.to_lowercase();
        if lower.contains("korean") || language.contains("한국어") || lower == "ko" {
            Locale::Korean
        } else {
            Locale::English
        }
    }

    pub fn untitled(&self) -> &'static str {
        match self {
            Locale::English => "(untitled)",
            Locale::Korean => "(제목 없음)",
        }
    }

    pub fn unknown(&self) -> &'static str {
        match self {
            Locale::English => "Unknown",
            Locale::Korean => "정보 없음",
        }
    }

    pub fn summary_fallback(&self) -> &'static str {
        match self {
            Locale::English => "Analysis complete.",
            Locale::Korean => "분석 완료",
        }
    }

    pub fn script_failed(&self) -> &'static str {
        match self {
            Locale::English => "Script generation failed.",
            Locale::Korean => "대본 생성에 실패했습니다.",
        }
    }

    fn date_pattern(&self) -> &'static str {
        match self {
            Locale::English => "%-m/%-d/%Y",
            Locale::Korean => "%Y. %-m. %-d.",
        }
    }
}

/// Format an ISO 8601 duration as `H:MM:SS` or `M:SS`.
///
/// `PT1H2M10S` becomes `1:02:10`, `PT5M` becomes `5:00`. Anything without a
/// `PT` designator yields `0:00`.
pub fn parse_duration(iso: &str) -> String {
    let Some(caps) = ISO_DURATION.captures(iso) else {
        return "0:00".to_string();
    };

    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let total = part(1) * 3600 + part(2) * 60 + part(3);
    format_seconds(total)
}

/// Format a second count as `H:MM:SS` or `M:SS`.
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Compact a raw view count: `1500` → `1.5K`, `2500000` → `2.5M`.
/// Non-numeric input comes back unchanged.
pub fn format_views(view_count: &str) -> String {
    let Ok(num) = view_count.trim().parse::<i64>() else {
        return view_count.to_string();
    };

    // Counts from 999,950 up would print as "1000.0K".
    if num >= 999_950 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Render an RFC 3339 publish timestamp as a locale date string (UTC date).
/// Unparseable input is returned unchanged.
pub fn format_published_date(timestamp: &str, locale: Locale) -> String {
    match DateTime::parse_from_rfc3339(timestamp.trim()) {
        Ok(dt) => dt
            .naive_utc()
            .date()
            .format(locale.date_pattern())
            .to_string(),
        Err(_) => timestamp.to_string(),
    }
}

fn score_bar(score: u8) -> String {
    let filled = (score as usize).min(100) / 10;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Format a trend report as human-readable markdown
pub fn format_report_readable(keyword: &str, report: &TrendReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Trends for \"{}\"\n\n", keyword));
    output.push_str(&format!(
        "**Growth score:** {}/100 | **Competition:** {}\n\n",
        report.growth_score, report.competition_level
    ));

    output.push_str("## Summary\n\n");
    output.push_str(&report.summary);
    output.push_str("\n\n");

    if !report.trend_topics.is_empty() {
        output.push_str("## Rising topics\n\n");
        for topic in &report.trend_topics {
            output.push_str(&format!(
                "{} {:>3}  {}\n",
                score_bar(topic.score),
                topic.score,
                topic.topic
            ));
        }
        output.push('\n');
    }

    if !report.related_videos.is_empty() {
        output.push_str("## Related videos\n\n");
        for video in &report.related_videos {
            output.push_str(&format!(
                "• {} · {} [{} views, {}, {}]\n  {}\n",
                video.title,
                video.channel,
                video.views,
                video.duration,
                video.published_date,
                video.url
            ));
        }
        output.push('\n');
    }

    output.push_str("## Content ideas\n\n");
    for (i, idea) in report.content_ideas.iter().enumerate() {
        output.push_str(&format!("{}. **{}** ({})\n", i + 1, idea.title, idea.kind));
        output.push_str(&format!("   Hook: {}\n", idea.hook));
        output.push_str(&format!("   {}\n\n", idea.description));
    }

    if !report.sources.is_empty() {
        output.push_str("## Sources\n\n");
        for source in &report.sources {
            output.push_str(&format!("• {} <{}>\n", source.title, source.uri));
        }
        output.push('\n');
    }

    output
}
