use crate::{
    script::CharacterBand,
    types::{ContentIdea, ScriptFormat, ScriptStyle, SearchParameters},
};

pub const RELATED_VIDEOS_TARGET: usize = 12;

/// Prompt for the trend analysis call.
///
/// With `ask_for_videos` the model is told to find real videos via search;
/// otherwise it must leave `relatedVideos` empty for the metadata service.
pub fn trend_analysis(
    params: &SearchParameters,
    ask_for_videos: bool,
    ideas_count: usize,
    topics_count: usize,
) -> String {
    let video_instruction = if ask_for_videos {
        format!(
            r#""relatedVideos": [
        {{
          "title": string,
          "channel": string,
          "views": string,
          "publishedDate": string,
          "url": string (must be a valid https://www.youtube.com/watch?v= link found via search),
          "duration": string
        }}
      ] (find {count} real trending videos via Google Search),"#,
            count = RELATED_VIDEOS_TARGET
        )
    } else {
        r#""relatedVideos": [] (leave empty, it will be filled from an external API),"#.to_string()
    };

    let search_line = if ask_for_videos {
        "Use Google Search to find REAL, existing YouTube videos."
    } else {
        ""
    };

    format!(
        r#"You are a YouTube trend expert. Analyze the current trends for the keyword "{keyword}" in the language "{lang}" considering the timeframe "{range}", focusing on {duration}.

{search_line}

Return the result strictly as a JSON object (inside a markdown code block) with the following structure.
IMPORTANT: Write the "summary" and every "contentIdeas" entry in {lang}.

{{
  "growthScore": number (0-100),
  "competitionLevel": string ("Low", "Medium", "High", "Very High"),
  "summary": string (a concise paragraph summarizing the trend in {lang}),
  "trendTopics": [ {{"topic": string, "score": number (0-100)}} ] (top {topics} related sub-topics),
  {video_instruction}
  "contentIdeas": [
    {{"title": string, "hook": string, "description": string, "type": string}}
  ] (generate exactly {ideas} viral content ideas in {lang} based on the analysis)
}}

Output ONLY the JSON object, nothing else."#,
        keyword = params.keyword,
        lang = params.language,
        range = params.date_range.prompt_text(),
        duration = params.video_duration.prompt_text(),
        search_line = search_line,
        topics = topics_count,
        video_instruction = video_instruction,
        ideas = ideas_count,
    )
}

const PARTS: [(&str, &str); 5] = [
    (
        "Hook",
        "Open with a shocking fact, a provocative question or a counter-intuitive statement. Hint at a twist or secret revealed later to open a curiosity gap.",
    ),
    (
        "Setup",
        "Introduce the topic and its context. Why does it matter right now?",
    ),
    (
        "Development",
        "The core content: detailed explanation, storytelling or examples. This is the longest part and carries most of the character count.",
    ),
    (
        "Twist",
        "A surprising insight, a hidden pro tip or a reversal of common belief: \"Most people think X, but actually Y.\"",
    ),
    (
        "Resolution",
        "Summarize the key points and close with a clear call to action (subscribe, like, check the description).",
    ),
];

/// Prompt for the narration script call.
pub fn narration_script(
    idea: &ContentIdea,
    language: &str,
    band: CharacterBand,
    style: ScriptStyle,
    format: ScriptFormat,
) -> String {
    let mut structure = String::new();
    for (i, (name, instruction)) in PARTS.iter().enumerate() {
        structure.push_str(&format!("{}. **{}**: {}\n", i + 1, name, instruction));
    }

    let layout_rules = match format {
        ScriptFormat::Plain => {
            "- Organize the script into 5 paragraphs separated by blank lines.\n\
             - DO NOT use headers like \"### Hook\" or \"Part 1\".\n\
             - Just pure paragraphs of text to be read aloud."
                .to_string()
        }
        ScriptFormat::Headed => {
            let headers = PARTS
                .iter()
                .map(|(name, _)| format!("[{}]", name))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "- Start each of the 5 parts with its bracketed header on its own line: {}.\n\
                 - Apart from those headers, output only text to be read aloud.",
                headers
            )
        }
    };

    format!(
        r#"You are a professional YouTube script writer.
Write a pure spoken script (narration or dialogue ONLY) in {lang}.

### Input
- Title: {title}
- Hook idea: {hook}
- Concept: {description}
- Style: {style} ({style_desc})
- Target length: {target} characters (strict range: {min} ~ {max})

### Structure (5 parts)
{structure}
### Formatting rules (strict)
- Output ONLY the {lang} spoken text.
{layout_rules}
- DO NOT use scene cues like [Visual], (Audio), <Cut to>.
- DO NOT add explanations about the script.
- Keep the total length within {min} ~ {max} characters."#,
        lang = language,
        title = idea.title,
        hook = idea.hook,
        description = idea.description,
        style = style.label(),
        style_desc = style.description(),
        target = band.target,
        min = band.min,
        max = band.max,
        structure = structure,
        layout_rules = layout_rules,
    )
}
