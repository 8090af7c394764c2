use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Width of a canonical YouTube video id.
pub const VIDEO_ID_LEN: usize = 11;

static LOOSE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|shorts/|watch\?v=|&v=)([^#&?/]*).*")
        .expect("video id pattern is valid")
});

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn is_short_host(host: &str) -> bool {
    host == "youtu.be" || host.ends_with(".youtu.be")
}

fn is_canonical_host(host: &str) -> bool {
    host == "youtube.com" || host.ends_with(".youtube.com")
}

enum Structured {
    Found(String),
    /// A YouTube URL the strict rules could not read; worth a loose scan.
    YouTubeUnmatched,
    /// Well-formed URL pointing somewhere else.
    Foreign,
    Unparseable,
}

fn parse_structured(raw: &str) -> Structured {
    let with_scheme = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let Ok(url) = Url::parse(&with_scheme) else {
        return Structured::Unparseable;
    };
    let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
        return Structured::Unparseable;
    };

    let candidate = if is_short_host(&host) {
        url.path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string)
    } else if is_canonical_host(&host) {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else {
        return Structured::Foreign;
    };

    match candidate {
        Some(id) if is_video_id(&id) => Structured::Found(id),
        _ => Structured::YouTubeUnmatched,
    }
}

fn scan_loose(raw: &str) -> Option<String> {
    let caps = LOOSE_ID.captures(raw)?;
    let id = caps.get(2)?.as_str();
    is_video_id(id).then(|| id.to_string())
}

/// Extract the 11-character video id from a YouTube URL.
///
/// Short links (`youtu.be/<id>`) and watch links (`youtube.com/watch?v=<id>`)
/// are read structurally. Embed, legacy and otherwise mangled links fall back
/// to a loose pattern scan. Returns an empty string when nothing usable is
/// found; well-formed links to other hosts are never scanned.
pub fn extract_video_id(url: &str) -> String {
    let raw = url.trim();
    if raw.is_empty() {
        return String::new();
    }

    match parse_structured(raw) {
        Structured::Found(id) => id,
        Structured::Foreign => String::new(),
        Structured::YouTubeUnmatched | Structured::Unparseable => {
            scan_loose(raw).unwrap_or_default()
        }
    }
}
