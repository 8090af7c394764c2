use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use trendscout_core::{
    AnalysisOutcome, Config, DateRange, DurationBucket, GeminiClient, Locale, METADATA_KEY_ENV,
    MODEL_KEY_ENV, ScriptFormat, ScriptOptions, ScriptStyle, ScriptWriter, SearchParameters,
    Session, TrendAnalyzer, TrendReport, VideoSource, YouTubeClient, env_credential,
    format_report_readable,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for DateRange (needed for clap ValueEnum)
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliDateRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl From<CliDateRange> for DateRange {
    fn from(cli: CliDateRange) -> Self {
        match cli {
            CliDateRange::Week => DateRange::Week,
            CliDateRange::Month => DateRange::Month,
            CliDateRange::Quarter => DateRange::Quarter,
            CliDateRange::Year => DateRange::Year,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum CliDuration {
    Shorts,
    Short,
    #[default]
    Medium,
    Long,
    Extended,
    Feature,
}

impl From<CliDuration> for DurationBucket {
    fn from(cli: CliDuration) -> Self {
        match cli {
            CliDuration::Shorts => DurationBucket::Shorts,
            CliDuration::Short => DurationBucket::Short,
            CliDuration::Medium => DurationBucket::Medium,
            CliDuration::Long => DurationBucket::Long,
            CliDuration::Extended => DurationBucket::Extended,
            CliDuration::Feature => DurationBucket::Feature,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum CliStyle {
    FirstPerson,
    ThirdPerson,
    #[default]
    Narration,
    Host,
}

impl From<CliStyle> for ScriptStyle {
    fn from(cli: CliStyle) -> Self {
        match cli {
            CliStyle::FirstPerson => ScriptStyle::FirstPerson,
            CliStyle::ThirdPerson => ScriptStyle::ThirdPerson,
            CliStyle::Narration => ScriptStyle::Narration,
            CliStyle::Host => ScriptStyle::Host,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum CliFormat {
    #[default]
    Plain,
    Headed,
}

impl From<CliFormat> for ScriptFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Plain => ScriptFormat::Plain,
            CliFormat::Headed => ScriptFormat::Headed,
        }
    }
}

#[derive(Parser)]
#[command(name = "trendscout")]
#[command(
    about = "Analyze YouTube trends for a keyword and turn content ideas into narration scripts"
)]
struct Cli {
    /// Keyword or topic to analyze
    #[arg(short, long)]
    keyword: String,

    /// Output language (e.g., "English", "Korean")
    #[arg(short, long, default_value = "English")]
    language: String,

    /// Time window for the trend analysis
    #[arg(short, long, default_value = "month")]
    date_range: CliDateRange,

    /// Preferred video length
    #[arg(long, default_value = "medium")]
    duration: CliDuration,

    /// Gemini API key. Falls back to GEMINI_API_KEY.
    #[arg(long)]
    gemini_key: Option<String>,

    /// YouTube Data API key. Falls back to YOUTUBE_API_KEY; without one the
    /// model suggests the related videos itself.
    #[arg(long)]
    youtube_key: Option<String>,

    /// Print the report as JSON instead of readable text
    #[arg(long)]
    json: bool,

    /// Generate a script for this content idea (1-based) right away
    #[arg(short, long)]
    idea: Option<usize>,

    /// Target script length in characters
    #[arg(long, default_value_t = 1500)]
    length: u32,

    /// Script voice
    #[arg(short, long, default_value = "narration")]
    style: CliStyle,

    /// Script layout
    #[arg(short, long, default_value = "plain")]
    format: CliFormat,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "trendscout=debug,trendscout_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn fail(message: impl std::fmt::Display, hint: Option<&str>) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), message);
    if let Some(hint) = hint {
        eprintln!("{} {}", style("Hint:").yellow().bold(), hint);
    }
    std::process::exit(1);
}

async fn write_script(
    writer: &ScriptWriter,
    session: &Session,
    report: &TrendReport,
    number: usize,
    options: &ScriptOptions,
) -> Result<()> {
    let range = || format!("pick an idea between 1 and {}", report.content_ideas.len());
    let index = number.checked_sub(1).with_context(range)?;
    session.select_idea(index).with_context(range)?;
    let idea = session.selected_idea()?;

    let spinner = create_spinner(&format!(
        "Writing {} script for \"{}\"...",
        options.style.label(),
        idea.title
    ));
    let started = Instant::now();
    let script = writer.generate_selected(session, options).await?;
    spinner.finish_with_message(format!(
        "{} Script ready {}",
        style("✓").green().bold(),
        style(format!(
            "({} chars, {})",
            script.text.chars().count(),
            format_duration(started.elapsed())
        ))
        .dim()
    ));

    println!("{}", style("─".repeat(60)).dim());
    println!("{}", script.text);
    println!("{}", style("─".repeat(60)).dim());
    Ok(())
}

/// Ask for idea numbers until an empty line.
async fn prompt_for_ideas(
    writer: &ScriptWriter,
    session: &Session,
    report: &TrendReport,
    options: &ScriptOptions,
) -> Result<()> {
    let term = Term::stdout();
    loop {
        term.write_str(&format!(
            "\n{} ",
            style(format!(
                "Idea number for a script (1-{}, empty to quit):",
                report.content_ideas.len()
            ))
            .cyan()
        ))?;
        let line = term.read_line()?;
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let Ok(number) = line.parse::<usize>() else {
            eprintln!("{} not a number: {}", style("!").yellow().bold(), line);
            continue;
        };
        if let Err(e) = write_script(writer, session, report, number, options).await {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(e, None),
    };

    let params = SearchParameters {
        language: cli.language.clone(),
        keyword: cli.keyword.clone(),
        date_range: cli.date_range.into(),
        video_duration: cli.duration.into(),
        model_credential: cli
            .gemini_key
            .or_else(|| env_credential(MODEL_KEY_ENV))
            .unwrap_or_default(),
        metadata_credential: cli.youtube_key.or_else(|| env_credential(METADATA_KEY_ENV)),
    };
    let locale = Locale::from_language(&params.language);

    let model = Arc::new(GeminiClient::new(&config.model));
    let metadata = Arc::new(YouTubeClient::new(&config.metadata, locale));
    let writer = ScriptWriter::new(model.clone(), config.model.clone());
    let analyzer = TrendAnalyzer::new(model, metadata, config);
    let session = Session::new();
    tracing::debug!(session = %session.session_id(), "session started");

    if !cli.json {
        println!(
            "\n{}  {}\n",
            style("trendscout").cyan().bold(),
            style("Trend Analyzer").dim()
        );
    }

    let spinner = create_spinner(&format!(
        "Analyzing \"{}\" ({}, {})...",
        params.keyword,
        params.date_range.prompt_text(),
        params.language
    ));
    let started = Instant::now();
    let (report, videos) = match analyzer.run(&session, &params).await {
        Ok(AnalysisOutcome::Current { report, videos }) => (report, videos),
        Ok(AnalysisOutcome::Superseded) => {
            spinner.finish_and_clear();
            return Ok(());
        }
        Err(e) => {
            spinner.finish_and_clear();
            let hint = e.is_credential_hint().then_some(
                "check your Gemini API key (--gemini-key or GEMINI_API_KEY)",
            );
            fail(e, hint);
        }
    };
    let source = match videos {
        VideoSource::Metadata => "YouTube Data API",
        VideoSource::Model => "model suggestions",
    };
    spinner.finish_with_message(format!(
        "{} Analysis complete {}",
        style("✓").green().bold(),
        style(format!(
            "({} videos from {}, {})",
            report.related_videos.len(),
            source,
            format_duration(started.elapsed())
        ))
        .dim()
    ));

    if cli.json {
        println!("{}", serde_json::to_string_pretty(report.as_ref())?);
    } else {
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", format_report_readable(&params.keyword, &report));
    }

    if report.content_ideas.is_empty() {
        return Ok(());
    }

    let options = ScriptOptions {
        target_length: cli.length,
        style: cli.style.into(),
        format: cli.format.into(),
        language: params.language.clone(),
    };

    match cli.idea {
        Some(number) => {
            if let Err(e) = write_script(&writer, &session, &report, number, &options).await {
                fail(format!("{:#}", e), None);
            }
        }
        None if !cli.json && Term::stdout().is_term() => {
            prompt_for_ideas(&writer, &session, &report, &options).await?;
        }
        None => {}
    }

    Ok(())
}
