use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    config::ModelConfig,
    error::GenerationError,
    format::Locale,
    model::{ModelClient, ModelRequest, generate_with_timeout},
    prompts,
    session::Session,
    types::{ContentIdea, GeneratedScript, ScriptFormat, ScriptStyle},
};

pub const MIN_TARGET_LENGTH: u32 = 300;
pub const MAX_TARGET_LENGTH: u32 = 10_000;
pub const DEFAULT_TARGET_LENGTH: u32 = 1_500;
const BAND_SLACK: u32 = 150;

/// Acceptable character count for a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterBand {
    pub target: u32,
    pub min: u32,
    pub max: u32,
}

impl CharacterBand {
    /// `[max(300, target - 150), target + 150]`, with `target` first clamped
    /// to `[300, 10000]` so the band can never invert.
    pub fn for_target(target: u32) -> Self {
        let target = target.clamp(MIN_TARGET_LENGTH, MAX_TARGET_LENGTH);
        Self {
            target,
            min: target.saturating_sub(BAND_SLACK).max(MIN_TARGET_LENGTH),
            max: target + BAND_SLACK,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScriptOptions {
    pub target_length: u32,
    pub style: ScriptStyle,
    pub format: ScriptFormat,
    /// Output language, e.g. "English" or "Korean".
    pub language: String,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            target_length: DEFAULT_TARGET_LENGTH,
            style: ScriptStyle::default(),
            format: ScriptFormat::default(),
            language: "English".to_string(),
        }
    }
}

/// Runs the content idea → narration script stage.
pub struct ScriptWriter {
    model: Arc<dyn ModelClient>,
    config: ModelConfig,
}

impl ScriptWriter {
    pub fn new(model: Arc<dyn ModelClient>, config: ModelConfig) -> Self {
        Self { model, config }
    }

    /// Generate a script for `idea` using the credential captured by the
    /// session's last analysis.
    pub async fn generate(
        &self,
        session: &Session,
        idea: &ContentIdea,
        options: &ScriptOptions,
    ) -> Result<GeneratedScript, GenerationError> {
        let Some(credential) = session.credential() else {
            return Err(GenerationError::MissingCredential);
        };

        let band = CharacterBand::for_target(options.target_length);
        let request = ModelRequest {
            prompt: prompts::narration_script(
                idea,
                &options.language,
                band,
                options.style,
                options.format,
            ),
            temperature: self.config.script_temperature,
            web_search: false,
        };

        info!(
            title = %idea.title,
            target = band.target,
            style = ?options.style,
            format = ?options.format,
            "generating script"
        );

        let response = generate_with_timeout(
            self.model.as_ref(),
            &credential,
            &request,
            self.config.timeout(),
        )
        .await
        .map_err(GenerationError::Request)?;

        let text = if response.text.trim().is_empty() {
            warn!("model returned an empty script");
            Locale::from_language(&options.language)
                .script_failed()
                .to_string()
        } else {
            response.text
        };

        Ok(GeneratedScript { text })
    }

    /// Generate a script for the idea currently selected in `session`.
    pub async fn generate_selected(
        &self,
        session: &Session,
        options: &ScriptOptions,
    ) -> Result<GeneratedScript, GenerationError> {
        let idea = session.selected_idea()?;
        self.generate(session, &idea, options).await
    }
}
