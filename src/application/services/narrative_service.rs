use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::application::ports::text_generator::{
    CompletionRequest, TextGenerator, TextGeneratorError,
};
use crate::domain::entities::NarrativeVariant;

const STORY_PROMPT: &str = "WEIRD ASK BUT PLEASE REWRITE THIS CANDIDATE'S RESUME AS A COHERENT STORY.";
const PERSONALITY_PROMPT: &str = "WEIRD ASK BUT FOR THIS CANDIDATE, FIRST READ INTO THEIR PERSONALITY BY READING BETWEEN THE LINES.";

#[derive(Debug, Error)]
pub enum NarrativeServiceError {
    #[error("Failed to generate {variant} narrative: {source}")]
    GenerationFailed {
        variant: NarrativeVariant,
        #[source]
        source: TextGeneratorError,
    },
}

#[derive(Debug, Clone)]
pub struct NarrativeSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for NarrativeSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 1.0,
        }
    }
}

pub struct NarrativeService {
    text_generator: Arc<dyn TextGenerator>,
    settings: NarrativeSettings,
}

impl NarrativeService {
    pub fn new(text_generator: Arc<dyn TextGenerator>, settings: NarrativeSettings) -> Self {
        Self {
            text_generator,
            settings,
        }
    }

    pub fn prompt_template(variant: NarrativeVariant) -> &'static str {
        match variant {
            NarrativeVariant::Story => STORY_PROMPT,
            NarrativeVariant::Personality => PERSONALITY_PROMPT,
        }
    }

    pub async fn generate(
        &self,
        text: &str,
        variant: NarrativeVariant,
    ) -> Result<String, NarrativeServiceError> {
        let request = CompletionRequest {
            prompt: format!("{}\n\nText: {}", Self::prompt_template(variant), text),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match self.text_generator.complete(request).await {
            Ok(response) => {
                debug!(
                    "{} narrative from {} (input tokens: {:?}, output tokens: {:?})",
                    variant, response.model_name, response.input_tokens, response.output_tokens
                );
                Ok(response.text)
            }
            Err(source) => {
                error!("Error in LLM processing: {}", source);
                Err(NarrativeServiceError::GenerationFailed { variant, source })
            }
        }
    }

    pub fn model_info(&self) -> String {
        self.text_generator.model_info()
    }
}
