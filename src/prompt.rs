use minijinja::{context, Environment};

use crate::constants;
use crate::error::SubmissionError;

const PROMPT_TEMPLATE: &str = "{{ preamble }}\n\n{{ input }}";

/// Builds the text part of a request: the fixed preamble followed by what the
/// user typed, or a placeholder when they only sent an image.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
    placeholder: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            preamble: constants::PROMPT_PREAMBLE.to_string(),
            placeholder: constants::IMAGE_ONLY_PLACEHOLDER.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn new(preamble: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            placeholder: placeholder.into(),
        }
    }

    pub fn render(&self, text: &str) -> Result<String, SubmissionError> {
        let input = if text.trim().is_empty() {
            self.placeholder.as_str()
        } else {
            text
        };

        // Plain-text template: no auto-escaping applies to render_str.
        let env = Environment::new();
        let rendered = env.render_str(
            PROMPT_TEMPLATE,
            context! {
                preamble => self.preamble.as_str(),
                input => input,
            },
        )?;
        Ok(rendered)
    }
}
