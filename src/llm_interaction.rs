use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::attachment::ImageAttachment;
use crate::config::Config;
use crate::error::SubmissionError;

/// One request to the model service: ordered parts, text first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    Text(String),
    InlineData { media_type: String, data: String },
}

impl GenerateRequest {
    /// A text part followed by one inline part per image, in order.
    pub fn new(text: String, images: &[ImageAttachment]) -> Self {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(RequestPart::Text(text));
        parts.extend(images.iter().map(|image| RequestPart::InlineData {
            media_type: image.media_type().to_string(),
            data: image.to_base64(),
        }));
        Self { parts }
    }

    pub fn text(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            RequestPart::Text(text) => Some(text.as_str()),
            RequestPart::InlineData { .. } => None,
        })
    }

    pub fn inline_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, RequestPart::InlineData { .. }))
            .count()
    }
}

/// A hosted generative model. Each call is stateless: one request in, one
/// text reply out.
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, SubmissionError>;
}

// Structures matching Gemini's generateContent endpoint
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl<'a> From<&'a GenerateRequest> for GenerateContentRequest<'a> {
    fn from(request: &'a GenerateRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                RequestPart::Text(text) => WirePart::Text { text },
                RequestPart::InlineData { media_type, data } => WirePart::InlineData {
                    inline_data: InlineData {
                        mime_type: media_type,
                        data,
                    },
                },
            })
            .collect();
        Self {
            contents: vec![Content { role: "user", parts }],
        }
    }
}

/// Talks to the Gemini REST API directly with the user's key.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: Config,
}

impl GeminiClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base, self.config.model
        )
    }
}

#[async_trait]
impl ModelService for GeminiClient {
    #[instrument(skip_all, fields(model = %self.config.model, parts = request.parts.len()))]
    async fn generate(&self, request: &GenerateRequest) -> Result<String, SubmissionError> {
        let url = self.endpoint();
        debug!(inline_parts = request.inline_count(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&GenerateContentRequest::from(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = service_error_message(status, &body);
            error!(%status, %message, "Gemini API request failed");
            return Err(SubmissionError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| SubmissionError::MalformedResponse(e.to_string()))?;

        extract_reply(parsed)
    }
}

fn service_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = envelope
                .error
                .message
                .unwrap_or_else(|| status.to_string());
            match envelope.error.status {
                Some(code) if !code.is_empty() => format!("{code}: {message}"),
                _ => message,
            }
        }
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn extract_reply(response: GenerateContentResponse) -> Result<String, SubmissionError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(SubmissionError::Blocked(reason));
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(SubmissionError::EmptyReply);
    }
    debug!(reply_len = text.len(), "Received Gemini reply");
    Ok(text)
}
