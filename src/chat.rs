// Chat orchestration: owns the transcript and busy flag, turns a submission
// into one model request and records the outcome.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::attachment::ImageAttachment;
use crate::constants;
use crate::error::{SubmissionError, SubmitRejected};
use crate::llm_interaction::{GenerateRequest, ModelService};
use crate::prompt::PromptBuilder;
use crate::transcript::{Message, Transcript};

/// Text and images captured when the user presses send.
#[derive(Debug, Clone, Default)]
pub struct PendingSubmission {
    pub text: String,
    pub images: Vec<ImageAttachment>,
}

impl PendingSubmission {
    pub fn new(text: impl Into<String>, images: Vec<ImageAttachment>) -> Self {
        Self {
            text: text.into(),
            images,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.images.is_empty()
    }
}

/// Result of an accepted submission: the bot message that was appended and,
/// when the call failed, the typed reason. The reason never reaches the transcript.
#[derive(Debug)]
pub struct Exchange {
    pub reply: Message,
    pub failure: Option<SubmissionError>,
}

impl Exchange {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// The in-flight half of a submission. Owned and `'static` so it can run on a
/// spawned task while the UI keeps drawing.
pub struct PendingReply {
    model: Arc<dyn ModelService>,
    request: Result<GenerateRequest, SubmissionError>,
}

impl PendingReply {
    pub fn request(&self) -> Option<&GenerateRequest> {
        self.request.as_ref().ok()
    }

    /// Performs the single model call. No retry, no timeout.
    pub async fn resolve(self) -> Result<String, SubmissionError> {
        let request = self.request?;
        self.model.generate(&request).await
    }
}

pub struct ChatOrchestrator {
    model: Arc<dyn ModelService>,
    prompt: PromptBuilder,
    transcript: Transcript,
    busy: bool,
    failure_message: String,
}

impl ChatOrchestrator {
    pub fn new(model: Arc<dyn ModelService>) -> Self {
        Self {
            model,
            prompt: PromptBuilder::default(),
            transcript: Transcript::new(),
            busy: false,
            failure_message: constants::FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    /// Text shown as the bot reply whenever a submission fails.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Runs one full round trip: [`begin`](Self::begin), the model call, then
    /// [`finish`](Self::finish).
    pub async fn submit(&mut self, submission: PendingSubmission) -> Result<Exchange, SubmitRejected> {
        let pending = self.begin(submission)?;
        let outcome = pending.resolve().await;
        // begin() set busy, so finish always records a reply here.
        self.finish(outcome).ok_or(SubmitRejected::Busy)
    }

    /// Accepts a submission: appends the user message, marks the session busy
    /// and prepares the request.
    ///
    /// Blank text with no images is a no-op, and so is any submission made
    /// while a reply is still pending; neither touches the transcript.
    pub fn begin(&mut self, submission: PendingSubmission) -> Result<PendingReply, SubmitRejected> {
        if self.busy {
            warn!("Submission ignored: a reply is still pending");
            return Err(SubmitRejected::Busy);
        }
        if submission.is_empty() {
            return Err(SubmitRejected::Empty);
        }

        let request = self
            .prompt
            .render(&submission.text)
            .map(|text| GenerateRequest::new(text, &submission.images));

        info!(
            text_len = submission.text.len(),
            images = submission.images.len(),
            "Submitting message"
        );
        self.transcript
            .push(Message::user(submission.text, submission.images));
        self.busy = true;

        Ok(PendingReply {
            model: Arc::clone(&self.model),
            request,
        })
    }

    /// Records the outcome of the pending call as exactly one bot message and
    /// clears the busy flag. Returns `None` when nothing was in flight.
    pub fn finish(&mut self, outcome: Result<String, SubmissionError>) -> Option<Exchange> {
        if !self.busy {
            warn!("Reply arrived with no submission in flight; dropping it");
            return None;
        }

        let (text, failure) = match outcome {
            Ok(reply) => (reply, None),
            Err(e) => {
                error!("Submission failed: {}", e);
                (self.failure_message.clone(), Some(e))
            }
        };
        let reply = self.transcript.push(Message::bot(text)).clone();
        self.busy = false;

        Some(Exchange { reply, failure })
    }
}
