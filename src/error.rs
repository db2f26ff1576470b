use thiserror::Error;

/// Anything that goes wrong between building a request and holding a reply.
///
/// The transcript never shows these; they all collapse to the orchestrator's
/// failure message. Callers get the variant for logging or exit codes.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("failed to render prompt: {0}")]
    Prompt(#[from] minijinja::Error),

    #[error("request to model service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("model service response could not be decoded: {0}")]
    MalformedResponse(String),

    #[error("model service blocked the prompt: {0}")]
    Blocked(String),

    #[error("model service returned no text")]
    EmptyReply,

    #[error("request task ended before a reply arrived")]
    Interrupted,
}

/// Why a submission was not accepted at all. Nothing is appended in either case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("nothing to send: text is blank and no image is attached")]
    Empty,
    #[error("a reply is still pending")]
    Busy,
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("{name} is not an image (detected {media_type})")]
    NotAnImage { name: String, media_type: String },

    #[error("{name} is {size} bytes, above the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key configured: set GEMINI_API_KEY (environment or .env file) or pass --api-key")]
    MissingApiKey,

    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidApiBase { url: String, reason: String },
}
