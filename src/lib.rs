//! medichat: a terminal chat client that sends symptom descriptions and an
//! optional photo to the Gemini API and shows the reply in a transcript.

pub mod app_state;
pub mod attachment;
pub mod chat;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod llm_interaction;
pub mod prompt;
pub mod transcript;
pub mod ui;
pub mod ui_components;

pub use attachment::{ImageAttachment, PendingImages};
pub use chat::{ChatOrchestrator, Exchange, PendingReply, PendingSubmission};
pub use config::Config;
pub use error::{AttachmentError, ConfigError, SubmissionError, SubmitRejected};
pub use llm_interaction::{GeminiClient, GenerateRequest, ModelService, RequestPart};
pub use transcript::{Message, Role, Transcript};
