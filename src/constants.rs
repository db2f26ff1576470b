// Fixed strings and limits, plus the few values that may be overridden from the environment.

use std::env;

/// Shown in place of the reply whenever a submission fails, whatever the cause.
pub const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Stands in for the user's text when only an image was sent.
pub const IMAGE_ONLY_PLACEHOLDER: &str =
    "Please look at the attached image and describe what it may indicate.";

/// Largest image the attachment control accepts (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

pub const PROMPT_PREAMBLE: &str = "You are a careful medical information assistant. \
The user describes symptoms and may attach a photo (for example a rash, a wound or a medication label). \
Suggest the most likely common explanations, simple self-care steps, and clear warning signs that \
mean they should see a doctor or seek emergency care. Keep the answer short and plain. \
Always finish with: This is for informational purposes only and not a medical diagnosis.";

lazy_static::lazy_static! {
    pub static ref LOG_FILE: String = env::var("MEDICHAT_LOG_FILE").unwrap_or_else(|_| "medichat.log".to_string());
    pub static ref DEFAULT_LOG_FILTER: String = env::var("RUST_LOG").unwrap_or_else(|_| "medichat=info".to_string());
}
