use chrono::Local;

use crate::attachment::ImageAttachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Bot => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub images: Vec<ImageAttachment>,
    pub timestamp: String,
}

impl Message {
    pub fn user(text: String, images: Vec<ImageAttachment>) -> Self {
        Self::with_role(Role::User, text, images)
    }

    pub fn bot(text: String) -> Self {
        Self::with_role(Role::Bot, text, Vec::new())
    }

    fn with_role(role: Role, text: String, images: Vec<ImageAttachment>) -> Self {
        Self {
            role,
            text,
            images,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

/// Append-only message log for the session. Only shared references escape,
/// so appended messages are never changed or reordered.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
