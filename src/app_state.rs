use ratatui::widgets::{Block, Borders};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info};
use tui_textarea::TextArea;

use crate::attachment::PendingImages;
use crate::chat::{ChatOrchestrator, Exchange, PendingSubmission};
use crate::error::{SubmissionError, SubmitRejected};
use crate::ui_components::ScrollableTextArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Typing a message.
    Compose,
    /// Typing the path of an image to attach.
    AttachPath,
}

pub struct AppState {
    pub chat: ChatOrchestrator,
    pub pending_images: PendingImages,
    pub textarea: TextArea<'static>,
    pub path_input: TextArea<'static>,
    pub mode: InputMode,
    pub messages_view: ScrollableTextArea,
    /// Transcript messages already copied into `messages_view`.
    synced_messages: usize,
    reply_rx: Option<oneshot::Receiver<Result<String, SubmissionError>>>,
    pub status: Option<String>,
    pub show_help: bool,
    pub help_scroll: u16,
    pub should_quit: bool,
}

pub(crate) fn compose_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text("Describe your symptoms... (Enter to send, Alt+Enter for a new line)");
    textarea.set_block(Block::default().borders(Borders::ALL).title("Message"));
    textarea
}

pub(crate) fn path_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text("/path/to/photo.jpg");
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title("Attach image (Enter to attach, Esc to cancel)"),
    );
    textarea
}

impl AppState {
    pub fn new(chat: ChatOrchestrator) -> Self {
        let mut app = Self {
            chat,
            pending_images: PendingImages::new(),
            textarea: compose_textarea(),
            path_input: path_textarea(),
            mode: InputMode::Compose,
            messages_view: ScrollableTextArea::new(),
            synced_messages: 0,
            reply_rx: None,
            status: None,
            show_help: false,
            help_scroll: 0,
            should_quit: false,
        };
        app.sync_messages();
        app
    }

    pub fn is_busy(&self) -> bool {
        self.chat.is_busy()
    }

    /// Copies any transcript messages the view has not seen yet.
    pub fn sync_messages(&mut self) {
        let messages = self.chat.transcript().messages();
        for message in &messages[self.synced_messages..] {
            self.messages_view.add_message(message);
        }
        self.synced_messages = messages.len();
    }

    /// Sends the composed text and pending image. The model call runs on a
    /// spawned task; [`poll_reply`](Self::poll_reply) collects the result.
    ///
    /// Must be called from within a tokio runtime.
    pub fn send_message(&mut self) -> Result<(), SubmitRejected> {
        if self.is_busy() {
            return Err(SubmitRejected::Busy);
        }

        let text = self.textarea.lines().join("\n");
        let images = self.pending_images.take();
        let pending = self.chat.begin(PendingSubmission::new(text, images))?;

        self.textarea = compose_textarea();
        self.status = None;
        self.sync_messages();

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            // The receiver is gone only if the app is shutting down.
            let _ = tx.send(pending.resolve().await);
        });
        self.reply_rx = Some(rx);
        debug!("Submission dispatched");
        Ok(())
    }

    /// Collects a finished reply, if any. A task that died without answering
    /// is recorded as a failure so the busy flag never sticks.
    pub fn poll_reply(&mut self) -> Option<Exchange> {
        let rx = self.reply_rx.as_mut()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(SubmissionError::Interrupted),
        };
        self.reply_rx = None;

        let exchange = self.chat.finish(outcome);
        self.sync_messages();
        if let Some(exchange) = &exchange {
            info!(success = exchange.is_success(), "Reply received");
        }
        exchange
    }

    /// Waits for the in-flight reply, if any. Used on shutdown paths and in tests.
    pub async fn wait_for_reply(&mut self) -> Option<Exchange> {
        let rx = self.reply_rx.take()?;
        let outcome = rx.await.unwrap_or(Err(SubmissionError::Interrupted));
        let exchange = self.chat.finish(outcome);
        self.sync_messages();
        exchange
    }

    pub fn enter_attach_mode(&mut self) {
        if !self.is_busy() {
            self.path_input = path_textarea();
            self.mode = InputMode::AttachPath;
        }
    }

    pub fn leave_attach_mode(&mut self) {
        self.path_input = path_textarea();
        self.mode = InputMode::Compose;
    }

    /// Loads the typed path into the pending image slot. Rejected files are
    /// reported on the status line only.
    pub async fn attach_from_input(&mut self) {
        let path = self.path_input.lines().join("").trim().to_string();
        if !path.is_empty() {
            self.status = Some(match self.pending_images.attach_path(&path).await {
                Ok(image) => format!("Attached {}", image.label()),
                Err(e) => format!("Attachment rejected: {e}"),
            });
        }
        self.leave_attach_mode();
    }

    pub fn remove_attachment(&mut self) {
        if let Some(image) = self.pending_images.clear() {
            self.status = Some(format!("Removed {}", image.name()));
        }
    }
}
