use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use medichat::app_state::AppState;
use medichat::events::{handle_key_event, handle_mouse_event, handle_paste};
use medichat::ui::draw_ui;
use medichat::{
    constants, ChatOrchestrator, Config, GeminiClient, ImageAttachment, PendingSubmission,
    SubmitRejected,
};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct ApiArgs {
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true, help = "Gemini API key.")]
    api_key: Option<String>,

    #[arg(long, global = true, env = "MEDICHAT_MODEL", help = "Model name [default: gemini-2.0-flash].")]
    model: Option<String>,

    #[arg(long, global = true, env = "MEDICHAT_API_BASE", help = "Base URL of the Gemini API.")]
    api_base: Option<String>,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Open the interactive chat window.
    Chat,
    /// Send one message and print the reply.
    Ask {
        #[arg(default_value = "", help = "What to ask. May be empty when an image is given.")]
        text: String,
        #[arg(long = "image", value_name = "PATH", help = "Image to attach (repeatable).")]
        images: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (for GEMINI_API_KEY)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Fail fast on a missing key, before touching the terminal or the network.
    let config = Config::new(cli.api.api_key, cli.api.model, cli.api.api_base)
        .context("Invalid configuration")?;

    match cli.command {
        Commands::Chat => {
            let _guard = init_file_logging();
            info!(?config, "Starting interactive chat");
            run_chat(config).await?;
            info!("Chat session finished.");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ask { text, images } => {
            init_stderr_logging();
            info!(?config, "Running one-shot ask");
            run_ask(config, text, images).await
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_new(constants::DEFAULT_LOG_FILTER.as_str())
        .unwrap_or_else(|_| EnvFilter::new("medichat=info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter())
        .init();
}

// The terminal belongs to the UI, so logs go to a file.
fn init_file_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let path = Path::new(constants::LOG_FILE.as_str());
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().unwrap_or_else(|| OsStr::new("medichat.log"));

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(env_filter())
        .init();
    guard
}

async fn run_ask(config: Config, text: String, image_paths: Vec<PathBuf>) -> Result<ExitCode> {
    let mut images = Vec::with_capacity(image_paths.len());
    for path in &image_paths {
        let image = ImageAttachment::load(path)
            .await
            .with_context(|| format!("Cannot attach {}", path.display()))?;
        images.push(image);
    }

    let mut chat = ChatOrchestrator::new(Arc::new(GeminiClient::new(config)));
    match chat.submit(PendingSubmission::new(text, images)).await {
        Ok(exchange) => {
            println!("{}", exchange.reply.text);
            if exchange.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Err(SubmitRejected::Empty) => {
            eprintln!("Nothing to send: give some text or at least one --image.");
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_chat(config: Config) -> Result<()> {
    let chat = ChatOrchestrator::new(Arc::new(GeminiClient::new(config)));
    let mut app = AppState::new(chat);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("Chat UI failed: {:?}", e);
    }
    if app.is_busy() {
        info!("Exiting with a reply still pending");
    }
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    loop {
        app.poll_reply();

        terminal.draw(|f| draw_ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key_event(app, key).await? {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                Event::Paste(data) => handle_paste(app, &data),
                Event::Resize(_, _) => {
                    // Terminal was resized; the next draw picks it up
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
