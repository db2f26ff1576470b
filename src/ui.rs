use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app_state::{AppState, InputMode};

const HELP_LINES: &[(&str, &str)] = &[
    ("Enter", "Send message"),
    ("Alt+Enter", "New line"),
    ("Ctrl+O", "Attach an image (path prompt)"),
    ("Ctrl+X", "Remove the pending image"),
    ("PageUp / PageDown", "Scroll transcript"),
    ("Ctrl+Up / Ctrl+Down", "Scroll one line"),
    ("Mouse wheel", "Scroll transcript"),
    ("Ctrl+Home / Ctrl+End", "Jump to top / bottom"),
    ("F1", "Toggle this help"),
    ("Esc / Ctrl+C", "Quit"),
];

pub fn draw_ui(f: &mut ratatui::Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Transcript
            Constraint::Length(1), // Attachment / status line
            Constraint::Length(5), // Input area
        ])
        .split(f.area());

    render_transcript(f, app, chunks[0]);
    render_status_line(f, app, chunks[1]);
    render_input_area(f, app, chunks[2]);

    if app.show_help {
        render_help_screen(f, app, f.area());
    }
}

fn render_transcript(f: &mut ratatui::Frame, app: &mut AppState, area: Rect) {
    let title = if app.is_busy() {
        "medichat - Thinking...".to_string()
    } else {
        format!("medichat - {} messages", app.chat.transcript().len())
    };
    app.messages_view.render(f, area, &title);
}

fn render_status_line(f: &mut ratatui::Frame, app: &AppState, area: Rect) {
    let mut spans = Vec::new();
    match app.pending_images.current() {
        Some(image) => {
            spans.push(Span::styled(
                format!("📎 {} ", image.label()),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("(Ctrl+X remove) ", Style::default().fg(Color::DarkGray)));
        }
        None => spans.push(Span::styled(
            "Ctrl+O attach image · Enter send · F1 help ",
            Style::default().fg(Color::DarkGray),
        )),
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input_area(f: &mut ratatui::Frame, app: &mut AppState, area: Rect) {
    match app.mode {
        InputMode::AttachPath => f.render_widget(&app.path_input, area),
        InputMode::Compose => {
            let (title, color) = if app.is_busy() {
                ("Message (waiting for reply...)", Color::DarkGray)
            } else {
                ("Message", Color::White)
            };
            app.textarea.set_block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(color)),
            );
            f.render_widget(&app.textarea, area);
        }
    }
}

fn render_help_screen(f: &mut ratatui::Frame, app: &AppState, area: Rect) {
    let popup = centered_rect(60, 60, area);
    let mut lines = vec![Line::from(Span::styled(
        "Keys",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::default());
    for (keys, action) in HELP_LINES {
        lines.push(Line::from(vec![
            Span::styled(format!("{keys:<22}"), Style::default().fg(Color::Cyan)),
            Span::raw(*action),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Replies are informational only and not a medical diagnosis.",
        Style::default().fg(Color::Yellow),
    )));

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help (F1 or Esc to close)"),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));

    f.render_widget(Clear, popup);
    f.render_widget(help, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
