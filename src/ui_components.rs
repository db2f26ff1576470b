use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::transcript::{Message, Role};

/// A scrollable, wrapped view of the transcript with a scrollbar.
///
/// Stays pinned to the bottom until the user scrolls up, and re-pins once
/// they scroll back down to the end.
pub struct ScrollableTextArea {
    pub content: Vec<Line<'static>>,
    pub scroll_position: usize,
    pub max_scroll: usize,
    follow_bottom: bool,
}

impl ScrollableTextArea {
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
            scroll_position: 0,
            max_scroll: 0,
            follow_bottom: true,
        }
    }

    pub fn add_message(&mut self, message: &Message) {
        let (label_style, text_style) = match message.role {
            Role::User => (
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                Style::default().fg(Color::White),
            ),
            Role::Bot => (
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                Style::default().fg(Color::Gray),
            ),
        };

        self.content.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", message.timestamp),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!("{}:", message.role.label()), label_style),
        ]));
        for line in message.text.lines() {
            self.content
                .push(Line::from(Span::styled(line.to_string(), text_style)));
        }
        for image in &message.images {
            self.content.push(Line::from(Span::styled(
                format!("📎 {}", image.label()),
                Style::default().fg(Color::Blue).add_modifier(Modifier::ITALIC),
            )));
        }
        self.content.push(Line::default());

        self.update_max_scroll();
        if self.follow_bottom {
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_position = self.scroll_position.saturating_sub(lines);
        self.follow_bottom = self.scroll_position >= self.max_scroll;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_position = (self.scroll_position + lines).min(self.max_scroll);
        self.follow_bottom = self.scroll_position >= self.max_scroll;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_position = self.max_scroll;
        self.follow_bottom = true;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_position = 0;
        self.follow_bottom = self.max_scroll == 0;
    }

    // Until the first render knows the real width, one row per line.
    fn update_max_scroll(&mut self) {
        self.max_scroll = self.content.len().saturating_sub(1);
    }

    /// The content broken into rows of at most `width` columns, at word
    /// boundaries. A wrapped line takes the style of its last span.
    fn wrapped_lines(&self, width: u16) -> Vec<Line<'static>> {
        let width = usize::from(width.max(1));
        let mut rows = Vec::with_capacity(self.content.len());
        for line in &self.content {
            if line.width() <= width {
                rows.push(line.clone());
                continue;
            }
            let style = line.spans.last().map(|span| span.style).unwrap_or_default();
            let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
            rows.extend(
                textwrap::wrap(&text, width)
                    .into_iter()
                    .map(|piece| Line::from(Span::styled(piece.into_owned(), style))),
            );
        }
        rows
    }

    pub fn render(&mut self, f: &mut ratatui::Frame, area: Rect, title: &str) {
        // Split area to leave space for scrollbar
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let inner_width = chunks[0].width.saturating_sub(2);
        let inner_height = usize::from(chunks[0].height.saturating_sub(2));
        let rows = self.wrapped_lines(inner_width);
        self.max_scroll = rows.len().saturating_sub(inner_height);
        if self.follow_bottom || self.scroll_position > self.max_scroll {
            self.scroll_position = self.max_scroll;
        }

        let paragraph = Paragraph::new(Text::from(rows))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string())
                    .title_style(Style::default().fg(Color::Blue)),
            )
            .scroll((self.scroll_position.min(u16::MAX as usize) as u16, 0));

        f.render_widget(paragraph, chunks[0]);

        if self.max_scroll > 0 {
            let mut scrollbar_state =
                ScrollbarState::new(self.max_scroll).position(self.scroll_position);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            f.render_stateful_widget(scrollbar, chunks[1], &mut scrollbar_state);
        }
    }

    pub fn handle_scroll_event(&mut self, direction: ScrollDirection, amount: usize) {
        match direction {
            ScrollDirection::Up => self.scroll_up(amount),
            ScrollDirection::Down => self.scroll_down(amount),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl Default for ScrollableTextArea {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_scrollable_text_area() {
        let mut area = ScrollableTextArea::new();

        area.add_message(&Message::user("First message".to_string(), Vec::new()));
        area.add_message(&Message::bot("Second message".to_string()));

        // header + text + spacer per message
        assert_eq!(area.content.len(), 6);
        assert_eq!(area.scroll_position, area.max_scroll);

        area.scroll_up(1);
        assert!(area.scroll_position < area.max_scroll);

        area.scroll_to_bottom();
        assert_eq!(area.scroll_position, area.max_scroll);
    }

    #[test]
    fn test_scrolled_up_view_stays_put_on_new_message() {
        let mut area = ScrollableTextArea::new();
        for i in 0..5 {
            area.add_message(&Message::user(format!("message {i}"), Vec::new()));
        }
        area.scroll_to_top();
        area.add_message(&Message::bot("late reply".to_string()));
        assert_eq!(area.scroll_position, 0);

        area.handle_scroll_event(ScrollDirection::Down, usize::MAX / 2);
        assert_eq!(area.scroll_position, area.max_scroll);
        area.add_message(&Message::bot("another".to_string()));
        assert_eq!(area.scroll_position, area.max_scroll);
    }

    #[test]
    fn test_multiline_text_and_images_get_own_lines() {
        let image = crate::attachment::ImageAttachment::new("rash.png", "image/png", vec![0; 2048]).unwrap();
        let mut area = ScrollableTextArea::new();
        area.add_message(&Message::user("line one\nline two".to_string(), vec![image]));

        // header, two text lines, one image line, spacer
        assert_eq!(area.content.len(), 5);
        assert_eq!(area.content[3].to_string(), "📎 rash.png (2 KB)");
    }

    fn draw(area: &mut ScrollableTextArea, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| area.render(f, f.area(), "T")).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .chunks(usize::from(width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_end_of_long_reply_reachable() {
        let mut words: Vec<String> = ('a'..='p').map(|c| c.to_string().repeat(6)).collect();
        words.push("DISCLAIMER".to_string());
        let mut area = ScrollableTextArea::new();
        area.add_message(&Message::bot(words.join(" ")));

        let screen = draw(&mut area, 14, 6);
        assert!(screen.contains("DISCLAIMER"), "{screen}");

        area.scroll_to_top();
        let screen = draw(&mut area, 14, 6);
        assert!(screen.contains("aaaaaa"), "{screen}");
        assert!(!screen.contains("DISCLAIMER"), "{screen}");

        area.scroll_to_bottom();
        area.scroll_down(1000);
        let screen = draw(&mut area, 14, 6);
        assert!(screen.contains("DISCLAIMER"), "{screen}");
        assert_eq!(area.scroll_position, area.max_scroll);
    }

    #[test]
    fn test_wrapped_lines_break_at_words() {
        let mut area = ScrollableTextArea::new();
        area.add_message(&Message::bot("take two tablets daily".to_string()));
        let rows: Vec<String> = area.wrapped_lines(10).iter().map(|line| line.to_string()).collect();
        // header "[hh:mm:ss] Assistant:" splits at its space
        assert_eq!(rows[1], "Assistant:");
        assert_eq!(rows[2..], ["take two", "tablets", "daily", ""]);
    }
}
