//! Assistant transcript widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget,
    },
};

use tell_core::{ConversationTurn, TurnRole};

use crate::ui::theme::StoryTheme;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Widget for the story assistant conversation
pub struct TranscriptWidget<'a> {
    turns: &'a [ConversationTurn],
    scroll: usize,
    theme: &'a StoryTheme,
    loading: Option<u8>,
    completed: bool,
}

impl<'a> TranscriptWidget<'a> {
    pub fn new(turns: &'a [ConversationTurn], theme: &'a StoryTheme) -> Self {
        Self {
            turns,
            scroll: 0,
            theme,
            loading: None,
            completed: false,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show the loading indicator at the given animation frame
    pub fn loading(mut self, frame: Option<u8>) -> Self {
        self.loading = frame;
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

impl<'a> TranscriptWidget<'a> {
    /// The transcript wrapped to rows of at most `width` characters.
    fn rows(&self, width: usize) -> Vec<Line<'a>> {
        let mut logical: Vec<(String, Style)> = Vec::new();

        if self.turns.is_empty() && self.loading.is_none() {
            logical.push((
                "Type an object name to start building a story together.".to_string(),
                self.theme.system_style(),
            ));
        }

        for turn in self.turns {
            let (prefix, style) = match turn.role {
                TurnRole::User => ("> ", self.theme.user_style()),
                TurnRole::Model => ("", self.theme.model_style()),
            };
            for (i, line) in turn.text.lines().enumerate() {
                let prefix = if i == 0 { prefix } else { "" };
                logical.push((format!("{prefix}{line}"), style));
            }
            logical.push((String::new(), Style::default()));
        }

        if let Some(frame) = self.loading {
            let spinner = SPINNER[frame as usize % SPINNER.len()];
            logical.push((
                format!("{spinner} Generating response..."),
                self.theme.system_style(),
            ));
        }

        if self.completed {
            logical.push((
                "Your story building session has concluded!".to_string(),
                self.theme.banner_style(),
            ));
        }

        logical
            .into_iter()
            .flat_map(|(text, style)| {
                wrap_text(&text, width)
                    .into_iter()
                    .map(move |row| Line::from(Span::styled(row, style)))
            })
            .collect()
    }

    /// Largest useful scroll offset when rendered into `area`.
    pub fn max_scroll(&self, area: Rect) -> usize {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        self.rows(content_width(inner))
            .len()
            .saturating_sub(inner.height as usize)
    }
}

/// Text columns left of the scrollbar
fn content_width(inner: Rect) -> usize {
    inner.width.saturating_sub(1) as usize
}

/// Greedy word wrap. Words longer than `width` are split across rows.
/// A zero width leaves the text on one row.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_len = 0;

    for word in text.split(' ') {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if row_len > 0 {
                rows.push(std::mem::take(&mut row));
                row_len = 0;
            }
            let rest = chars.split_off(width);
            rows.push(chars.into_iter().collect());
            chars = rest;
        }

        if row_len > 0 && row_len + 1 + chars.len() > width {
            rows.push(std::mem::take(&mut row));
            row_len = 0;
        }
        if row_len > 0 {
            row.push(' ');
            row_len += 1;
        }
        row_len += chars.len();
        row.extend(chars);
    }

    rows.push(row);
    rows
}

impl Widget for TranscriptWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Story Assistant ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(!self.completed));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.rows(content_width(inner));

        let visible_height = inner.height as usize;
        let total_lines = lines.len();
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);

        let text_area = Rect {
            width: content_width(inner) as u16,
            ..inner
        };
        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .render(text_area, buf);

        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .track_style(Style::default().fg(Color::Black))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);

            if scroll < max_scroll {
                let hint = format!(" ↓{} more ", max_scroll - scroll);
                let hint_y = inner.y + inner.height.saturating_sub(1);
                let hint_style = Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM);
                for (i, ch) in hint.chars().enumerate() {
                    let x = inner.x + (i as u16);
                    if x < inner.x + inner.width.saturating_sub(2) {
                        buf[(x, hint_y)].set_char(ch).set_style(hint_style);
                    }
                }
            }
        }
    }
}
