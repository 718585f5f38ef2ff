//! Input field widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::StoryTheme;

/// Mask character for secret fields
const MASK: char = '•';

/// Single-line input field widget
pub struct InputWidget<'a> {
    content: &'a str,
    cursor_position: usize,
    theme: &'a StoryTheme,
    title: &'a str,
    placeholder: &'a str,
    is_active: bool,
    masked: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a StoryTheme) -> Self {
        Self {
            content,
            cursor_position: content.chars().count(),
            theme,
            title: "",
            placeholder: "",
            is_active: true,
            masked: false,
        }
    }

    pub fn cursor_position(mut self, pos: usize) -> Self {
        self.cursor_position = pos;
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// Render every character as a bullet
    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.is_active));

        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.content.is_empty() {
            Line::from(vec![
                Span::styled("> ", self.theme.user_style()),
                Span::styled(
                    self.placeholder,
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ])
        } else {
            let shown: String = if self.masked {
                self.content.chars().map(|_| MASK).collect()
            } else {
                self.content.to_string()
            };

            // Use character-based slicing for unicode safety
            let before_cursor: String = shown.chars().take(self.cursor_position).collect();
            let at_cursor = shown
                .chars()
                .nth(self.cursor_position)
                .map(|c| c.to_string())
                .unwrap_or_else(|| " ".to_string());
            let after_cursor: String = shown.chars().skip(self.cursor_position + 1).collect();

            let cursor_style = if self.is_active {
                Style::default()
                    .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
                    .fg(self.theme.user_text)
            } else {
                Style::default()
            };

            Line::from(vec![
                Span::styled("> ", self.theme.user_style()),
                Span::raw(before_cursor),
                Span::styled(at_cursor, cursor_style),
                Span::raw(after_cursor),
            ])
        };

        Paragraph::new(line).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(widget: InputWidget<'_>) -> String {
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (0..area.width)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_masked_input_hides_key() {
        let theme = StoryTheme::default();
        let line = rendered(InputWidget::new("sk-123", &theme).masked(true));
        assert!(line.contains("••••••"));
        assert!(!line.contains("sk-123"));
    }

    #[test]
    fn test_placeholder_when_empty() {
        let theme = StoryTheme::default();
        let line = rendered(InputWidget::new("", &theme).placeholder("Object"));
        assert!(line.contains("Object"));
    }
}
