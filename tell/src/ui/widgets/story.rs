//! Story card and storybook widgets

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use tell_core::Story;

use crate::ui::theme::StoryTheme;

/// The most recently scanned story
pub struct StoryCardWidget<'a> {
    story: Option<&'a Story>,
    theme: &'a StoryTheme,
}

impl<'a> StoryCardWidget<'a> {
    pub fn new(story: Option<&'a Story>, theme: &'a StoryTheme) -> Self {
        Self { story, theme }
    }
}

impl Widget for StoryCardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Story ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.story.is_some()));

        let lines = match self.story {
            Some(story) => vec![
                Line::from(Span::styled(story.title.clone(), self.theme.title_style())),
                Line::from(""),
                Line::from(Span::styled(story.content.clone(), self.theme.story_style())),
                Line::from(""),
                Line::from(Span::styled("Ctrl+S to save", self.theme.system_style())),
            ],
            None => vec![Line::from(Span::styled(
                "Scan an object to hear its tale.",
                self.theme.system_style(),
            ))],
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

/// Saved stories, oldest first
pub struct StorybookWidget<'a> {
    stories: &'a [Story],
    theme: &'a StoryTheme,
}

impl<'a> StorybookWidget<'a> {
    pub fn new(stories: &'a [Story], theme: &'a StoryTheme) -> Self {
        Self { stories, theme }
    }
}

impl Widget for StorybookWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" Storybook ({}) ", self.stories.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.stories.is_empty() {
            Paragraph::new(Span::styled("No saved stories yet.", self.theme.system_style()))
                .render(inner, buf);
            return;
        }

        let mut lines: Vec<Line> = Vec::new();
        for story in self.stories {
            lines.push(Line::from(Span::styled(
                story.title.clone(),
                self.theme.title_style(),
            )));
            lines.push(Line::from(Span::styled(
                story.content.clone(),
                self.theme.story_style(),
            )));
            lines.push(Line::from(""));
        }

        // Keep the newest entries visible
        let visible = inner.height as usize;
        let scroll = lines.len().saturating_sub(visible);

        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
