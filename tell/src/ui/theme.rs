//! Color theme and styling for the Scan & Tell TUI

use ratatui::style::{Color, Modifier, Style};

/// UI color theme
#[derive(Debug, Clone)]
pub struct StoryTheme {
    pub border: Color,
    pub border_focused: Color,

    pub title_text: Color,
    pub story_text: Color,
    pub user_text: Color,
    pub model_text: Color,
    pub system_text: Color,
    pub warning_text: Color,
    pub banner: Color,
}

impl Default for StoryTheme {
    fn default() -> Self {
        Self {
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            title_text: Color::Yellow,
            story_text: Color::White,
            user_text: Color::Cyan,
            model_text: Color::White,
            system_text: Color::DarkGray,
            warning_text: Color::LightRed,
            banner: Color::LightGreen,
        }
    }
}

impl StoryTheme {
    /// Style for a story title
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title_text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn story_style(&self) -> Style {
        Style::default().fg(self.story_text)
    }

    /// Style for the user's own messages
    pub fn user_style(&self) -> Style {
        Style::default()
            .fg(self.user_text)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn model_style(&self) -> Style {
        Style::default().fg(self.model_text)
    }

    /// Style for hints and system messages
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning_text)
    }

    /// Style for the completion banner
    pub fn banner_style(&self) -> Style {
        Style::default()
            .fg(self.banner)
            .add_modifier(Modifier::BOLD)
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }
}
