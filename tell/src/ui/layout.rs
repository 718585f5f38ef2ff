//! Layout calculations for the Scan & Tell TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// The main layout areas
pub struct AppLayout {
    pub title_area: Rect,
    pub settings_area: Option<Rect>,
    pub input_area: Rect,
    pub story_area: Rect,
    pub storybook_area: Rect,
    pub assistant_area: Option<Rect>,
    pub status_bar: Rect,
    pub hotkey_bar: Rect,
}

impl AppLayout {
    /// Calculate layout based on terminal size and visible panels
    pub fn calculate(area: Rect, show_settings: bool, show_assistant: bool) -> Self {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                                 // Title bar
                Constraint::Length(if show_settings { 3 } else { 0 }), // Settings
                Constraint::Length(3),                                 // Object input
                Constraint::Min(8),                                    // Main content
                Constraint::Length(1),                                 // Status bar
                Constraint::Length(1),                                 // Hotkey bar
            ])
            .split(area);

        // Content area: stories + optional assistant
        let (stories, assistant_area) = if show_assistant {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(main_chunks[3]);
            (content_chunks[0], Some(content_chunks[1]))
        } else {
            (main_chunks[3], None)
        };

        let story_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(stories);

        Self {
            title_area: main_chunks[0],
            settings_area: show_settings.then_some(main_chunks[1]),
            input_area: main_chunks[2],
            story_area: story_chunks[0],
            storybook_area: story_chunks[1],
            assistant_area,
            status_bar: main_chunks[4],
            hotkey_bar: main_chunks[5],
        }
    }
}

/// Split the assistant panel into transcript and message input
pub fn split_assistant(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Calculate fixed-size centered popup
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
