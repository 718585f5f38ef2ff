//! Render orchestration for the Scan & Tell TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::layout::{centered_rect_fixed, split_assistant, AppLayout};
use crate::ui::widgets::{InputWidget, StoryCardWidget, StorybookWidget, TranscriptWidget};

/// Overlay types
#[derive(Debug, Clone)]
pub enum Overlay {
    Help,
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::calculate(area, app.game.settings_visible(), app.show_assistant);

    render_title_bar(frame, app, layout.title_area);

    if let Some(settings_area) = layout.settings_area {
        render_settings(frame, app, settings_area);
    }

    let object = app.buffer(Focus::Object);
    let object_input = InputWidget::new(object.text(), &app.theme)
        .title(" Object ")
        .cursor_position(object.cursor())
        .active(app.focus == Focus::Object)
        .placeholder("Type an object name and press Enter");
    frame.render_widget(object_input, layout.input_area);

    frame.render_widget(
        StoryCardWidget::new(app.game.current_story(), &app.theme),
        layout.story_area,
    );
    frame.render_widget(
        StorybookWidget::new(app.game.storybook(), &app.theme),
        layout.storybook_area,
    );

    if let Some(assistant_area) = layout.assistant_area {
        render_assistant(frame, app, assistant_area);
    }

    render_status_bar(frame, app, layout.status_bar);
    render_hotkey_bar(frame, app, layout.hotkey_bar);

    if let Some(overlay) = app.overlay() {
        match overlay {
            Overlay::Help => render_help_overlay(frame, app, area),
        }
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Scan & Tell | {} ({}) ",
        app.config().provider,
        app.config().effective_model()
    );
    let line = Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let key = app.buffer(Focus::Key);
    let input = InputWidget::new(key.text(), &app.theme)
        .title(" Settings: API key (F2 to close) ")
        .cursor_position(key.cursor())
        .active(app.focus == Focus::Key)
        .masked(true)
        .placeholder("Paste your API key");
    frame.render_widget(input, area);
}

/// Render the assistant panel, or the key prompt when no key is set
fn render_assistant(frame: &mut Frame, app: &App, area: Rect) {
    if !app.keys.is_configured() {
        let block = Block::default()
            .title(" Story Assistant ")
            .borders(Borders::ALL)
            .border_style(app.theme.border_style(false));
        let prompt = Paragraph::new(Span::styled(
            "Please set your API key in settings to use the story assistant. (F2)",
            app.theme.warning_style(),
        ))
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(prompt, area);
        return;
    }

    let (transcript_area, message_area) = split_assistant(area);
    let session = &app.assistant;

    let transcript = TranscriptWidget::new(session.transcript(), &app.theme)
        .scroll(app.transcript_scroll)
        .loading(session.is_pending().then_some(app.animation_frame))
        .completed(session.is_completed());
    app.set_transcript_max_scroll(transcript.max_scroll(transcript_area));
    frame.render_widget(transcript, transcript_area);

    let message = app.buffer(Focus::Message);
    let placeholder = if session.is_completed() {
        "Session complete - Ctrl+N for a new one"
    } else if session.is_pending() {
        "Generating response..."
    } else if !session.is_active() {
        "Waiting for an object name..."
    } else {
        "Suggest a twist, then Enter (Ctrl+E to finish)"
    };
    let input = InputWidget::new(message.text(), &app.theme)
        .title(" Message ")
        .cursor_position(message.cursor())
        .active(app.focus == Focus::Message)
        .placeholder(placeholder);
    frame.render_widget(input, message_area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {} saved ", app.game.storybook().len()),
        app.theme.title_style(),
    )];
    if let Some(message) = app.status_message() {
        spans.push(Span::raw("| "));
        spans.push(Span::styled(message.to_string(), app.theme.story_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_hotkey_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = vec!["Enter scan", "^S save", "F1 help", "F2 settings", "F3 assistant"];
    if app.assistant_ready() {
        hints.extend(["Tab focus", "^E finish", "^N new"]);
    }
    hints.push("^Q quit");
    let line = Line::from(Span::styled(
        format!(" {}", hints.join("  ")),
        app.theme.system_style(),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(54, 20, area);
    frame.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            " Scan & Tell - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("Stories:"),
        Line::from("  Enter        Scan the typed object"),
        Line::from("  Ctrl+S       Save the story to the storybook"),
        Line::from(""),
        heading("Panels:"),
        Line::from("  F2           Settings (API key)"),
        Line::from("  F3           Story assistant"),
        Line::from("  Tab / Esc    Cycle focus / back to object"),
        Line::from(""),
        heading("Assistant:"),
        Line::from("  Enter        Send message"),
        Line::from("  Ctrl+E       Ask for an ending"),
        Line::from("  Ctrl+N       Start over"),
        Line::from("  Up/Down      Scroll transcript"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    frame.render_widget(
        Paragraph::new(help_text)
            .block(block)
            .wrap(Wrap { trim: false }),
        popup_area,
    );
}
