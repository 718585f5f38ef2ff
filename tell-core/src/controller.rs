//! GameController - scan, save and settings orchestration.

use rand::rngs::StdRng;
use rand::Rng;

use crate::story::{Story, StoryTemplateEngine};

/// Owns the object-name input, the displayed story and the storybook.
pub struct GameController<R = StdRng> {
    engine: StoryTemplateEngine<R>,
    input: String,
    current: Option<Story>,
    storybook: Vec<Story>,
    show_settings: bool,
}

impl GameController<StdRng> {
    pub fn new() -> Self {
        Self::with_engine(StoryTemplateEngine::new())
    }
}

impl Default for GameController<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> GameController<R> {
    /// Create a controller around a specific engine (e.g. a seeded one).
    pub fn with_engine(engine: StoryTemplateEngine<R>) -> Self {
        Self {
            engine,
            input: String::new(),
            current: None,
            storybook: Vec::new(),
            show_settings: false,
        }
    }

    /// Generate a story for `object_name`.
    ///
    /// Blank input is ignored. Returns whether a story was generated.
    pub fn scan(&mut self, object_name: &str) -> bool {
        let name = object_name.trim();
        if name.is_empty() {
            return false;
        }
        let story = self.engine.generate(name);
        tracing::debug!(object = name, title = %story.title, "scanned");
        self.current = Some(story);
        true
    }

    /// Scan whatever is in the input field.
    pub fn scan_input(&mut self) -> bool {
        let input = self.input.clone();
        self.scan(&input)
    }

    /// Move the current story into the storybook.
    ///
    /// Clears the current story and the input field. Returns whether
    /// anything was saved.
    pub fn save(&mut self) -> bool {
        let Some(story) = self.current.take() else {
            return false;
        };
        tracing::debug!(title = %story.title, count = self.storybook.len() + 1, "saved story");
        self.storybook.push(story);
        self.input.clear();
        true
    }

    pub fn toggle_settings(&mut self) {
        self.show_settings = !self.show_settings;
    }

    pub fn settings_visible(&self) -> bool {
        self.show_settings
    }

    pub fn current_story(&self) -> Option<&Story> {
        self.current.as_ref()
    }

    pub fn storybook(&self) -> &[Story] {
        &self.storybook
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn seeded() -> GameController<StdRng> {
        GameController::with_engine(StoryTemplateEngine::with_rng(StdRng::seed_from_u64(11)))
    }

    #[test]
    fn test_blank_scan_is_noop() {
        let mut game = seeded();
        for blank in ["", "   ", "\t\n"] {
            assert!(!game.scan(blank));
        }
        assert!(game.current_story().is_none());
        assert!(game.storybook().is_empty());
    }

    #[test]
    fn test_blank_scan_keeps_previous_story() {
        let mut game = seeded();
        game.scan("bell");
        let before = game.current_story().cloned();
        game.scan("  ");
        assert_eq!(game.current_story().cloned(), before);
    }

    #[test]
    fn test_scan_trims_name() {
        let mut game = seeded();
        assert!(game.scan("  lamp "));
        assert_eq!(game.current_story().unwrap().title, "The Tale of the lamp");
    }

    #[test]
    fn test_double_save_appends_once() {
        let mut game = seeded();
        game.set_input("spoon");
        game.scan_input();

        assert!(game.save());
        assert!(!game.save());
        assert_eq!(game.storybook().len(), 1);
        assert!(game.current_story().is_none());
        assert_eq!(game.input(), "");
    }

    #[test]
    fn test_save_without_story_keeps_input() {
        let mut game = seeded();
        game.set_input("half typed");
        assert!(!game.save());
        assert_eq!(game.input(), "half typed");
    }

    #[test]
    fn test_storybook_keeps_save_order() {
        let mut game = seeded();
        let names = ["anchor", "boot", "candle", "anchor"];
        for name in names {
            game.scan(name);
            game.save();
        }

        let titles: Vec<&str> = game.storybook().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "The Tale of the anchor",
                "The Tale of the boot",
                "The Tale of the candle",
                "The Tale of the anchor",
            ]
        );
    }

    #[test]
    fn test_rescan_replaces_unsaved_story() {
        let mut game = seeded();
        game.scan("first");
        game.scan("second");
        game.save();
        assert_eq!(game.storybook().len(), 1);
        assert_eq!(game.storybook()[0].title, "The Tale of the second");
    }

    #[test]
    fn test_toggle_settings() {
        let mut game = seeded();
        assert!(!game.settings_visible());
        game.toggle_settings();
        assert!(game.settings_visible());
        game.toggle_settings();
        assert!(!game.settings_visible());
        assert!(game.current_story().is_none());
    }
}
