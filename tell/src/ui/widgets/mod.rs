//! TUI widgets for Scan & Tell

pub mod input;
pub mod story;
pub mod transcript;

pub use input::InputWidget;
pub use story::{StoryCardWidget, StorybookWidget};
pub use transcript::TranscriptWidget;
