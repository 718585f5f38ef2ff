//! Template-based story generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Placeholder replaced by the object name.
pub const PLACEHOLDER: &str = "{object}";

/// Prefix of every generated title.
pub const TITLE_PREFIX: &str = "The Tale of the ";

/// The fixed story templates, in selection order.
pub const TEMPLATES: [&str; 4] = [
    "Once upon a time, there was a remarkable {object} that changed the world.",
    "In a small village, a {object} was the key to everyone’s happiness.",
    "Every {object} has a secret, but this one was truly special.",
    "Long ago, a {object} started an adventure that no one would forget.",
];

/// A generated story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub content: String,
}

impl Story {
    /// Fill a template for the given object.
    ///
    /// Only the first placeholder is substituted.
    pub fn from_template(template: &str, object_name: &str) -> Self {
        Self {
            title: format!("{TITLE_PREFIX}{object_name}"),
            content: template.replacen(PLACEHOLDER, object_name, 1),
        }
    }
}

/// Picks a template uniformly at random and fills it in.
pub struct StoryTemplateEngine<R = StdRng> {
    rng: R,
}

impl StoryTemplateEngine<StdRng> {
    /// Create an engine seeded from system entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for StoryTemplateEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> StoryTemplateEngine<R> {
    /// Create an engine over a specific random source.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a story about `object_name`.
    ///
    /// Callers are expected to reject blank names before calling.
    pub fn generate(&mut self, object_name: &str) -> Story {
        let template = TEMPLATES[self.rng.gen_range(0..TEMPLATES.len())];
        Story::from_template(template, object_name)
    }
}
