//! Offline stand-in for an LLM: stitches titles, posts and replies together
//! from phrase tables so `agora seed` works without a model server.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;

use agora_core::traits::TextGenerator;

const OPENERS: &[&str] = &[
    "How do you approach", "Beginner question about", "Unpopular opinion on", "What finally worked for",
    "Lessons learned from a year of", "Is anyone else struggling with", "Cheap tricks for", "Myths about",
    "Weekly check-in:", "Show your setup for", "Mistakes I made with", "Ask me anything about",
];

const ANGLES: &[&str] = &[
    "on a tight budget", "in a small apartment", "after a long break", "with kids around", "during winter",
    "when you only have weekends", "without special gear", "as a total beginner", "for the long haul",
    "when motivation runs out", "in a noisy city", "with friends",
];

const BODY_LINES: &[&str] = &[
    "I have been going back and forth on this for a while and wanted to hear how others handle it.",
    "Most of the advice I found online contradicts itself, so I am hoping for real experiences.",
    "Last month I tried a new routine and the results surprised me.",
    "My current approach works, but it feels slower than it should be.",
    "I keep notes on what changes, and the pattern is not what I expected.",
    "A friend swears by the opposite approach, which got me thinking.",
];

const REPLY_LINES: &[&str] = &[
    "Same here. What helped me was starting smaller than felt reasonable.",
    "I disagree a little: consistency mattered more for me than the method.",
    "Have you tried writing down what you did each day? It made the pattern obvious.",
    "This thread is gold. Saving it for later.",
    "Counterpoint: the expensive option paid for itself within a few months.",
    "I had the exact problem you describe and it went away once I changed the timing.",
    "Good question. I think it depends a lot on how much time you have.",
    "Following, because I am about to try the same thing.",
];

/// Template-based generator. The persona is echoed as a short sign-off so
/// different charters produce visibly different text.
pub struct TemplateGenerator {
    rng: Mutex<StdRng>,
}

impl TemplateGenerator {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut rng)
    }

    fn title(&self, prompt: &str) -> String {
        let forum = quoted_after(prompt, "in the forum '").unwrap_or("the forum");
        self.with_rng(|rng| {
            let opener = OPENERS.choose(rng).copied().unwrap_or("Thoughts on");
            let angle = ANGLES.choose(rng).copied().unwrap_or("today");
            format!("{opener} {} {angle}", forum.to_lowercase())
        })
    }

    fn paragraphs(&self, pool: &[&str], count: usize, persona: &str) -> String {
        let mut text = self.with_rng(|rng| {
            pool.choose_multiple(rng, count).copied().collect::<Vec<_>>().join("\n")
        });
        if let Some(first) = persona.split('.').next().filter(|s| !s.trim().is_empty()) {
            text.push_str(&format!("\n({})", first.trim()));
        }
        text
    }
}

impl Default for TemplateGenerator {
    fn default() -> Self { Self::new() }
}

fn quoted_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    rest.find('\'').map(|end| &rest[..end])
}

#[async_trait]
impl TextGenerator for TemplateGenerator {
    async fn generate(&self, persona: &str, prompt: &str, _model: Option<&str>, cancel: &CancellationToken) -> Result<String> {
        if cancel.is_cancelled() {
            bail!("generation cancelled");
        }
        let text = if prompt.starts_with("Write a title") {
            self.title(prompt)
        } else if prompt.starts_with("Write the opening post") {
            let lines = self.with_rng(|rng| rng.gen_range(2..=3));
            self.paragraphs(BODY_LINES, lines, persona)
        } else {
            let lines = self.with_rng(|rng| rng.gen_range(1..=2));
            self.paragraphs(REPLY_LINES, lines, persona)
        };
        Ok(text)
    }
}
