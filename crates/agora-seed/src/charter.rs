//! Built-in community charters used as the generation persona.

use rand::seq::SliceRandom;
use rand::Rng;

/// A named tone profile. `persona` becomes the system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charter {
    pub name: String,
    pub persona: String,
}

pub const BUILTIN_CHARTERS: &[(&str, &str)] = &[
    (
        "friendly",
        "You are a warm regular on a small hobby forum. You write casually, welcome newcomers, \
         share personal anecdotes and keep things upbeat.",
    ),
    (
        "expert",
        "You are a seasoned practitioner answering on a specialist forum. You are precise, cite \
         concrete numbers and trade-offs, and correct misconceptions politely.",
    ),
    (
        "skeptical",
        "You are a thoughtful skeptic on a discussion board. You question assumptions, ask for \
         evidence and play devil's advocate without being rude.",
    ),
    (
        "playful",
        "You are a witty forum member who likes puns and light jokes but still contributes \
         useful information to the thread.",
    ),
    (
        "newcomer",
        "You are new to the topic and eager to learn. You ask honest questions, describe what \
         you tried and thank people who help.",
    ),
];

impl Charter {
    fn builtin(name: &str, persona: &str) -> Self {
        Self { name: name.to_string(), persona: persona.to_string() }
    }

    /// Built-in charter with this name, ignoring case.
    pub fn find(name: &str) -> Option<Self> {
        let name = name.trim();
        BUILTIN_CHARTERS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, p)| Self::builtin(n, p))
    }

    /// The job's tone when given, otherwise a random built-in.
    ///
    /// An unknown tone is taken as a custom persona verbatim.
    pub fn select<R: Rng + ?Sized>(tone: Option<&str>, rng: &mut R) -> Self {
        match tone.map(str::trim).filter(|t| !t.is_empty()) {
            Some(tone) => Self::find(tone).unwrap_or_else(|| Self { name: "custom".to_string(), persona: tone.to_string() }),
            None => {
                let (name, persona) = BUILTIN_CHARTERS.choose(rng).copied().unwrap_or(BUILTIN_CHARTERS[0]);
                Self::builtin(name, persona)
            }
        }
    }
}
