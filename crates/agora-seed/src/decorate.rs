//! Cosmetic emoticons sprinkled over generated text.

use rand::seq::SliceRandom;
use rand::Rng;

pub const EMOTICONS: &[&str] = &[":)", ":D", ";)", "^_^", ":P", "<3", "o_O", ":-)"];
pub const TITLE_CHANCE: f64 = 0.4;
pub const LINE_CHANCE: f64 = 0.5;
pub const MAX_INSERTIONS: usize = 3;

fn pick<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    EMOTICONS.choose(rng).copied().unwrap_or(":)")
}

pub fn decorate_title<R: Rng + ?Sized>(title: &str, rng: &mut R) -> String {
    if rng.gen_bool(TITLE_CHANCE) {
        format!("{title} {}", pick(rng))
    } else {
        title.to_string()
    }
}

/// Append an emoticon to some non-empty lines, never more than three.
pub fn decorate_text<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut inserted = 0;
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            if inserted < MAX_INSERTIONS && !line.trim().is_empty() && rng.gen_bool(LINE_CHANCE) {
                inserted += 1;
                format!("{line} {}", pick(&mut *rng))
            } else {
                line.to_string()
            }
        })
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn count_emoticons(s: &str) -> usize {
        s.lines().filter(|l| EMOTICONS.iter().any(|e| l.ends_with(e))).count()
    }

    #[test]
    fn at_most_three_insertions() {
        let text = (0..40).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = decorate_text(&text, &mut rng);
            assert!(count_emoticons(&out) <= MAX_INSERTIONS);
            assert_eq!(out.lines().count(), 40);
        }
    }

    #[test]
    fn blank_lines_are_left_alone() {
        let mut rng = StdRng::seed_from_u64(7);
        let out = decorate_text("\n   \n", &mut rng);
        assert_eq!(out.trim(), "");
    }

    #[test]
    fn title_keeps_its_text() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert!(decorate_title("Compost tips", &mut rng).starts_with("Compost tips"));
        }
    }
}
