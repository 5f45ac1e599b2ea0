use rand::seq::SliceRandom;
use rand::Rng;

/// Probability that a reply answers the opening post directly.
pub const ROOT_REPLY_CHANCE: f64 = 0.4;

pub const AUTHOR_HANDLES: &[&str] = &[
    "night_owl", "quietfox", "mossy_stone", "driftwood", "pixel_pilgrim", "tea_and_toast",
    "northbound", "lanternfish", "backroad_bee", "copperkettle", "sundial", "wanderling",
];

pub fn pick_author<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    AUTHOR_HANDLES.choose(rng).copied().unwrap_or("guest")
}

/// Index into the prior messages (root at 0) that the next reply answers.
pub fn choose_parent<R: Rng + ?Sized>(rng: &mut R, prior_len: usize) -> usize {
    if prior_len > 1 && rng.gen::<f64>() >= ROOT_REPLY_CHANCE {
        rng.gen_range(1..prior_len)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn only_root_available() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(choose_parent(&mut rng, 1), 0);
        }
    }

    #[test]
    fn parents_stay_in_range_and_mix() {
        let mut rng = StdRng::seed_from_u64(11);
        let picks: Vec<usize> = (0..2000).map(|_| choose_parent(&mut rng, 5)).collect();
        assert!(picks.iter().all(|p| *p < 5));
        let roots = picks.iter().filter(|p| **p == 0).count() as f64 / picks.len() as f64;
        assert!((0.3..0.5).contains(&roots), "root share {roots}");
        assert!(picks.iter().any(|p| *p == 4));
    }
}
