//! How many thread tasks of one job may run at once.

use std::num::NonZeroUsize;

pub const MAX_CONCURRENCY_ENV: &str = "APP_SEED_MAX_CONCURRENCY";
pub const MIN_DEFAULT: usize = 2;
pub const MAX_DEFAULT: usize = 12;
/// Hard upper bound, whatever the configuration says.
pub const CEILING: usize = 64;

/// Environment override when it parses to a positive integer, otherwise the
/// CPU count clamped to `[2, 12]`.
pub fn default_max_concurrency() -> usize {
    let env_value = std::env::var(MAX_CONCURRENCY_ENV).ok();
    let cpus = std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(MIN_DEFAULT);
    from_sources(env_value.as_deref(), cpus)
}

pub fn from_sources(env_value: Option<&str>, cpus: usize) -> usize {
    let from_env = env_value.and_then(|v| v.trim().parse::<usize>().ok()).filter(|n| *n > 0);
    from_env.unwrap_or_else(|| cpus.clamp(MIN_DEFAULT, MAX_DEFAULT)).min(CEILING)
}

/// A configured value wins over the environment and CPU defaults.
pub fn resolve_max_concurrency(configured: Option<usize>) -> usize {
    match configured.filter(|n| *n > 0) {
        Some(n) => n.min(CEILING),
        None => default_max_concurrency(),
    }
}
