//! Configuration loader and path helpers.
//!
//! Uses Figment to merge defaults + `config.toml` + `config.<env>.toml` +
//! `APP_*` env vars (`__` separates sections). Provides helpers to expand `~`
//! and `${VAR}` and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Layer `path`, then the `config.<env>.toml` next to it, then `APP_*`
    /// variables over the built-in defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let dir = path.parent().unwrap_or_else(|| Path::new(""));

        let mut figment = Figment::from(Serialized::defaults(AgoraSettings::default())).merge(Toml::file(path));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed settings, validated.
    pub fn settings(&self) -> anyhow::Result<AgoraSettings> {
        let settings: AgoraSettings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgoraSettings {
    pub search: SearchSettings,
    pub seed: SeedSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    /// Candidates requested from each backend in hybrid mode.
    pub candidate_pool: usize,
    pub full_text_weight: f32,
    pub semantic_weight: f32,
    pub snippet_chars: usize,
    pub snippet_context: usize,
    pub default_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            candidate_pool: 50,
            full_text_weight: 0.4,
            semantic_weight: 0.6,
            snippet_chars: 240,
            snippet_context: 60,
            default_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeedSettings {
    /// Overrides the environment/CPU derived concurrency when set.
    pub max_concurrency: Option<usize>,
    pub max_title_attempts: usize,
    pub similarity_threshold: f32,
    pub title_max_chars: usize,
    pub reply_snippet_chars: usize,
    pub model: Option<String>,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            max_title_attempts: 6,
            similarity_threshold: 0.90,
            title_max_chars: 120,
            reply_snippet_chars: 220,
            model: None,
        }
    }
}

impl AgoraSettings {
    pub fn validate(&self) -> crate::error::Result<()> {
        let s = &self.search;
        if s.candidate_pool == 0 {
            return Err(Error::InvalidConfig("search.candidate_pool must be > 0".to_string()));
        }
        if s.full_text_weight < 0.0 || s.semantic_weight < 0.0 {
            return Err(Error::InvalidConfig("search weights must be non-negative".to_string()));
        }
        if s.snippet_chars == 0 || s.snippet_context >= s.snippet_chars {
            return Err(Error::InvalidConfig(format!(
                "search.snippet_context ({}) must be smaller than search.snippet_chars ({})",
                s.snippet_context, s.snippet_chars
            )));
        }
        if s.default_limit == 0 {
            return Err(Error::InvalidConfig("search.default_limit must be > 0".to_string()));
        }
        let seed = &self.seed;
        if seed.max_concurrency == Some(0) {
            return Err(Error::InvalidConfig("seed.max_concurrency must be > 0".to_string()));
        }
        if seed.max_title_attempts == 0 {
            return Err(Error::InvalidConfig("seed.max_title_attempts must be > 0".to_string()));
        }
        if !(seed.similarity_threshold > 0.0 && seed.similarity_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "seed.similarity_threshold must be in (0, 1], got {}",
                seed.similarity_threshold
            )));
        }
        if seed.title_max_chars < 8 {
            return Err(Error::InvalidConfig("seed.title_max_chars must be >= 8".to_string()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
