//! Domain types shared by the search ranker and the content seeder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

pub type ContentId = i64;

/// Upper bound on threads produced by a single seeding job.
pub const MAX_THREADS_PER_JOB: usize = 20;
/// Upper bound on replies generated per seeded thread.
pub const MAX_REPLIES_PER_THREAD: usize = 20;

/// One post as returned by a search collaborator.
///
/// - `id`: unique content (post) id
/// - `thread_id`/`collection_id`/`collection_slug`: where the post lives
/// - `thread_title`: title of the parent thread
/// - `body`: full post text, used for snippets
/// - `author`: display label of the author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentRecord {
    pub id: ContentId,
    pub thread_id: i64,
    pub collection_id: i64,
    pub collection_slug: String,
    pub thread_title: String,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// A record plus the backend's raw score.
///
/// Full-text backends report a relevance rank (higher is better). Vector
/// backends report a cosine distance (lower is better).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: ContentRecord,
    pub raw: f32,
}

impl ScoredRecord {
    pub fn new(record: ContentRecord, raw: f32) -> Self {
        Self { record, raw }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    FullText,
    Semantic,
    #[default]
    Hybrid,
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fulltext" | "full_text" | "full-text" | "text" => Ok(Self::FullText),
            "semantic" | "vector" => Ok(Self::Semantic),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(Error::InvalidOptions(format!("unknown search mode '{other}'"))),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FullText => "full_text",
            Self::Semantic => "semantic",
            Self::Hybrid => "hybrid",
        };
        f.write_str(s)
    }
}

/// Restrictions applied by both collaborators before scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    pub collection_id: Option<i64>,
    pub author: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.collection_id.is_none() && self.author.is_none() && self.start.is_none() && self.end.is_none()
    }

    /// Date bounds are inclusive; author comparison ignores case.
    pub fn matches(&self, record: &ContentRecord) -> bool {
        if self.collection_id.is_some_and(|id| id != record.collection_id) {
            return false;
        }
        if let Some(author) = &self.author {
            if !author.eq_ignore_ascii_case(&record.author) {
                return false;
            }
        }
        if self.start.is_some_and(|start| record.created_at < start) {
            return false;
        }
        if self.end.is_some_and(|end| record.created_at > end) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    pub query: String,
    pub filters: SearchFilters,
    pub mode: SearchMode,
    pub limit: usize,
    pub offset: usize,
}

impl SearchOptions {
    pub const DEFAULT_LIMIT: usize = 20;

    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: SearchFilters::default(),
            mode: SearchMode::default(),
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn in_collection(mut self, collection_id: i64) -> Self {
        self.filters.collection_id = Some(collection_id);
        self
    }

    pub fn by_author(mut self, author: impl Into<String>) -> Self {
        self.filters.author = Some(author.into());
        self
    }

    pub fn between(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.filters.start = start;
        self.filters.end = end;
        self
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::InvalidOptions("limit must be greater than zero".to_string()));
        }
        if let (Some(start), Some(end)) = (self.filters.start, self.filters.end) {
            if start > end {
                return Err(Error::InvalidOptions(format!("start date {start} is after end date {end}")));
            }
        }
        Ok(())
    }
}

/// One ranked hit. Built per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub content_id: ContentId,
    pub thread_id: i64,
    pub collection_id: i64,
    pub collection_slug: String,
    pub thread_title: String,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub score: f32,
    pub full_text_score: Option<f32>,
    pub semantic_score: Option<f32>,
    pub snippet: String,
}

impl SearchResult {
    /// Scores start at zero; the ranker fills them in.
    pub fn from_record(record: ContentRecord) -> Self {
        Self {
            content_id: record.id,
            thread_id: record.thread_id,
            collection_id: record.collection_id,
            collection_slug: record.collection_slug,
            thread_title: record.thread_title,
            body: record.body,
            author: record.author,
            created_at: record.created_at,
            score: 0.0,
            full_text_score: None,
            semantic_score: None,
            snippet: String::new(),
        }
    }
}

/// A request to populate a collection with generated discussions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    pub id: Uuid,
    pub collection_name: String,
    pub collection_slug: String,
    pub description: Option<String>,
    pub thread_count: usize,
    pub replies_per_thread: usize,
    pub site_purpose: Option<String>,
    pub tone: Option<String>,
    pub decorate: bool,
    pub model: Option<String>,
}

impl GenerationJob {
    pub fn new(collection_name: impl Into<String>, thread_count: usize, replies_per_thread: usize) -> Self {
        let collection_name = collection_name.into();
        let collection_slug = slugify(&collection_name);
        Self {
            id: Uuid::new_v4(),
            collection_name,
            collection_slug,
            description: None,
            thread_count,
            replies_per_thread,
            site_purpose: None,
            tone: None,
            decorate: false,
            model: None,
        }
        .normalized()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_site_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.site_purpose = Some(purpose.into());
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn decorated(mut self, decorate: bool) -> Self {
        self.decorate = decorate;
        self
    }

    /// Clamp counts into their allowed ranges and fill in a missing slug.
    ///
    /// Jobs deserialized from outside bypass `new`, so the seeder applies this
    /// again before running.
    pub fn normalized(mut self) -> Self {
        self.thread_count = self.thread_count.clamp(1, MAX_THREADS_PER_JOB);
        self.replies_per_thread = self.replies_per_thread.min(MAX_REPLIES_PER_THREAD);
        if self.collection_slug.trim().is_empty() {
            self.collection_slug = slugify(&self.collection_name);
        }
        self
    }
}

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "collection".to_string()
    } else {
        slug
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Start,
    Collection,
    Tone,
    Thread,
    Reply,
    Done,
    Error,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Collection => "collection",
            Self::Tone => "tone",
            Self::Thread => "thread",
            Self::Reply => "reply",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable progress record for one step of a seeding job.
///
/// `task` is the 1-based thread index for per-thread events and `None` for
/// job-level events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressEvent {
    pub job_id: Uuid,
    pub stage: Stage,
    pub message: String,
    pub entity_id: Option<i64>,
    pub task: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(job_id: Uuid, stage: Stage, message: impl Into<String>) -> Self {
        Self { job_id, stage, message: message.into(), entity_id: None, task: None, timestamp: Utc::now() }
    }

    pub fn with_entity(mut self, entity_id: i64) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn for_task(mut self, task: usize) -> Self {
        self.task = Some(task);
        self
    }

    /// `done`, or an `error` that is not tied to a single task.
    pub fn is_terminal(&self) -> bool {
        match self.stage {
            Stage::Done => true,
            Stage::Error => self.task.is_none(),
            _ => false,
        }
    }
}

/// Identity returned by the content store for a created row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedEntity {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

/// A created thread together with its opening post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedThread {
    pub thread_id: i64,
    pub root_post_id: i64,
    pub created_at: DateTime<Utc>,
}
