//! In-memory `ContentStore`, used by the CLI and tests.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use agora_core::error::Error;
use agora_core::traits::ContentStore;
use agora_core::types::{ContentRecord, CreatedEntity, CreatedThread};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredCollection {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredThread {
    pub id: i64,
    pub collection_id: i64,
    pub title: String,
    pub root_post_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPost {
    pub id: i64,
    pub thread_id: i64,
    /// `None` for the opening post.
    pub parent_id: Option<i64>,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    collections: Vec<StoredCollection>,
    threads: Vec<StoredThread>,
    posts: Vec<StoredPost>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut tables)
    }

    pub fn collections(&self) -> Vec<StoredCollection> {
        self.with_tables(|t| t.collections.clone())
    }

    pub fn threads(&self) -> Vec<StoredThread> {
        self.with_tables(|t| t.threads.clone())
    }

    pub fn posts(&self) -> Vec<StoredPost> {
        self.with_tables(|t| t.posts.clone())
    }

    pub fn posts_in_thread(&self, thread_id: i64) -> Vec<StoredPost> {
        self.with_tables(|t| t.posts.iter().filter(|p| p.thread_id == thread_id).cloned().collect())
    }

    /// Every post flattened with its thread and collection, ready for indexing.
    pub fn records(&self) -> Vec<ContentRecord> {
        self.with_tables(|t| {
            t.posts
                .iter()
                .filter_map(|post| {
                    let thread = t.threads.iter().find(|th| th.id == post.thread_id)?;
                    let collection = t.collections.iter().find(|c| c.id == thread.collection_id)?;
                    Some(ContentRecord {
                        id: post.id,
                        thread_id: thread.id,
                        collection_id: collection.id,
                        collection_slug: collection.slug.clone(),
                        thread_title: thread.title.clone(),
                        body: post.body.clone(),
                        author: post.author.clone(),
                        created_at: post.created_at,
                    })
                })
                .collect()
        })
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create_collection(&self, name: &str, slug: &str, description: Option<&str>) -> anyhow::Result<CreatedEntity> {
        self.with_tables(|t| {
            if t.collections.iter().any(|c| c.slug == slug) {
                anyhow::bail!("collection slug '{slug}' already exists");
            }
            let id = t.next_id();
            let created_at = Utc::now();
            t.collections.push(StoredCollection {
                id,
                name: name.to_string(),
                slug: slug.to_string(),
                description: description.map(str::to_string),
                created_at,
            });
            Ok(CreatedEntity { id, created_at })
        })
    }

    async fn create_thread(&self, collection_id: i64, title: &str, body: &str, author: &str) -> anyhow::Result<CreatedThread> {
        self.with_tables(|t| {
            if !t.collections.iter().any(|c| c.id == collection_id) {
                return Err(Error::NotFound(format!("collection {collection_id}")).into());
            }
            let thread_id = t.next_id();
            let root_post_id = t.next_id();
            let created_at = Utc::now();
            t.threads.push(StoredThread { id: thread_id, collection_id, title: title.to_string(), root_post_id, created_at });
            t.posts.push(StoredPost {
                id: root_post_id,
                thread_id,
                parent_id: None,
                body: body.to_string(),
                author: author.to_string(),
                created_at,
            });
            Ok(CreatedThread { thread_id, root_post_id, created_at })
        })
    }

    async fn create_reply(&self, thread_id: i64, parent_post_id: i64, body: &str, author: &str) -> anyhow::Result<CreatedEntity> {
        self.with_tables(|t| {
            if !t.posts.iter().any(|p| p.id == parent_post_id && p.thread_id == thread_id) {
                return Err(Error::NotFound(format!("post {parent_post_id} in thread {thread_id}")).into());
            }
            let id = t.next_id();
            let created_at = Utc::now();
            t.posts.push(StoredPost {
                id,
                thread_id,
                parent_id: Some(parent_post_id),
                body: body.to_string(),
                author: author.to_string(),
                created_at,
            });
            Ok(CreatedEntity { id, created_at })
        })
    }
}
