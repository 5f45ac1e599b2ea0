use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::DateTime;
use std::sync::{Mutex, PoisonError};
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};

use agora_core::traits::FullTextBackend;
use agora_core::types::{ContentRecord, ScoredRecord, SearchFilters};

use crate::tantivy_utils::{build_schema, register_tokenizer};

const WRITER_HEAP_BYTES: usize = 20_000_000;

pub struct TantivyFullText {
	index: Index,
	reader: IndexReader,
	writer: Mutex<IndexWriter>,
	id_field: Field,
	thread_id_field: Field,
	collection_id_field: Field,
	collection_slug_field: Field,
	title_field: Field,
	body_field: Field,
	author_field: Field,
	created_field: Field,
}

impl TantivyFullText {
	pub fn in_memory() -> Result<Self> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		let writer = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
		Ok(Self {
			reader,
			writer: Mutex::new(writer),
			id_field: schema.get_field("id")?,
			thread_id_field: schema.get_field("thread_id")?,
			collection_id_field: schema.get_field("collection_id")?,
			collection_slug_field: schema.get_field("collection_slug")?,
			title_field: schema.get_field("thread_title")?,
			body_field: schema.get_field("body")?,
			author_field: schema.get_field("author")?,
			created_field: schema.get_field("created_at")?,
			index,
		})
	}

	/// Add records and make them searchable. Returns the number indexed.
	pub fn index_records(&self, records: &[ContentRecord]) -> Result<usize> {
		let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
		for r in records {
			let doc = doc!(
				self.id_field => r.id,
				self.thread_id_field => r.thread_id,
				self.collection_id_field => r.collection_id,
				self.collection_slug_field => r.collection_slug.clone(),
				self.title_field => r.thread_title.clone(),
				self.body_field => r.body.clone(),
				self.author_field => r.author.clone(),
				self.created_field => r.created_at.timestamp_millis(),
			);
			writer.add_document(doc)?;
		}
		writer.commit()?;
		self.reader.reload()?;
		tracing::debug!(count = records.len(), "indexed posts into tantivy");
		Ok(records.len())
	}

	pub fn num_docs(&self) -> u64 {
		self.reader.searcher().num_docs()
	}

	fn to_record(&self, doc: &TantivyDocument) -> Result<ContentRecord> {
		let text = |field: Field| doc.get_first(field).and_then(|v| v.as_str()).unwrap_or("").to_string();
		let int = |field: Field, name: &str| doc.get_first(field).and_then(|v| v.as_i64()).ok_or_else(|| anyhow!("stored doc missing '{name}'"));
		let created_ms = int(self.created_field, "created_at")?;
		Ok(ContentRecord {
			id: int(self.id_field, "id")?,
			thread_id: int(self.thread_id_field, "thread_id")?,
			collection_id: int(self.collection_id_field, "collection_id")?,
			collection_slug: text(self.collection_slug_field),
			thread_title: text(self.title_field),
			body: text(self.body_field),
			author: text(self.author_field),
			created_at: DateTime::from_timestamp_millis(created_ms).unwrap_or_default(),
		})
	}

	fn search_sync(&self, query: &str, filters: &SearchFilters, limit: usize) -> Result<Vec<ScoredRecord>> {
		if limit == 0 { return Ok(Vec::new()); }
		let searcher = self.reader.searcher();
		let qp = QueryParser::for_index(&self.index, vec![self.title_field, self.body_field]);
		let (q, errors) = qp.parse_query_lenient(query);
		if !errors.is_empty() { tracing::debug!(?errors, query, "lenient query parse dropped clauses"); }
		// Filters are checked on stored fields, so widen the window to the whole index.
		let fetch = if filters.is_empty() { limit } else { searcher.num_docs() as usize };
		let top_docs = searcher.search(&q, &TopDocs::with_limit(fetch.max(1)))?;
		let mut hits = Vec::new();
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			let record = self.to_record(&doc)?;
			if !filters.matches(&record) { continue; }
			hits.push(ScoredRecord::new(record, score));
			if hits.len() >= limit { break; }
		}
		Ok(hits)
	}
}

#[async_trait]
impl FullTextBackend for TantivyFullText {
	async fn search_text(&self, query: &str, filters: &SearchFilters, limit: usize) -> Result<Vec<ScoredRecord>> {
		self.search_sync(query, filters, limit)
	}
}
