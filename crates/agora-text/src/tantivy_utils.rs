use tantivy::schema::{Schema, TextFieldIndexing, TextOptions, IndexRecordOption, INDEXED, STRING, STORED};
use tantivy::tokenizer::{TextAnalyzer, SimpleTokenizer, LowerCaser, StopWordFilter};
use tantivy::Index;

pub const FORUM_TOKENIZER: &str = "forum_text";

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _id_field = schema_builder.add_i64_field("id", INDEXED | STORED);
	let _thread_id_field = schema_builder.add_i64_field("thread_id", STORED);
	let _collection_id_field = schema_builder.add_i64_field("collection_id", INDEXED | STORED);
	let _collection_slug_field = schema_builder.add_text_field("collection_slug", STRING | STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(FORUM_TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing).set_stored();
	let _title_field = schema_builder.add_text_field("thread_title", text_options.clone());
	let _body_field = schema_builder.add_text_field("body", text_options);
	let _author_field = schema_builder.add_text_field("author", STRING | STORED);
	let _created_field = schema_builder.add_i64_field("created_at", STORED);
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
	];
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(FORUM_TOKENIZER, tokenizer);
}
