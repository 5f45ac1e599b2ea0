//! Support code for the `agora` binary: an offline text generator, a
//! terminal progress sink and the bundled search corpus.

pub mod commands;
pub mod corpus;
pub mod generator;
pub mod progress_bar;

pub use generator::TemplateGenerator;
pub use progress_bar::ProgressBarSink;
