use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use agora_core::traits::ProgressSink;
use agora_core::types::{ProgressEvent, Stage};

/// Renders seeding progress as a terminal bar, one tick per thread.
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    pub fn new(threads: usize) -> Result<Self> {
        let bar = ProgressBar::new(threads as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} threads {msg}")?
                .progress_chars("#>-"),
        );
        Ok(Self { bar })
    }

    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    pub fn position(&self) -> u64 { self.bar.position() }
}

impl ProgressSink for ProgressBarSink {
    fn publish(&self, event: &ProgressEvent) -> Result<()> {
        match (event.stage, event.task) {
            (Stage::Thread, _) => {
                self.bar.inc(1);
                self.bar.set_message(event.message.clone());
            }
            (Stage::Error, Some(task)) => {
                // Tasks that fail still count toward the total.
                self.bar.inc(1);
                self.bar.println(format!("thread {task} failed: {}", event.message));
            }
            (Stage::Error, None) => self.bar.abandon_with_message(format!("failed: {}", event.message)),
            (Stage::Done, _) => self.bar.finish_with_message(event.message.clone()),
            _ => self.bar.set_message(event.message.clone()),
        }
        Ok(())
    }
}
