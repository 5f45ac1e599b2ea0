use std::env;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tracing_subscriber::EnvFilter;

use agora_cli::commands::{self, format_result};
use agora_cli::corpus::sample_records;
use agora_cli::ProgressBarSink;
use agora_core::config::{resolve_with_base, AgoraSettings, Config};
use agora_core::types::{GenerationJob, SearchMode, SearchOptions};

const USAGE: &str = "Usage:
  agora search <query> [--mode full_text|semantic|hybrid] [--limit N] [--offset N] [--config PATH]
  agora seed <collection> [threads] [replies] [--tone T] [--decorate] [--config PATH]";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() { eprintln!("{USAGE}"); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

/// Remove `--name value` from `args`, returning the value.
fn take_option(args: &mut Vec<String>, name: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == name) else { return Ok(None) };
    if pos + 1 >= args.len() { bail!("{name} needs a value"); }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(pos) => { args.remove(pos); true }
        None => false,
    }
}

fn parse_number(value: Option<String>, what: &str) -> Result<Option<usize>> {
    value.map(|v| v.parse::<usize>().map_err(|_| anyhow!("{what} must be a non-negative integer, got '{v}'"))).transpose()
}

fn load_settings(args: &mut Vec<String>) -> Result<AgoraSettings> {
    let config = match take_option(args, "--config")? {
        Some(path) => Config::load_from(&resolve_with_base(&env::current_dir()?, path)),
        None => Config::load(),
    }
    .map_err(|e| { eprintln!("Error loading config: {e:#}"); e })?;
    config.settings()
}

async fn run_search(mut args: Vec<String>) -> Result<()> {
    let settings = load_settings(&mut args)?;
    let mode = take_option(&mut args, "--mode")?.map(|m| m.parse::<SearchMode>()).transpose()?.unwrap_or_default();
    let limit = parse_number(take_option(&mut args, "--limit")?, "--limit")?.unwrap_or(settings.search.default_limit);
    let offset = parse_number(take_option(&mut args, "--offset")?, "--offset")?.unwrap_or(0);
    let query = args.join(" ");

    let engine = commands::build_search(&settings, &sample_records()).await?;
    let options = SearchOptions::new(query.clone()).with_mode(mode).with_limit(limit).with_offset(offset);
    let results = commands::search(&engine, &options).await?;
    if results.is_empty() {
        println!("No results for '{query}'");
        return Ok(());
    }
    for (i, result) in results.iter().enumerate() {
        println!("{}", format_result(offset + i + 1, result));
    }
    Ok(())
}

async fn run_seed(mut args: Vec<String>) -> Result<()> {
    let settings = load_settings(&mut args)?;
    let tone = take_option(&mut args, "--tone")?;
    let decorate = take_flag(&mut args, "--decorate");
    let mut positional = args.into_iter();
    let collection = positional.next().ok_or_else(|| anyhow!("missing collection name\n{USAGE}"))?;
    let threads = parse_number(positional.next(), "threads")?.unwrap_or(5);
    let replies = parse_number(positional.next(), "replies")?.unwrap_or(3);

    let mut job = GenerationJob::new(collection, threads, replies).decorated(decorate);
    if let Some(tone) = tone {
        job = job.with_tone(tone);
    }
    let sink = Arc::new(ProgressBarSink::new(job.thread_count)?);
    let outcome = commands::seed(&settings, job, sink).await?;

    let status = outcome.status.ok_or_else(|| anyhow!("seed job produced no progress"))?;
    if status.failed {
        let reason = status.last.map(|e| e.message).unwrap_or_default();
        bail!("seeding failed: {reason}");
    }
    for thread in outcome.store.threads() {
        let replies = outcome.store.posts_in_thread(thread.id).len().saturating_sub(1);
        println!("#{} {} ({replies} replies)", thread.id, thread.title);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "search" => run_search(args).await,
        "seed" => run_seed(args).await,
        _ => { eprintln!("Unknown command: {cmd}\n{USAGE}"); std::process::exit(1); }
    }
}
