//! Lexibattle terminal game
//!
//! Plays vocabulary rounds in the terminal against a JSON word file:
//! 1. The word file is attached as the backend after a short delay
//! 2. The cache bootstraps while it waits for the backend
//! 3. Each round mounts the chosen question type and reads answers from stdin
//!
//! Usage:
//!   lexibattle --words words.json --question-type spell --rounds 5

use anyhow::Result;
use clap::Parser;
use lexibattle_cache::{BackendHandle, VocabularyCache};
use lexibattle_cli::{plugin_table, ConsoleRender, JsonFileBackend, ScoreBoard, Stage, Verdict};
use lexibattle_engine::{AnswerRouter, EngineConfig, QuestionOrchestrator};
use lexibattle_plugin_host::PluginRegistry;
use lexibattle_types::Difficulty;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "lexibattle")]
#[command(about = "Vocabulary battle rounds in the terminal")]
struct Args {
    /// JSON word file (array of {"term", "translation"} rows)
    #[arg(short, long)]
    words: PathBuf,

    /// Engine config file
    #[arg(short, long, default_value = "lexibattle.toml")]
    config: PathBuf,

    /// Question type id to play
    #[arg(short = 't', long, default_value = "1")]
    question_type: String,

    /// Difficulty, 1-5 or easy/medium/hard
    #[arg(short, long, default_value = "1")]
    difficulty: Difficulty,

    /// Number of rounds
    #[arg(short, long, default_value = "5")]
    rounds: u32,

    /// Delay before the word file is attached as the backend
    #[arg(long, default_value = "300")]
    connect_delay_ms: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = EngineConfig::load_from(&args.config);
    let backend = JsonFileBackend::load(&args.words, &config.cache.table)?;

    let handle = BackendHandle::new();
    let delayed = handle.clone();
    let delay = Duration::from_millis(args.connect_delay_ms);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        delayed.install(Arc::new(backend));
        info!("Word file attached after {:?}", delay);
    });

    let stage = Arc::new(Stage::new());
    let score = Arc::new(ScoreBoard::default());
    let cache = Arc::new(VocabularyCache::new(config.cache.clone(), handle));
    let registry = Arc::new(PluginRegistry::new(Arc::new(plugin_table(
        &config,
        Arc::clone(&stage),
    ))));
    let router = Arc::new(AnswerRouter::new(config.router.clone()).with_battle(score.clone()));
    let orchestrator =
        QuestionOrchestrator::new(config, cache, registry, Arc::new(ConsoleRender), router);

    match orchestrator.bootstrap_cache().await {
        Ok(n) => info!("Vocabulary ready with {} entries", n),
        Err(e) => warn!("Vocabulary bootstrap failed: {}", e),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    'rounds: for round in 1..=args.rounds {
        info!("Round {}/{}", round, args.rounds);
        if orchestrator
            .load_type(args.question_type.as_str(), args.difficulty)
            .await
            .is_err()
        {
            break;
        }
        if let Err(e) = orchestrator.settle().await {
            warn!("Question failed to start: {}", e);
            break;
        }

        loop {
            let Some(prompt) = stage.prompt() else {
                break;
            };
            println!("{prompt}");
            let Some(line) = lines.next_line().await? else {
                break 'rounds;
            };
            match stage.submit(&line) {
                Verdict::Correct => {
                    println!("Correct!");
                    break;
                }
                Verdict::Wrong { expected } => println!("Wrong, it was '{expected}'."),
                Verdict::Idle => break,
            }
        }
    }

    orchestrator.teardown().await;
    orchestrator.cache().shutdown();

    let history = orchestrator.router().history();
    println!("\n========================================");
    println!("  Hits:   {}", score.hits());
    println!("  Misses: {}", score.misses());
    println!("  Learned:");
    for entry in &history {
        println!("    {} — {}", entry.term, entry.translation);
    }
    println!("========================================\n");

    Ok(())
}
