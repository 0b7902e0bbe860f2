//! termplay demo binary.
//!
//! Runs a coordinator with two bots that pair through a join code and play
//! a first-to-N duel, then logs the result.
//!
//! # Usage
//!
//! ```bash
//! # First to 5, results kept in memory
//! termplay-demo --target 5
//!
//! # Persist results to a redb file and watch per-second scores
//! termplay-demo --db results.redb --log-level debug
//! ```

mod bot;

use std::{path::PathBuf, sync::Arc, time::Duration};

use bot::{Bot, Role};
use clap::Parser;
use termplay_core::GameId;
use termplay_games::duel_registry;
use termplay_proto::Event;
use termplay_server::{
    Coordinator, CoordinatorConfig, MemoryResultSink, RedbResultSink, ResultSink, SessionHandle,
    SessionRegistry, SystemEnv,
};
use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Two bots playing termplay online
#[derive(Parser, Debug)]
#[command(name = "termplay-demo")]
#[command(about = "Pair two bots through a lobby and let them play")]
#[command(version)]
struct Args {
    /// Points needed to win
    #[arg(short, long, default_value = "5")]
    target: u32,

    /// Simulation ticks per second
    #[arg(long, default_value = "60")]
    tick_rate: u32,

    /// End the match as stalled after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Probability a bot presses on any given tick
    #[arg(long, default_value = "0.05")]
    press_chance: f64,

    /// Seed for the bots' decisions
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Persist match results to this redb file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    match args.db.clone() {
        Some(path) => {
            tracing::info!(path = %path.display(), "persisting results to redb");
            let sink = RedbResultSink::open(&path)?;
            run(&args, sink.clone()).await?;
            settle(|| sink.list().map_or(0, |records| records.len()), 1).await;
            for record in sink.list()? {
                tracing::info!(
                    match_id = %record.match_id,
                    reason = %record.reason,
                    winner = record.winner,
                    duration_ms = record.duration_ms,
                    "stored result"
                );
            }
        },
        None => {
            let sink = MemoryResultSink::new();
            run(&args, sink.clone()).await?;
            settle(|| sink.len(), 1).await;
            for record in sink.records() {
                tracing::info!(
                    match_id = %record.match_id,
                    reason = %record.reason,
                    winner = record.winner,
                    ticks = record.ticks,
                    "recorded result"
                );
            }
        },
    }

    Ok(())
}

async fn run<S: ResultSink>(args: &Args, sink: S) -> Result<(), Box<dyn std::error::Error>> {
    let config = CoordinatorConfig {
        tick_rate_hz: args.tick_rate,
        max_match_ticks: args.max_ticks,
        ..Default::default()
    };
    let buffer = config.session_buffer_size;

    let registry = Arc::new(SessionRegistry::new());
    let coordinator = Coordinator::new(
        config,
        SystemEnv::new(),
        Arc::clone(&registry),
        duel_registry(args.target),
        sink,
    )?
    .spawn();

    let host = SessionHandle::new("host-bot", buffer);
    let guest = SessionHandle::new("guest-bot", buffer);
    registry.register(host.clone());
    registry.register(guest.clone());

    let (code_tx, code_rx) = oneshot::channel();
    let host_bot = Bot::new(coordinator.clone(), host, args.seed, args.press_chance);
    let guest_bot =
        Bot::new(coordinator.clone(), guest, args.seed.wrapping_add(1), args.press_chance);

    let host_task =
        tokio::spawn(host_bot.play(Role::Host { game_id: GameId::from("duel"), code_tx }));
    let guest_task = tokio::spawn(guest_bot.play(Role::Guest { code_rx }));

    let (host_result, guest_result) = tokio::join!(host_task, guest_task);
    for (bot, result) in [("host-bot", host_result?), ("guest-bot", guest_result?)] {
        match result {
            Ok(Event::MatchEnded { reason, winner, score1, score2, .. }) => {
                tracing::info!(bot, %reason, ?winner, score1, score2, "match ended");
            },
            Ok(other) => tracing::warn!(bot, event = other.kind(), "unexpected final event"),
            Err(e) => tracing::warn!(bot, error = %e, "bot stopped early"),
        }
    }

    coordinator.shutdown().await;
    Ok(())
}

/// Results are persisted in the background; give the write a moment to land.
async fn settle(mut stored: impl FnMut() -> usize, expected: usize) {
    for _ in 0..50 {
        if stored() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tracing::warn!(expected, "match result not persisted yet");
}
