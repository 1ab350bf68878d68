use anyhow::Context;
use clap::Parser;
use neko_core::{ContentStore, ConversationState, NekoConfig};
use neko_reasoning::Responder;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod command;

use command::Command;

#[derive(Parser, Debug)]
#[command(name = "neko", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "neko.toml", env = "NEKO_CONFIG")]
    config: PathBuf,

    /// Directory of JSON content resources (overrides the config)
    #[arg(long)]
    content: Option<PathBuf>,

    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Starting mood (overrides the config)
    #[arg(long, allow_hyphen_values = true)]
    mood: Option<i32>,
}

fn main() -> anyhow::Result<()> {
    // Chat goes to stdout; logs stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(mood) = args.mood {
        config.mood.initial = Some(mood);
    }
    if let Some(dir) = args.content {
        config.content.dir = Some(dir);
    }

    let content = match &config.content.dir {
        Some(dir) => ContentStore::load_dir(dir)
            .with_context(|| format!("Failed to load content from {}", dir.display()))?,
        None => ContentStore::builtin().context("Built-in content is invalid")?,
    };
    let responder = Responder::new(Arc::new(content), &config).context("Invalid configuration")?;

    let mut rng = match args.seed {
        Some(seed) => {
            info!("Seeding RNG with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut state = responder.new_state();
    run(&responder, &config, &mut state, &mut rng)
}

/// A missing file means defaults; a present but broken one is an error.
fn load_config(path: &Path) -> anyhow::Result<NekoConfig> {
    if path.exists() {
        info!("Loading config from {}", path.display());
        NekoConfig::load(path)
    } else {
        NekoConfig::load_or_default(path).context("Invalid configuration")
    }
}

fn run(
    responder: &Responder,
    config: &NekoConfig,
    state: &mut ConversationState,
    rng: &mut StdRng,
) -> anyhow::Result<()> {
    let persona = &config.persona;
    println!("{}", persona.scene);
    println!("{} is here.\n", persona.name);

    let mut editor = rustyline::DefaultEditor::new().context("Failed to open line editor")?;

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(trimmed) {
            tracing::debug!("Failed to record history entry: {}", e);
        }

        match Command::parse(trimmed) {
            Some(Command::Status) => {
                println!(
                    "[Mood: {} | Turn: {}] ({})",
                    state.mood,
                    state.turn(),
                    responder.mood_model().zone(state.mood)
                );
                continue;
            }
            Some(Command::Sleep) => {
                println!("{}", persona.farewell);
                break;
            }
            None => {}
        }

        let (text, exit) = responder.respond(trimmed, state, rng).into_parts();
        println!("{}", text);
        if exit {
            break;
        }
    }

    info!("Session ended after {} turns at mood {}", state.turn(), state.mood);
    Ok(())
}
