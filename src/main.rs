use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reconfort::config::{Config, LogFormat};
use reconfort::corpus::Corpus;
use reconfort::history::SqliteHistoryStore;
use reconfort::orchestrator::{RecommendationDetails, RecommendationOrchestrator};
use reconfort::{FeedbackKind, UserContext};

#[derive(Parser)]
#[command(name = "reconfort", about = "Short affective-support quote recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Get one quote recommendation
    Recommend {
        /// Need category (e.g. calm, courage)
        #[arg(long)]
        need: Option<String>,
        /// Current mood (e.g. stressed, sad, tired)
        #[arg(long)]
        mood: Option<String>,
        /// Preferred tone: accompanying, neutral, direct, stoic, poetic
        #[arg(long)]
        tone: Option<String>,
        /// Energy ceiling, 1-3
        #[arg(long)]
        energy_cap: Option<u8>,
        /// Free-form text describing what is going on
        #[arg(long)]
        free_text: Option<String>,
        /// Label of the unified question flow
        #[arg(long)]
        question_label: Option<String>,
        /// Text of the unified question flow
        #[arg(long)]
        question_text: Option<String>,
    },
    /// Record feedback for a previously shown corpus quote
    Feedback {
        /// Quote id
        quote_id: String,
        /// up, mid or down
        kind: String,
    },
    /// Show the current history summary
    History,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    init_logging(&config);

    // A missing corpus only disables the local strategy; remote strategies
    // still work.
    let corpus = match Corpus::load(&config.corpus.path) {
        Ok(c) => {
            info!(path = %config.corpus.path.display(), quotes = c.len(), "Corpus loaded");
            Some(c)
        }
        Err(e) => {
            warn!(error = %e, "Corpus unavailable, rules strategy disabled");
            None
        }
    };

    let store = match SqliteHistoryStore::new(&config.database.path).await {
        Ok(s) => {
            info!(path = %config.database.path.display(), "History database ready");
            s
        }
        Err(e) => {
            error!(error = %e, "Failed to open history database");
            return Err(e.into());
        }
    };

    let mut orchestrator = match RecommendationOrchestrator::new(&config, corpus, store) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    let outcome = match cli.command {
        Command::Recommend {
            need,
            mood,
            tone,
            energy_cap,
            free_text,
            question_label,
            question_text,
        } => {
            let mut ctx = UserContext::new();
            ctx.need = need;
            ctx.mood = mood;
            ctx.free_text = free_text;
            ctx.question_label = question_label;
            ctx.question_text = question_text;
            if let Some(raw) = tone {
                match raw.parse() {
                    Ok(tone) => ctx.tone_pref = Some(tone),
                    Err(e) => {
                        eprintln!("{e}");
                        std::process::exit(2);
                    }
                }
            }
            if let Some(cap) = energy_cap {
                ctx = ctx.with_energy_cap(cap);
            }

            orchestrator.recommend(&ctx).await.map(|r| {
                println!("\"{}\"", r.text);
                if let Some(author) = &r.author {
                    println!("— {author}");
                }
                match &r.details {
                    RecommendationDetails::Rules {
                        need, tone, energy, ..
                    } => {
                        println!("[{} | need: {need} | tone: {tone} | energy: {energy}]", r.id);
                    }
                    RecommendationDetails::Search { score, .. } => {
                        println!("[{} | relevance: {score:.3}]", r.id);
                    }
                    RecommendationDetails::Generative { model, .. } => {
                        println!("[{} | generated by {model}]", r.id);
                    }
                }
            })
        }
        Command::Feedback { quote_id, kind } => {
            let kind: FeedbackKind = match kind.parse() {
                Ok(k) => k,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(2);
                }
            };
            orchestrator
                .feedback(&quote_id, kind)
                .await
                .map(|()| println!("Noted."))
        }
        Command::History => orchestrator.history_state().await.map(|state| {
            println!("Mode: {}", orchestrator.mode());
            let masked = orchestrator.masked_api_key();
            if !masked.is_empty() {
                println!("Generative key: {masked}");
            }
            println!("Seen quotes: {}", state.seen_ids.len());
            let mut likes: Vec<_> = state.likes.iter().collect();
            likes.sort();
            for (key, value) in likes {
                println!("  {key}: {value:+}");
            }
            if let Some(last) = &state.last_feedback {
                println!(
                    "Last feedback: {} on {} at {}",
                    last.kind.as_str(),
                    last.quote_id,
                    last.at.to_rfc3339()
                );
            }
        }),
    };

    if let Err(e) = outcome {
        error!(error = %e, "Request failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
