use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use faqbot::chat::{ChatSession, Reply};
use faqbot::config::Config;
use faqbot::store::{load_or_seed, JsonFileStore, KnowledgeStore, MemoryStore};
use faqbot::text::{Normalizer, Stopwords};
use faqbot::Engine;

#[derive(Parser)]
#[command(name = "faqbot", about = "FAQ assistant with a teach-me flow", version)]
struct Cli {
    /// YAML config file (default: ./faqbot.yaml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Confidence threshold in [0, 1]
    #[arg(long, global = true)]
    threshold: Option<f32>,

    /// Knowledge file (JSON)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Stopword list, one word per line
    #[arg(long, global = true)]
    stopwords: Option<PathBuf>,

    /// Keep learned answers in memory only
    #[arg(long, global = true)]
    no_persist: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat (default)
    Chat,
    /// Answer a single question
    Ask { question: String },
    /// Teach an answer and save it
    Learn { question: String, answer: String },
    /// Print every known question and answer
    List,
    /// Show the best-scoring questions for a query
    Top {
        question: String,
        #[arg(short, default_value_t = 3)]
        k: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let mut config = Config::discover(cli.config.as_deref(), &cwd)?;
    if let Some(t) = cli.threshold {
        config.threshold = t;
    }
    if let Some(p) = cli.store.clone() {
        config.store_path = p;
    }
    if let Some(p) = cli.stopwords.clone() {
        config.stopwords_path = Some(p);
    }

    let stopwords = Stopwords::load(config.stopwords_path.as_deref())
        .context("cannot start without a stopword list")?;
    let threshold = config.threshold()?;

    let store: Box<dyn KnowledgeStore> = if cli.no_persist {
        Box::new(MemoryStore::new())
    } else {
        Box::new(JsonFileStore::new(&config.store_path))
    };

    let corpus = load_or_seed(store.as_ref(), config.seed_corpus());
    let engine = Engine::initialize(corpus, Normalizer::new(stopwords), threshold)
        .context("cannot build question index")?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(engine, store, &config.greeting),
        Command::Ask { question } => {
            let result = engine.ask(&question);
            match result.answer {
                Some(answer) => println!("{answer}"),
                None => println!(
                    "I don't know that one yet (best score {:.2} < {threshold}).",
                    result.score
                ),
            }
            Ok(())
        }
        Command::Learn { question, answer } => {
            let engine = engine.learn(&question, &answer)?;
            store
                .save(engine.corpus())
                .with_context(|| format!("cannot save to {}", store.describe()))?;
            println!("Learned. {} entries known.", engine.corpus().len());
            Ok(())
        }
        Command::List => {
            for (i, entry) in engine.corpus().iter().enumerate() {
                println!("{:>3}. {}\n     {}", i + 1, entry.question, entry.answer);
            }
            Ok(())
        }
        Command::Top { question, k } => {
            for (ranked, entry) in engine.top(&question, k) {
                println!("{:.3}  {}", ranked.score, entry.question);
            }
            Ok(())
        }
    }
}

/// Log to stderr so the transcript on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default = if verbose { "faqbot=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn run_chat(engine: Engine, store: Box<dyn KnowledgeStore>, greeting: &str) -> Result<()> {
    let mut session = ChatSession::new(engine, store);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    writeln!(stdout, "Bot: {greeting}\n")?;
    loop {
        write!(stdout, "You: ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }
        if line.trim() == "/quit" {
            break;
        }

        if let Some(reply) = session.handle(&line) {
            if let Reply::Answer { score, .. } = &reply {
                debug!(score, "answered");
            }
            writeln!(stdout, "Bot: {}\n", reply.message())?;
        }
    }
    Ok(())
}
