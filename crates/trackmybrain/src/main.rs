//! Command-line client for the TrackMyBrain memory store.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;
use trackmybrain::config::{LayeredConfigOptions, TrackMyBrainConfig};
use trackmybrain::core::AssistantOptions;
use trackmybrain::memory::{
    FileSnapshotBackend, IdGenerator, MemoryKind, MemoryRecord, MemoryStore, SnapshotMemoryStore,
    StoreOptions, build_context,
};

/// Command-line options.
#[derive(Parser)]
#[command(name = "trackmybrain", version)]
struct Cli {
    /// Extra trackmybrain.json5 files applied over user and project config
    #[arg(long = "config")]
    configs: Vec<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a new memory
    Add {
        /// Memory kind: text, image, voice or video
        #[arg(long, default_value = "text")]
        kind: MemoryKind,
        /// Raw note text
        #[arg(long, default_value = "")]
        text: String,
        /// Short summary shown in listings and context
        #[arg(long, default_value = "")]
        summary: String,
        /// Comma-separated embedding, e.g. 0.1,0.2,0.3
        #[arg(long)]
        embedding: Option<String>,
        /// Location of attached media
        #[arg(long)]
        media_uri: Option<String>,
    },
    /// List the newest memories
    List {
        /// Maximum number of memories (defaults to assistant.recent_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Render the retrieval context for a query embedding
    Context {
        /// Query text, used for logging only
        #[arg(long, default_value = "")]
        query: String,
        /// Comma-separated query embedding
        #[arg(long)]
        embedding: String,
        /// Number of memories to include (defaults to retrieval.top_k)
        #[arg(long)]
        k: Option<usize>,
    },
}

/// Entry point for the TrackMyBrain CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trackmybrain::init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli.configs)?;
    let store = open_store(&config)?;

    match cli.command {
        Command::Add {
            kind,
            text,
            summary,
            embedding,
            media_uri,
        } => {
            let raw_text = text.trim();
            let summary = summary.trim();
            if raw_text.is_empty() && summary.is_empty() {
                bail!("a memory needs --text or --summary");
            }
            let (id, created_at) = IdGenerator::new().next();
            let mut record = MemoryRecord::new(id, kind, raw_text, summary, created_at);
            if let Some(embedding) = embedding {
                record = record.with_embedding(parse_embedding(&embedding)?);
            }
            if let Some(media_uri) = media_uri {
                record = record.with_media_uri(media_uri);
            }
            let id = record.id.clone();
            store
                .insert_memory(record)
                .await
                .context("failed to store memory")?;
            println!("{id}");
        }
        Command::List { limit } => {
            let options = AssistantOptions::from_config(&config);
            let limit = limit.unwrap_or(options.recent_limit);
            for record in store.get_recent(limit).await {
                println!("{}", list_line(&record, &options));
            }
        }
        Command::Context {
            query,
            embedding,
            k,
        } => {
            let query_embedding = parse_embedding(&embedding)?;
            let mut options = AssistantOptions::from_config(&config).context;
            if let Some(k) = k {
                options.k = k;
            }
            let records = store.get_all().await;
            let context = build_context(&query, &query_embedding, &records, &options);
            if context.used_fallback {
                println!("(no embedded memories; answer without context)");
            } else {
                println!("{}", context.text);
            }
        }
    }
    Ok(())
}

fn load_config(runtime_paths: &[PathBuf]) -> anyhow::Result<TrackMyBrainConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    for path in runtime_paths {
        options = options.with_runtime_path(path);
    }
    let layered = TrackMyBrainConfig::load_layered_with_options(options)
        .context("failed to load configuration")?;
    debug!("config layers loaded (count={})", layered.layers.len());
    Ok(layered.config)
}

fn open_store(
    config: &TrackMyBrainConfig,
) -> anyhow::Result<SnapshotMemoryStore<FileSnapshotBackend>> {
    let root = config.storage.resolved_path();
    info!("opening memory store (root={})", root.display());
    let options = StoreOptions {
        key: config.storage.key.clone(),
        reject_duplicate_ids: config.storage.reject_duplicate_ids,
    };
    SnapshotMemoryStore::open(&root, options)
        .with_context(|| format!("failed to open memory store at {}", root.display()))
}

/// Parse `0.1,0.2,0.3` into a vector; blanks between commas are rejected.
fn parse_embedding(raw: &str) -> anyhow::Result<Vec<f32>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|part| -> anyhow::Result<f32> {
            let part = part.trim();
            let value: f32 = part
                .parse()
                .with_context(|| format!("invalid embedding component {part:?}"))?;
            if !value.is_finite() {
                bail!("embedding component {part:?} is not finite");
            }
            Ok(value)
        })
        .collect()
}

fn list_line(record: &MemoryRecord, options: &AssistantOptions) -> String {
    let headline = if record.summary.is_empty() {
        &record.raw_text
    } else {
        &record.summary
    };
    let embedded = if record.ranking_embedding().is_some() {
        "*"
    } else {
        " "
    };
    format!(
        "{} {embedded} [{}] {} {headline}",
        record.created_at_display(options.context.utc_offset),
        record.kind,
        record.id
    )
}
