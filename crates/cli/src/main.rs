use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use insight_embedding_store::EmbeddingStore;
use insight_retrieval::{
    build_embedding_file, find_embedding_file, provider_from_env, SchemaCatalog, TableRetriever,
    DEFAULT_TOP_K,
};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "insight")]
#[command(about = "Semantic table retrieval for SQL assistance", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Override embedding model id
    #[arg(long, global = true)]
    embed_model: Option<String>,

    /// Override embeddings endpoint URL
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Copy, Clone, ValueEnum)]
enum EmbedMode {
    Api,
    Stub,
}

impl EmbedMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Stub => "stub",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Select the tables most relevant to a natural-language request
    Select(SelectArgs),
    /// Build the SQL-generation prompt for a request
    Prompt(PromptArgs),
    /// Embed an enriched schema file into an embedding store file
    Embed(EmbedArgs),
    /// Show record count and dimensionality of an embedding store file
    Inspect(InspectArgs),
}

#[derive(Args)]
struct SelectArgs {
    /// Embedding store file, or a database directory containing one
    #[arg(long)]
    store: PathBuf,

    /// Natural-language request
    #[arg(long)]
    query: String,

    /// Number of tables to return
    #[arg(short = 'k', long = "top-k", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Emit machine-readable JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PromptArgs {
    /// Embedding store file, or a database directory containing one
    #[arg(long)]
    store: PathBuf,

    /// Enriched schema file with table contexts
    #[arg(long)]
    schema: PathBuf,

    /// Natural-language request
    #[arg(long)]
    query: String,

    /// Number of tables to include
    #[arg(short = 'k', long = "top-k", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
}

#[derive(Args)]
struct EmbedArgs {
    /// Enriched schema file with table contexts
    #[arg(long)]
    schema: PathBuf,

    /// Embedding store file to write
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args)]
struct InspectArgs {
    /// Embedding store file, or a database directory containing one
    #[arg(long)]
    store: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    if let Some(mode) = cli.embed_mode {
        env::set_var("INSIGHT_EMBEDDING_MODE", mode.as_str());
    }
    if let Some(model) = &cli.embed_model {
        env::set_var("INSIGHT_EMBEDDING_MODEL", model);
    }
    if let Some(url) = &cli.api_url {
        env::set_var("INSIGHT_EMBEDDING_URL", url);
    }

    // Keep stdout clean for JSON parsing
    let json_output = match &cli.command {
        Commands::Select(args) => args.json,
        _ => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Select(args) => run_select(args).await,
        Commands::Prompt(args) => run_prompt(args).await,
        Commands::Embed(args) => run_embed(args).await,
        Commands::Inspect(args) => run_inspect(&args),
    }
}

/// Accept either the embedding file itself or the per-database directory
/// holding it.
fn resolve_store_path(path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        let found = find_embedding_file(path)?;
        log::info!("Using embedding file {}", found.display());
        Ok(found)
    } else {
        Ok(path.to_path_buf())
    }
}

fn load_store(path: &Path) -> Result<EmbeddingStore> {
    let path = resolve_store_path(path)?;
    EmbeddingStore::load(&path)
        .with_context(|| format!("Failed to load embedding store {}", path.display()))
}

async fn run_select(args: SelectArgs) -> Result<()> {
    ensure!(!args.query.trim().is_empty(), "Query must not be empty");

    let provider = provider_from_env()?;
    let store = load_store(&args.store)?;
    let query_embedding = provider.embed(&args.query).await?;
    let matches = store.select_top_k(&query_embedding, args.top_k)?;

    if args.json {
        let rows: Vec<serde_json::Value> = matches
            .iter()
            .map(|m| serde_json::json!({ "table": &m.identifier, "score": m.score }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for m in &matches {
            println!("{:.4}  {}", m.score, m.identifier);
        }
    }
    Ok(())
}

async fn run_prompt(args: PromptArgs) -> Result<()> {
    let provider = provider_from_env()?;
    let store = load_store(&args.store)?;
    let catalog = SchemaCatalog::load(&args.schema)
        .with_context(|| format!("Failed to load schema catalog {}", args.schema.display()))?;

    let retriever = TableRetriever::new(store, catalog, provider);
    let prompt = retriever.sql_prompt(&args.query, args.top_k).await?;
    println!("{prompt}");
    Ok(())
}

async fn run_embed(args: EmbedArgs) -> Result<()> {
    let provider = provider_from_env()?;
    let catalog = SchemaCatalog::load(&args.schema)
        .with_context(|| format!("Failed to load schema catalog {}", args.schema.display()))?;

    let written = build_embedding_file(&catalog, provider.as_ref(), &args.output).await?;
    println!(
        "Wrote {written} table embeddings to {}",
        args.output.display()
    );
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> Result<()> {
    let store = load_store(&args.store)?;
    match store.dimension() {
        Some(dimension) => println!("{} records, dimension {dimension}", store.len()),
        None => println!("0 records"),
    }
    Ok(())
}
