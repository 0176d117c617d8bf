// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use resume_rag::pipeline::{print_failure, print_notice};
use resume_rag::utils::logging::{format_banner, format_section, format_success, init_logger};
use resume_rag::{
    Config, HealthCheck, HealthReport, LanceDbClient, MatchingSession, OllamaClient, QueryEngine,
    SchemaManager, Validator,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "resume_rag")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Local resume matching and Q&A with LanceDB and Ollama", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = resume_rag::config::DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Runs the interactive matching session when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the resumes and rebuild the vector index
    Index,

    /// Search the index by semantic similarity
    Search {
        /// Job description or search text
        query: String,

        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Answer one question from the indexed resumes
    Ask { question: String },

    Stats,

    /// Check Ollama and the index
    Health,

    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).context("Failed to load configuration")?
    };

    match cli.command {
        None => cmd_session(config).await?,
        Some(Commands::Index) => cmd_index(config).await?,
        Some(Commands::Search { query, limit }) => cmd_search(config, &query, limit).await?,
        Some(Commands::Ask { question }) => cmd_ask(config, &question).await?,
        Some(Commands::Stats) => cmd_stats(&config).await?,
        Some(Commands::Health) => cmd_health(config).await?,
        Some(Commands::Reset { confirm }) => cmd_reset(config, confirm).await?,
    }

    Ok(())
}

async fn cmd_session(config: Config) -> Result<()> {
    println!(
        "{}",
        format_banner(&[
            "AI-Powered ATS",
            "No API costs, complete privacy, local AI",
            format!("Powered by {}", config.llm.model).as_str(),
        ])
    );

    let mut session = MatchingSession::new(config);
    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    if let Err(e) = session.run(&mut input).await {
        error!("Session ended: {}", e);
        print_failure(&e.to_string());
    }

    Ok(())
}

async fn cmd_index(config: Config) -> Result<()> {
    let start_time = Instant::now();
    let session = MatchingSession::new(config);

    let resumes = session
        .process_resumes()
        .await
        .context("Resume processing failed")?;
    session
        .build_index(&resumes)
        .await
        .context("Failed to build the vector index")?;

    info!("Indexing complete in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

async fn cmd_search(config: Config, query: &str, limit: usize) -> Result<()> {
    Validator::validate_top_k(limit)?;
    info!("Searching for: {}", query);

    let preview_chars = config.session.preview_chars;
    let store = MatchingSession::new(config)
        .open_store()
        .await
        .context("Failed to open the vector index")?;

    let results = store
        .search(query, limit)
        .await
        .context("Vector search failed")?;

    if results.is_empty() {
        println!("\nNo results found for query: \"{}\"\n", query);
        println!("Try:");
        println!("  - Using different search terms");
        println!("  - Checking that resumes have been indexed");
        return Ok(());
    }

    println!("{}", format_section(&format!("Results for: \"{}\"", query)));
    for result in &results {
        println!("{}", result.format_summary(preview_chars));
    }

    Ok(())
}

async fn cmd_ask(config: Config, question: &str) -> Result<()> {
    let retrieval_k = config.session.retrieval_k;
    let llm_config = config.llm.clone();

    let store = MatchingSession::new(config)
        .open_store()
        .await
        .context("Failed to open the vector index")?;

    if !store.is_initialized().await? {
        print_notice("No index found. Run `resume_rag index` first.");
        return Ok(());
    }

    let mut engine = QueryEngine::new(store, llm_config, retrieval_k)
        .await
        .context("Failed to start the AI system")?;

    let start = Instant::now();
    let answer = engine.query(question).await;

    println!("\nAnswer: {}", answer);
    println!(
        "Query processed in: {}",
        resume_rag::format_time(start.elapsed())
    );
    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to create LanceDB client")?;

    if !client.ping().await? {
        error!("Cannot connect to LanceDB");
        return Err(anyhow::anyhow!("Database connection failed"));
    }

    if !SchemaManager::new(&client).verify_schema().await? {
        print_notice("No index found. Run `resume_rag index` first.");
        return Ok(());
    }

    let doc_count = client.get_document_count().await?;
    println!(
        "{}",
        format_success(&format!(
            "{} resumes indexed in {} (table '{}')",
            doc_count,
            client.uri(),
            client.table_name()
        ))
    );

    Ok(())
}

async fn cmd_health(config: Config) -> Result<()> {
    let mut checks = Vec::new();

    let ollama = OllamaClient::new(config.llm.clone())?;
    let start = Instant::now();
    match ollama.list_models().await {
        Ok(models) => {
            let mut missing: Vec<&str> = [config.llm.model.as_str(), config.embedding.model.as_str()]
                .into_iter()
                .filter(|model| !resume_rag::llm::model_available(&models, model))
                .collect();
            missing.dedup();

            if missing.is_empty() {
                checks.push(HealthCheck::healthy(
                    "ollama",
                    Some(format!("{} models installed", models.len())),
                    start.elapsed(),
                ));
            } else {
                checks.push(HealthCheck::degraded(
                    "ollama",
                    format!("missing models: {}", missing.join(", ")),
                    start.elapsed(),
                ));
            }
        }
        Err(e) => checks.push(HealthCheck::unhealthy(
            "ollama",
            e.to_string(),
            start.elapsed(),
        )),
    }

    let start = Instant::now();
    match LanceDbClient::new(config.database.clone()).await {
        Ok(client) => match client.get_document_count().await {
            Ok(0) => checks.push(HealthCheck::degraded(
                "lancedb",
                "index is empty".to_string(),
                start.elapsed(),
            )),
            Ok(count) => checks.push(HealthCheck::healthy(
                "lancedb",
                Some(format!("{} resumes indexed", count)),
                start.elapsed(),
            )),
            Err(e) => checks.push(HealthCheck::unhealthy(
                "lancedb",
                e.to_string(),
                start.elapsed(),
            )),
        },
        Err(e) => checks.push(HealthCheck::unhealthy(
            "lancedb",
            e.to_string(),
            start.elapsed(),
        )),
    }

    let report = HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string());
    println!("{}", report.format());

    Ok(())
}

async fn cmd_reset(config: Config, confirm: bool) -> Result<()> {
    if !confirm {
        error!("This will delete the resume index. Use --confirm to proceed");
        return Ok(());
    }

    warn!("Resetting index - all indexed resumes will be lost");

    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to create LanceDB client")?;

    SchemaManager::new(&client)
        .drop_all_tables()
        .await
        .context("Failed to drop tables")?;

    println!("{}", format_success("Index reset complete"));
    Ok(())
}
