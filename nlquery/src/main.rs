//! Natural-language question answering over databases and documents.
//!
//! This binary wires the nlquery core pipelines to the command line: SQL
//! questions against a live database, document questions against a
//! persisted fragment index, and maintenance of that index.
//!
//! # Security Guarantees
//! - Generated SQL with a destructive keyword is never executed
//! - No credentials stored or logged
//! - Pipeline failures surface as short public messages only

use clap::Parser;
use nlquery::{
    Cli, Command, CompletionArgs, DatabaseArgs, DocsArgs, DocumentArgs, IndexCommand, SqlArgs,
    exit_code, output,
};
use nlquery_core::{
    AskResponse, DatabaseAdapter, DocumentAssistant, DocumentIndexer, OpenAiCompletionClient,
    Result, SchemaIntrospector, SqlAssistant,
    adapters::{create_adapter, create_adapter_with_config},
    error::redact_database_url,
    logging::init_logging,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(
        cli.global.verbose,
        cli.global.quiet,
        cli.global.log_format.into(),
    )?;

    let result = match &cli.command {
        Command::Sql(args) => ask_database(args).await,
        Command::Docs(args) => ask_documents(args).await,
        Command::Index(IndexCommand::Rebuild(args)) => maintain_index(args, true).await,
        Command::Index(IndexCommand::Reconcile(args)) => maintain_index(args, false).await,
        Command::Schema(args) => print_schema(args).await,
        Command::Test(args) => test_connection(args).await,
        Command::List => {
            println!("{}", output::supported_sources());
            Ok(())
        }
    };

    if let Err(e) = result {
        error!(kind = ?e.kind(), "{}", e);
        eprintln!("Error: {}", e.public_message());
        std::process::exit(exit_code(e.kind()));
    }
    Ok(())
}

/// Connects to the database named by `args`.
async fn connect(args: &DatabaseArgs) -> Result<Arc<dyn DatabaseAdapter>> {
    info!("Target: {}", redact_database_url(&args.database_url));

    let adapter = match args.connection_config()? {
        Some(config) => create_adapter_with_config(&args.database_url, Some(config)).await,
        None => create_adapter(&args.database_url).await,
    }
    .map_err(|e| {
        error!("Failed to create database adapter: {}", e);
        e
    })?;

    info!("Created {} adapter", adapter.database_type());
    Ok(Arc::from(adapter))
}

fn completion_client(args: &CompletionArgs) -> Result<Arc<OpenAiCompletionClient>> {
    let config = args.completion_config()?;
    info!("Using model {}", config.model);
    Ok(Arc::new(OpenAiCompletionClient::new(config)?))
}

/// Answers a question from the database.
async fn ask_database(args: &SqlArgs) -> Result<()> {
    let adapter = connect(&args.database).await?;
    let client = completion_client(&args.completion)?;
    let assistant = SqlAssistant::new(adapter.clone(), adapter, client);

    let result = assistant.answer(&args.question).await;
    print_answer(result, args.json)
}

/// Answers a question from the indexed documents.
async fn ask_documents(args: &DocsArgs) -> Result<()> {
    let client = completion_client(&args.completion)?;
    let assistant = DocumentAssistant::new(args.index_path.clone(), client);

    let result = assistant.answer(&args.question).await;
    print_answer(result, args.json)
}

/// Rebuilds or reconciles the fragment index.
async fn maintain_index(args: &DocumentArgs, rebuild: bool) -> Result<()> {
    let indexer = DocumentIndexer::new(args.index_config()?)?;
    info!(
        "{} index {} from {}",
        if rebuild { "Rebuilding" } else { "Reconciling" },
        indexer.config().index_path.display(),
        indexer.config().documents_dir.display()
    );

    let report = if rebuild {
        indexer.rebuild().await?
    } else {
        indexer.reconcile_persisted().await?
    };

    println!("{}", output::render_index_report(&report, args.json)?);
    Ok(())
}

/// Prints the schema description the generator would send.
async fn print_schema(args: &DatabaseArgs) -> Result<()> {
    let adapter = connect(args).await?;
    let schema = SchemaIntrospector::new(adapter).describe_schema().await?;
    println!("{}", schema.render()?);
    Ok(())
}

/// Tests database connection without asking anything.
async fn test_connection(args: &DatabaseArgs) -> Result<()> {
    info!("Testing database connection...");
    let adapter = connect(args).await?;

    adapter.test_connection().await.map_err(|e| {
        error!("Connection test failed: {}", e);
        e
    })?;

    info!("✓ Connection test successful");
    println!(
        "Connection to {} database successful",
        adapter.database_type()
    );
    Ok(())
}

/// Prints the answer contract. A failed question exits with the status of
/// its failure kind once the contract is out.
fn print_answer(result: Result<String>, json: bool) -> Result<()> {
    println!(
        "{}",
        output::render_answer(&AskResponse::from_result(&result), json)?
    );

    if let Err(e) = result {
        error!(kind = ?e.kind(), "Question failed: {}", e);
        std::process::exit(exit_code(e.kind()));
    }
    Ok(())
}
