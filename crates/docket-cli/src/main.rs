use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use docket_core::model::{AnalysisKind, AnalysisRequest, DocumentType, FileAttachment};
use docket_core::normalize;
use docket_sync::WebhookClient;

mod render;
#[cfg(feature = "duckdb")]
mod store_cmd;

#[derive(Parser)]
#[command(
    name = "docket",
    version,
    about = "Legal document analysis intake and results browser"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a raw workflow payload into the canonical result shape.
    Normalize {
        /// Path to a JSON file, or `-` to read stdin.
        input: PathBuf,
        /// Print the canonical result as JSON instead of a card.
        #[arg(long)]
        json: bool,
    },
    /// Submit a document to the analysis workflow webhook.
    Submit(SubmitArgs),
    /// List analyzed documents.
    #[cfg(feature = "duckdb")]
    List(store_cmd::ListArgs),
    /// Show one document as a card.
    #[cfg(feature = "duckdb")]
    Show(store_cmd::ShowArgs),
    /// Delete a document's backing row.
    #[cfg(feature = "duckdb")]
    Delete(store_cmd::DeleteArgs),
    /// Watch for changes and reprint the document list.
    #[cfg(feature = "duckdb")]
    Watch(store_cmd::WatchArgs),
    /// Insert demo rows for local exploration.
    #[cfg(feature = "duckdb")]
    Seed(store_cmd::SeedArgs),
}

#[derive(Args)]
struct SubmitArgs {
    #[arg(long, env = "DOCKET_WEBHOOK_URL")]
    webhook_url: String,
    #[arg(long)]
    document_id: String,
    /// contract or case_law.
    #[arg(long)]
    document_type: DocumentType,
    #[arg(long)]
    client_name: String,
    #[arg(long)]
    client_email: String,
    /// Repeatable: risk_assessment, clause_extraction, precedent_search,
    /// legislative_update.
    #[arg(long = "analysis", required = true)]
    analysis_kinds: Vec<AnalysisKind>,
    #[arg(long)]
    case_id: Option<String>,
    #[arg(long)]
    jurisdiction: Option<String>,
    /// Document file to upload.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Alternative to --file: a URL the workflow can fetch itself.
    #[arg(long)]
    file_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Normalize { input, json } => cmd_normalize(&input, json),
        Command::Submit(args) => cmd_submit(args).await,
        #[cfg(feature = "duckdb")]
        Command::List(args) => store_cmd::list(args).await,
        #[cfg(feature = "duckdb")]
        Command::Show(args) => store_cmd::show(args).await,
        #[cfg(feature = "duckdb")]
        Command::Delete(args) => store_cmd::delete(args).await,
        #[cfg(feature = "duckdb")]
        Command::Watch(args) => store_cmd::watch(args).await,
        #[cfg(feature = "duckdb")]
        Command::Seed(args) => store_cmd::seed(args).await,
    }
}

fn cmd_normalize(input: &Path, json: bool) -> anyhow::Result<()> {
    let raw = if input == Path::new("-") {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("reading {}", input.display()))?
    };
    let value: serde_json::Value =
        serde_json::from_str(&raw).context("payload is not valid JSON")?;

    let result = normalize(&value);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render::print_result(&result);
    }
    Ok(())
}

async fn cmd_submit(args: SubmitArgs) -> anyhow::Result<()> {
    let file = match &args.file {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            Some(FileAttachment { file_name, bytes })
        }
        None => None,
    };

    let request = AnalysisRequest {
        document_id: args.document_id,
        document_type: args.document_type,
        client_name: args.client_name,
        client_email: args.client_email,
        analysis_kinds: args.analysis_kinds,
        case_id: args.case_id,
        jurisdiction: args.jurisdiction,
        file,
        file_url: args.file_url,
    };

    WebhookClient::new(args.webhook_url)
        .submit(&request)
        .await
        .context("submission failed")?;

    println!(
        "Submitted {} for analysis. Results land in the store once processing completes.",
        request.document_id
    );
    Ok(())
}
