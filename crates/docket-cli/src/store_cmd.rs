//! Store-backed subcommands, available with the `duckdb` feature.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use docket_core::model::DocumentType;
use docket_core::rows::{ContractRow, ResearchRow};
use docket_core::{DocumentFilter, RiskBand};
use docket_store::{DocumentFeed, DocumentRepository, DocumentStore, DuckStore};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

use crate::render;

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, env = "DOCKET_STORE", default_value = "docket.duckdb")]
    store: PathBuf,
    /// Substring match over document id, client name, and client email.
    #[arg(long)]
    search: Option<String>,
    /// contract or case_law.
    #[arg(long)]
    document_type: Option<DocumentType>,
    /// low, medium, or high.
    #[arg(long)]
    risk: Option<RiskBand>,
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(long, env = "DOCKET_STORE", default_value = "docket.duckdb")]
    store: PathBuf,
    id: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(long, env = "DOCKET_STORE", default_value = "docket.duckdb")]
    store: PathBuf,
    id: String,
    /// contract or case_law; picks the backing table.
    #[arg(long)]
    document_type: DocumentType,
}

#[derive(Args)]
pub struct WatchArgs {
    #[arg(long, env = "DOCKET_STORE", default_value = "docket.duckdb")]
    store: PathBuf,
}

#[derive(Args)]
pub struct SeedArgs {
    #[arg(long, env = "DOCKET_STORE", default_value = "docket.duckdb")]
    store: PathBuf,
}

fn open_store(path: &Path) -> anyhow::Result<Arc<DuckStore>> {
    let store = DuckStore::open_persistent(path)
        .with_context(|| format!("opening store at {}", path.display()))?;
    Ok(Arc::new(store))
}

fn repository(store: &Arc<DuckStore>) -> Arc<DocumentRepository> {
    let store: Arc<dyn DocumentStore> = Arc::clone(store);
    Arc::new(DocumentRepository::new(store))
}

pub async fn list(args: ListArgs) -> anyhow::Result<()> {
    let store = open_store(&args.store)?;
    let docs = repository(&store).fetch_all().await?;

    let filter = DocumentFilter {
        search: args.search,
        document_type: args.document_type,
        risk_band: args.risk,
    };
    render::print_document_table(&filter.apply(&docs));
    Ok(())
}

pub async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let store = open_store(&args.store)?;
    let docs = repository(&store).fetch_all().await?;

    match docs.iter().find(|doc| doc.id == args.id) {
        Some(doc) => {
            render::print_document_card(doc);
            Ok(())
        }
        None => anyhow::bail!("no document with id {}", args.id),
    }
}

pub async fn delete(args: DeleteArgs) -> anyhow::Result<()> {
    let store = open_store(&args.store)?;
    repository(&store)
        .delete(&args.id, args.document_type)
        .await
        .with_context(|| format!("deleting {}", args.id))?;
    println!("Deleted {}", args.id);
    Ok(())
}

pub async fn watch(args: WatchArgs) -> anyhow::Result<()> {
    let store = open_store(&args.store)?;
    let feed = Arc::new(DocumentFeed::new(repository(&store)));

    feed.refresh().await;
    render::print_feed(&feed.snapshot());

    let mut events = store.subscribe();
    info!("watching for changes, ctrl-c to stop");
    loop {
        match events.recv().await {
            // Event payloads are just refresh triggers, lag included.
            Ok(_) | Err(RecvError::Lagged(_)) => {
                feed.refresh().await;
                render::print_feed(&feed.snapshot());
            }
            Err(RecvError::Closed) => break,
        }
    }
    Ok(())
}

pub async fn seed(args: SeedArgs) -> anyhow::Result<()> {
    let store = open_store(&args.store)?;
    let now = chrono::Utc::now();

    store.insert_contract(&ContractRow {
        id: format!("demo-contract-{}", now.timestamp()),
        client_name: Some("Acme Corp".to_string()),
        client_email: Some("legal@acme.example".to_string()),
        document_type: Some("contract".to_string()),
        jurisdiction: Some("California".to_string()),
        confidence_score: Some("0.92".to_string()),
        recommendations: Some("Tighten the indemnification cap".to_string()),
        risk_level: Some("high".to_string()),
        precedent_cases: Some(r#"["Smith v. Jones (123 F.3d 456)"]"#.to_string()),
        analysis_summary: Some("Several high-risk clauses need attention.".to_string()),
        compliance_flags: Some(
            r#"["Privacy - MISSING data processing addendum"]"#.to_string(),
        ),
        extracted_clauses: Some(
            r#"[{"clause_type": "Indemnification", "clause_text": "Vendor shall indemnify Customer without limit.", "section": "Section 8", "risk_level": "critical"}]"#
                .to_string(),
        ),
        created_at: Some(now.to_rfc3339()),
        ..Default::default()
    })?;

    store.insert_research(&ResearchRow {
        id: now.timestamp(),
        client_name: Some("Blackstone LLP".to_string()),
        client_email: Some("research@blackstone.example".to_string()),
        document_type: Some("case_law".to_string()),
        jurisdiction: Some("Federal".to_string()),
        created_at: now.to_rfc3339(),
        research_summary: Some("Binding precedent supports our position.".to_string()),
        recommendations: Some("Move for summary judgment".to_string()),
        applicability_score: Some(8.0),
    })?;

    println!(
        "Seeded store: {} contract rows, {} research rows",
        store.contract_count()?,
        store.research_count()?
    );
    Ok(())
}
