//! Terminal rendering: vertical cards for single results, a compact table
//! for document lists.

use docket_core::RiskBand;
use docket_core::model::AnalysisResult;

const MAX_LIST_ITEMS: usize = 10;
const MAX_TEXT_WIDTH: usize = 72;

/// Print a canonical result as a vertical card grouped by section.
pub fn print_result(result: &AnalysisResult) {
    println!("Summary");
    println!("  {}", result.executive_summary);
    println!();

    println!("Scores");
    println!(
        "  {:<22} {:.1} ({})",
        "risk_score",
        result.risk_score,
        RiskBand::from_score(result.risk_score).as_str()
    );
    println!("  {:<22} {:.2}", "confidence_score", result.confidence_score);
    if result.processing_time_seconds > 0.0 {
        println!(
            "  {:<22} {:.1}s",
            "processing_time", result.processing_time_seconds
        );
    }
    println!();

    if !result.compliance_flags.is_empty() {
        println!("Compliance Flags ({})", result.compliance_flags.len());
        for flag in result.compliance_flags.iter().take(MAX_LIST_ITEMS) {
            println!(
                "  [{}] {}: {}",
                flag.severity.as_str(),
                flag.category,
                truncate(&flag.description, MAX_TEXT_WIDTH)
            );
        }
        print_overflow(result.compliance_flags.len());
        println!();
    }

    if !result.extracted_clauses.is_empty() {
        println!("Extracted Clauses ({})", result.extracted_clauses.len());
        for clause in result.extracted_clauses.iter().take(MAX_LIST_ITEMS) {
            println!(
                "  p.{:<4} {} [{}]",
                clause.page_number,
                clause.clause_type,
                clause.risk_level.as_str()
            );
            if !clause.content.is_empty() {
                println!("        {}", truncate(&clause.content, MAX_TEXT_WIDTH));
            }
        }
        print_overflow(result.extracted_clauses.len());
        println!();
    }

    if !result.precedent_cases.is_empty() {
        println!("Precedent Cases ({})", result.precedent_cases.len());
        for case in result.precedent_cases.iter().take(MAX_LIST_ITEMS) {
            println!(
                "  {} ({})  relevance {:.1}",
                case.case_name, case.citation, case.relevance_score
            );
            println!("        {}", truncate(&case.summary, MAX_TEXT_WIDTH));
        }
        print_overflow(result.precedent_cases.len());
        println!();
    }

    println!("Recommended Actions");
    for action in &result.recommended_actions {
        println!("  - {}", action);
    }
}

fn print_overflow(total: usize) {
    if total > MAX_LIST_ITEMS {
        println!("  ... and {} more", total - MAX_LIST_ITEMS);
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(feature = "duckdb")]
pub use table::{print_document_card, print_document_table, print_feed};

#[cfg(feature = "duckdb")]
mod table {
    use super::{print_result, truncate};
    use docket_core::RiskBand;
    use docket_core::model::Document;
    use docket_store::FeedSnapshot;

    /// Print a single document with its identity block and results card.
    pub fn print_document_card(doc: &Document) {
        println!("=== {} ===", doc.document_id);
        println!("  {:<22} {}", "type", doc.document_type.as_str());
        println!("  {:<22} {}", "client", doc.client_name);
        if !doc.client_email.is_empty() {
            println!("  {:<22} {}", "email", doc.client_email);
        }
        if let Some(case_id) = &doc.case_id {
            println!("  {:<22} {}", "case_id", case_id);
        }
        if let Some(jurisdiction) = &doc.jurisdiction {
            println!("  {:<22} {}", "jurisdiction", jurisdiction);
        }
        let kinds: Vec<&str> = doc.analysis_kinds.iter().map(|k| k.as_str()).collect();
        println!("  {:<22} {}", "analysis", kinds.join(", "));
        println!("  {:<22} {}", "status", doc.status.as_str());
        println!(
            "  {:<22} {}",
            "created",
            doc.created_at.format("%Y-%m-%d %H:%M")
        );
        println!();

        match &doc.results {
            Some(results) => print_result(results),
            None => println!("No results available"),
        }
    }

    /// Print a document list as a compact table, one row each.
    pub fn print_document_table(docs: &[&Document]) {
        if docs.is_empty() {
            println!("No documents");
            return;
        }
        println!(
            "{:<20} {:<9} {:<22} {:>5} {:<7} {}",
            "ID", "TYPE", "CLIENT", "RISK", "BAND", "CREATED"
        );
        for doc in docs {
            let (risk, band) = match &doc.results {
                Some(results) => (
                    format!("{:.1}", results.risk_score),
                    RiskBand::from_score(results.risk_score).as_str(),
                ),
                None => ("-".to_string(), "-"),
            };
            println!(
                "{:<20} {:<9} {:<22} {:>5} {:<7} {}",
                truncate(&doc.id, 20),
                doc.document_type.as_str(),
                truncate(&doc.client_name, 22),
                risk,
                band,
                doc.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    /// Print the feed's current state: error banner or document table.
    pub fn print_feed(snapshot: &FeedSnapshot) {
        if let Some(error) = &snapshot.error {
            println!("! {error}");
            return;
        }
        let docs: Vec<&Document> = snapshot.documents.iter().collect();
        print_document_table(&docs);
        println!();
    }
}
