//! Row decoders: persisted table rows → canonical [`Document`]s.
//!
//! Both decoders share the workflow normalizer's contract of never failing:
//! missing and malformed columns decode to deterministic defaults. The two
//! table shapes are disjoint, so each gets its own decoder.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::fields::{current_year, page_from_section, read_number, read_string, value_text};
use crate::model::{
    AnalysisKind, AnalysisResult, ComplianceFlag, Document, DocumentType, ExtractedClause,
    PrecedentCase, ProcessingStatus, RiskLevel, Severity,
};
use crate::rows::{ContractRow, ResearchRow};

/// Decode a loosely-typed list column.
///
/// `None`/blank → empty. A strict JSON parse is attempted first: an array
/// yields its elements, any other parsed value becomes a single element.
/// On parse failure the text is split on commas, trimmed, empties dropped.
pub fn parse_list_field(value: Option<&str>) -> Vec<Value> {
    let Some(raw) = value else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) => Vec::new(),
        Ok(other) => vec![other],
        Err(_) => raw
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(|piece| Value::String(piece.to_string()))
            .collect(),
    }
}

// ── Contract-analysis rows ──

/// Decode one contract-analysis row. Never fails.
pub fn decode_contract_row(row: &ContractRow) -> Document {
    let year = current_year();

    let compliance_flags = parse_list_field(row.compliance_flags.as_deref())
        .iter()
        .filter_map(value_text)
        .enumerate()
        .map(|(i, flag)| ComplianceFlag {
            id: format!("flag-{i}"),
            category: "Compliance".to_string(),
            description: flag,
            severity: Severity::Warning,
            recommendation: "Review this compliance issue".to_string(),
        })
        .collect();

    // This row shape does not separate case name from citation, so every
    // text-bearing field carries the raw string.
    let precedent_cases = parse_list_field(row.precedent_cases.as_deref())
        .iter()
        .filter_map(value_text)
        .enumerate()
        .map(|(i, raw)| PrecedentCase {
            id: format!("case-{i}"),
            case_name: raw.clone(),
            citation: raw.clone(),
            relevance_score: 0.8,
            summary: raw,
            jurisdiction: row
                .jurisdiction
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            year,
        })
        .collect();

    let results = AnalysisResult {
        executive_summary: non_empty(row.analysis_summary.as_deref())
            .or_else(|| non_empty(row.executive_summary.as_deref()))
            .unwrap_or_else(|| "No summary available".to_string()),
        risk_score: risk_score_from_text(row.risk_level.as_deref()),
        confidence_score: row
            .confidence_score
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0.85),
        compliance_flags,
        extracted_clauses: decode_clause_column(&parse_list_field(
            row.extracted_clauses.as_deref(),
        )),
        precedent_cases,
        recommended_actions: row.recommendations.clone().map(|r| vec![r]).unwrap_or_default(),
        processing_time_seconds: 0.0,
    };

    // Rows only exist once the workflow has finished writing them.
    let created_at = parse_timestamp(row.created_at.as_deref());
    Document {
        id: row.id.clone(),
        document_id: row.id.clone(),
        document_type: DocumentType::Contract,
        client_name: non_empty(row.client_name.as_deref())
            .unwrap_or_else(|| "Unknown".to_string()),
        client_email: row.client_email.clone().unwrap_or_default(),
        case_id: None,
        jurisdiction: row.jurisdiction.clone(),
        analysis_kinds: vec![AnalysisKind::RiskAssessment, AnalysisKind::ClauseExtraction],
        status: ProcessingStatus::Completed,
        created_at,
        completed_at: Some(created_at),
        results: Some(results),
    }
}

/// Risk column free text: numeric string first, then a tier word.
///
/// An absent/blank column is 0 (nothing was scored); an unrecognized word is
/// the medium default 5.
fn risk_score_from_text(value: Option<&str>) -> f64 {
    let raw = value.unwrap_or_default().trim();
    if raw.is_empty() {
        return 0.0;
    }
    if let Ok(score) = raw.parse::<f64>() {
        return score;
    }
    match raw.to_ascii_lowercase().as_str() {
        "low" => 2.0,
        "medium" => 5.0,
        "high" => 8.0,
        "critical" => 10.0,
        _ => 5.0,
    }
}

/// Decode the clause column, whose shape has drifted over the system's
/// history. The shape is detected structurally from the first element;
/// unrecognized shapes decode to no clauses rather than an error.
fn decode_clause_column(items: &[Value]) -> Vec<ExtractedClause> {
    match items.first() {
        None => Vec::new(),
        // Objects carrying a clause-text field are the fully structured
        // workflow shape; other objects get the loose key fallbacks.
        Some(Value::Object(first)) => {
            if first.contains_key("clause_text") || first.contains_key("Clause Text") {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, clause)| structured_clause(i, clause))
                    .collect()
            } else {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, clause)| loose_clause(i, clause))
                    .collect()
            }
        }
        // One bare string, or a list of plain strings: one generic clause
        // each, numbered sequentially.
        Some(Value::String(_)) => items
            .iter()
            .filter_map(value_text)
            .enumerate()
            .map(|(i, content)| generic_clause(i, content))
            .collect(),
        Some(other) => {
            warn!(kind = ?other, "unrecognized clause column shape, dropping");
            Vec::new()
        }
    }
}

fn structured_clause(index: usize, clause: &Value) -> ExtractedClause {
    ExtractedClause {
        id: format!("clause-{index}"),
        clause_type: read_string(clause, &["clause_type", "Clause Type"])
            .unwrap_or_else(|| "Unknown".to_string()),
        content: read_string(clause, &["clause_text", "Clause Text", "content"])
            .unwrap_or_default(),
        page_number: clause_page(clause),
        risk_level: clause_risk(clause),
        risk_score: read_number(clause, &["risk_score", "Risk Score"]),
        key_concerns: read_string(clause, &["key_concerns", "Key Concerns"]),
        suggested_language: read_string(clause, &["suggested_language", "Suggested Language"]),
    }
}

fn loose_clause(index: usize, clause: &Value) -> ExtractedClause {
    ExtractedClause {
        id: format!("clause-{index}"),
        clause_type: read_string(clause, &["clause_type", "type", "name", "title"])
            .unwrap_or_else(|| "Unknown".to_string()),
        content: read_string(clause, &["clause_text", "text", "description", "content"])
            .unwrap_or_default(),
        page_number: clause_page(clause),
        risk_level: clause_risk(clause),
        risk_score: None,
        key_concerns: None,
        suggested_language: None,
    }
}

fn generic_clause(index: usize, content: String) -> ExtractedClause {
    ExtractedClause {
        id: format!("clause-{index}"),
        clause_type: format!("Clause {}", index + 1),
        content,
        page_number: 1,
        risk_level: RiskLevel::Medium,
        risk_score: None,
        key_concerns: None,
        suggested_language: None,
    }
}

fn clause_page(clause: &Value) -> u32 {
    if let Some(page) = read_number(clause, &["page_number", "page"])
        && page >= 1.0
    {
        return page as u32;
    }
    page_from_section(read_string(clause, &["section", "Section"]).as_deref())
}

fn clause_risk(clause: &Value) -> RiskLevel {
    read_string(clause, &["risk_level", "Risk Level"])
        .and_then(|label| RiskLevel::from_label(&label))
        .unwrap_or(RiskLevel::Medium)
}

// ── Legal-research rows ──

/// Decode one legal-research row. Never fails.
///
/// Unlike the research *workflow* family, this row shape carries no case
/// list: flags, clauses, and cases are all empty.
pub fn decode_research_row(row: &ResearchRow) -> Document {
    let results = AnalysisResult {
        executive_summary: non_empty(row.research_summary.as_deref())
            .unwrap_or_else(|| "No summary available".to_string()),
        risk_score: row.applicability_score.unwrap_or(0.0),
        confidence_score: 0.85,
        compliance_flags: Vec::new(),
        extracted_clauses: Vec::new(),
        precedent_cases: Vec::new(),
        recommended_actions: row.recommendations.clone().map(|r| vec![r]).unwrap_or_default(),
        processing_time_seconds: 0.0,
    };

    let created_at = parse_timestamp(Some(&row.created_at));
    Document {
        id: row.id.to_string(),
        document_id: row.id.to_string(),
        document_type: DocumentType::CaseLaw,
        client_name: non_empty(row.client_name.as_deref())
            .unwrap_or_else(|| "Unknown".to_string()),
        client_email: row.client_email.clone().unwrap_or_default(),
        case_id: None,
        jurisdiction: row.jurisdiction.clone(),
        analysis_kinds: vec![AnalysisKind::PrecedentSearch],
        status: ProcessingStatus::Completed,
        created_at,
        completed_at: Some(created_at),
        results: Some(results),
    }
}

// ── Shared helpers ──

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Parse an ISO 8601 timestamp, tolerating the space-separated variant some
/// stores emit. Absent or unparsable timestamps become "now".
fn parse_timestamp(value: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = value else {
        return Utc::now();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return naive.and_utc();
    }
    warn!(raw, "unparsable created_at, substituting now");
    Utc::now()
}
