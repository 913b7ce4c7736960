//! Persisted row shapes for the two backing tables.
//!
//! The external workflow writes finished analyses into one of two tables
//! with disjoint column sets. Columns are loosely typed by history: scores
//! arrive as text, list columns have held JSON arrays, JSON objects,
//! comma-joined text, and single plain sentences. Timestamps are ISO 8601
//! strings on the wire.

use serde::{Deserialize, Serialize};

/// Backing table for contract analyses.
pub const CONTRACT_TABLE: &str = "contract_analysis";
/// Backing table for legal research.
pub const RESEARCH_TABLE: &str = "legal_research";

/// One row of the contract-analysis table. Every non-key column is nullable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractRow {
    pub id: String,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub document_type: Option<String>,
    pub jurisdiction: Option<String>,
    /// Written by the workflow, never read by the decoder.
    pub comparable_firm_cases: Option<String>,
    /// Numeric score stored as text.
    pub confidence_score: Option<String>,
    pub recommendations: Option<String>,
    /// Free text: a numeric string or a tier word (low/medium/high/critical).
    pub risk_level: Option<String>,
    /// JSON-or-CSV list column.
    pub precedent_cases: Option<String>,
    pub analysis_summary: Option<String>,
    /// Legacy spelling of the summary column, present on older rows only.
    pub executive_summary: Option<String>,
    /// JSON-or-CSV list column.
    pub compliance_flags: Option<String>,
    /// JSON-or-CSV list column.
    pub extracted_clauses: Option<String>,
    /// ISO 8601 timestamp string.
    pub created_at: Option<String>,
}

/// One row of the legal-research table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchRow {
    pub id: i64,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub document_type: Option<String>,
    pub jurisdiction: Option<String>,
    /// ISO 8601 timestamp string; this table's column is non-null.
    pub created_at: String,
    pub research_summary: Option<String>,
    pub recommendations: Option<String>,
    pub applicability_score: Option<f64>,
}
