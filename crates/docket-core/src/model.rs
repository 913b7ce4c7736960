//! Canonical document and analysis-result types.
//!
//! Every display surface consumes these shapes and nothing else: whatever the
//! external workflow or the backing tables emit is coerced here first, with
//! deterministic defaults for anything the source omits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of legal document submitted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Contract,
    CaseLaw,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::CaseLaw => "case_law",
        }
    }

    /// Title-case label the analysis webhook expects on submission.
    pub fn webhook_label(&self) -> &'static str {
        match self {
            Self::Contract => "Contract",
            Self::CaseLaw => "Case Law",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contract" => Ok(Self::Contract),
            "case_law" => Ok(Self::CaseLaw),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

/// Analysis the external workflow is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    RiskAssessment,
    ClauseExtraction,
    PrecedentSearch,
    LegislativeUpdate,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RiskAssessment => "risk_assessment",
            Self::ClauseExtraction => "clause_extraction",
            Self::PrecedentSearch => "precedent_search",
            Self::LegislativeUpdate => "legislative_update",
        }
    }
}

impl std::str::FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "risk_assessment" => Ok(Self::RiskAssessment),
            "clause_extraction" => Ok(Self::ClauseExtraction),
            "precedent_search" => Ok(Self::PrecedentSearch),
            "legislative_update" => Ok(Self::LegislativeUpdate),
            other => Err(format!("unknown analysis kind: {other}")),
        }
    }
}

/// Lifecycle of a submitted document.
///
/// Persisted rows only exist once the external workflow has finished writing
/// them, so the row decoders always produce `Completed`; the earlier states
/// describe a submission that has not landed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Queued,
    ExtractingText,
    Analyzing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::ExtractingText => "extracting_text",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Severity of a compliance flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Qualitative risk tier attached to an extracted clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Case-insensitive parse of a tier label from source data.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// A compliance issue surfaced by the analysis.
///
/// `id` is synthetic and positional (`flag-<i>`, `compliance-<i>`, or the
/// fixed `legislative-alert`); it is regenerated on every decode and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceFlag {
    pub id: String,
    pub category: String,
    pub description: String,
    pub severity: Severity,
    pub recommendation: String,
}

/// A clause pulled out of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedClause {
    /// Synthetic positional id, `clause-<i>`.
    pub id: String,
    pub clause_type: String,
    pub content: String,
    /// Positive page number, 1 when the source gives nothing parsable.
    pub page_number: u32,
    pub risk_level: RiskLevel,
    /// Optional sub-fields passed through from the structured workflow shape.
    pub risk_score: Option<f64>,
    pub key_concerns: Option<String>,
    pub suggested_language: Option<String>,
}

/// A precedent case relevant to the analyzed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecedentCase {
    /// Synthetic positional id, `case-<i>`.
    pub id: String,
    pub case_name: String,
    pub citation: String,
    /// Conventionally in [0, 1].
    pub relevance_score: f64,
    pub summary: String,
    /// For the legal-research workflow family this column carries the
    /// authority level (BINDING/PERSUASIVE/SECONDARY) rather than a
    /// geographic jurisdiction. Known schema wart, preserved read-for-read.
    pub jurisdiction: String,
    /// The source never reliably provides a filing year; defaults to the
    /// current calendar year.
    pub year: i32,
}

/// The canonical analysis outcome every display surface consumes.
///
/// Invariant: every field is populated with a deterministic default when the
/// source omits it, so rendering never needs to branch on absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub executive_summary: String,
    /// Conventionally in [0, 10], not clamped.
    pub risk_score: f64,
    /// Conventionally in [0, 1].
    pub confidence_score: f64,
    pub compliance_flags: Vec<ComplianceFlag>,
    pub extracted_clauses: Vec<ExtractedClause>,
    pub precedent_cases: Vec<PrecedentCase>,
    pub recommended_actions: Vec<String>,
    pub processing_time_seconds: f64,
}

/// A submitted document and whatever analysis has landed for it.
///
/// Value object: fully immutable after decode, replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// External document identifier as submitted by the client.
    pub document_id: String,
    pub document_type: DocumentType,
    pub client_name: String,
    pub client_email: String,
    pub case_id: Option<String>,
    pub jurisdiction: Option<String>,
    pub analysis_kinds: Vec<AnalysisKind>,
    pub status: ProcessingStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Present for completed analyses; a completed row with no results is
    /// tolerated and renders as "no results available".
    pub results: Option<AnalysisResult>,
}

/// A request to submit a document to the external analysis workflow.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub document_id: String,
    pub document_type: DocumentType,
    pub client_name: String,
    pub client_email: String,
    pub analysis_kinds: Vec<AnalysisKind>,
    pub case_id: Option<String>,
    pub jurisdiction: Option<String>,
    pub file: Option<FileAttachment>,
    pub file_url: Option<String>,
}

/// Raw document bytes attached to a submission.
#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_labels() {
        assert_eq!(DocumentType::Contract.as_str(), "contract");
        assert_eq!(DocumentType::CaseLaw.as_str(), "case_law");
        assert_eq!(DocumentType::Contract.webhook_label(), "Contract");
        assert_eq!(DocumentType::CaseLaw.webhook_label(), "Case Law");
    }

    #[test]
    fn document_type_round_trips_through_serde() {
        let json = serde_json::to_string(&DocumentType::CaseLaw).unwrap();
        assert_eq!(json, "\"case_law\"");
        let parsed: DocumentType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, DocumentType::CaseLaw);
    }

    #[test]
    fn analysis_kind_parse() {
        assert_eq!(
            "precedent_search".parse::<AnalysisKind>().unwrap(),
            AnalysisKind::PrecedentSearch
        );
        assert!("spell_check".parse::<AnalysisKind>().is_err());
    }

    #[test]
    fn risk_level_from_label_is_case_insensitive() {
        assert_eq!(RiskLevel::from_label("High"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_label("  CRITICAL "), Some(RiskLevel::Critical));
        assert_eq!(RiskLevel::from_label("severe"), None);
    }
}
