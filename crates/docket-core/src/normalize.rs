//! Workflow-output normalizer.
//!
//! The analysis workflow is external and unversioned. Across runs it has
//! wrapped its payload in `json`/`data`/`output` envelopes, switched between
//! Title-Case and snake_case keys, and emitted two distinct output families
//! (contract analysis and legal research). [`normalize`] turns any of that
//! into one [`AnalysisResult`], and returns a generic fallback rather than
//! an error when the shape is unrecognized.

use serde_json::Value;
use tracing::warn;

use crate::fields::{
    current_year, first_present, has_any_key, page_from_section, read_array, read_number,
    read_string, value_text,
};
use crate::model::{
    AnalysisResult, ComplianceFlag, ExtractedClause, PrecedentCase, RiskLevel, Severity,
};

/// Known workflow output families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFamily {
    LegalResearch,
    ContractAnalysis,
}

/// Signature keys per family, evaluated top to bottom; first hit wins.
///
/// Legal research is checked first: `Recommendations` is a catch-all key it
/// shares with the contract family, which names its own recommendation field
/// differently. Reordering these entries changes classification.
const FAMILY_DISPATCH: &[(OutputFamily, &[&str])] = &[
    (
        OutputFamily::LegalResearch,
        &[
            "Research Summary",
            "research_summary",
            "Case Analysis",
            "case_analysis",
            "Applicability Score",
            "applicability_score",
            "Recommendations",
        ],
    ),
    (
        OutputFamily::ContractAnalysis,
        &[
            "Analysis Summary",
            "analysis_summary",
            "Extracted Clauses",
            "extracted_clauses",
            "Risk Score",
            "risk_score",
        ],
    ),
];

/// Normalize a raw workflow response into the canonical result shape.
///
/// Never fails: the worst case is a generic result with placeholder text and
/// empty collections.
pub fn normalize(raw: &Value) -> AnalysisResult {
    let output = unwrap_payload(raw);
    match detect_family(output) {
        Some(OutputFamily::LegalResearch) => decode_research(output),
        Some(OutputFamily::ContractAnalysis) => decode_contract(output),
        None => {
            warn!("unrecognized workflow output shape, using generic fallback");
            decode_fallback(output)
        }
    }
}

/// Peel the envelopes the workflow has historically wrapped results in.
///
/// A top-level array is replaced by its first element; then `json`, `data`,
/// and `output` are each tried in that fixed order against the current value
/// (sequentially, not exclusively).
fn unwrap_payload(raw: &Value) -> &Value {
    let mut current = match raw {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    };
    for envelope in ["json", "data", "output"] {
        if let Some(inner) = current.get(envelope).filter(|v| !v.is_null()) {
            current = inner;
        }
    }
    current
}

fn detect_family(output: &Value) -> Option<OutputFamily> {
    FAMILY_DISPATCH
        .iter()
        .find_map(|(family, keys)| has_any_key(output, keys).then_some(*family))
}

// ── Contract-analysis family ──

fn decode_contract(output: &Value) -> AnalysisResult {
    let year = current_year();

    let compliance_flags = read_array(output, &["Compliance Flags", "compliance_flags"])
        .map(|items| {
            items
                .iter()
                .filter_map(value_text)
                .enumerate()
                .map(|(i, flag)| contract_flag(i, &flag))
                .collect()
        })
        .unwrap_or_default();

    let extracted_clauses = read_array(output, &["Extracted Clauses", "extracted_clauses"])
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, clause)| contract_clause(i, clause))
                .collect()
        })
        .unwrap_or_default();

    let precedent_cases = read_array(output, &["Precedent Cases", "precedent_cases"])
        .map(|items| {
            items
                .iter()
                .filter_map(value_text)
                .enumerate()
                .map(|(i, raw)| contract_case(i, &raw, year))
                .collect()
        })
        .unwrap_or_default();

    AnalysisResult {
        executive_summary: read_string(
            output,
            &[
                "Analysis Summary",
                "analysis_summary",
                "Executive Summary",
                "executive_summary",
            ],
        )
        .unwrap_or_else(|| "Analysis completed successfully.".to_string()),
        risk_score: read_number(output, &["Risk Score", "risk_score"]).unwrap_or(0.0),
        confidence_score: read_number(output, &["Confidence Score", "confidence_score"])
            .unwrap_or(0.8),
        compliance_flags,
        extracted_clauses,
        precedent_cases,
        recommended_actions: read_string(
            output,
            &["Recommended Action", "recommended_action", "Recommendations"],
        )
        .map(|action| vec![action])
        .unwrap_or_else(|| vec!["Review the analysis and take appropriate action".to_string()]),
        processing_time_seconds: read_number(output, &["Processing Time", "processing_time"])
            .unwrap_or(0.0),
    }
}

/// Structure a free-text compliance flag of the form `<category> - <detail>`.
fn contract_flag(index: usize, flag: &str) -> ComplianceFlag {
    let (category, description) = match flag.split_once(" - ") {
        Some((head, rest)) => (
            if head.is_empty() { "Compliance" } else { head }.to_string(),
            if rest.is_empty() { flag } else { rest }.to_string(),
        ),
        None => (
            if flag.is_empty() { "Compliance" } else { flag }.to_string(),
            flag.to_string(),
        ),
    };

    // NON-COMPLIANT must be checked before COMPLIANT: the former contains
    // the latter as a substring.
    let upper = flag.to_uppercase();
    let severity = if upper.contains("CRITICAL") || upper.contains("NON-COMPLIANT") {
        Severity::Critical
    } else if upper.contains("INCOMPLETE") || upper.contains("MISSING") {
        Severity::Warning
    } else if upper.contains("COMPLIANT") {
        Severity::Info
    } else {
        Severity::Warning
    };

    ComplianceFlag {
        id: format!("compliance-{index}"),
        category,
        description,
        severity,
        recommendation: "Review and address this compliance issue".to_string(),
    }
}

fn contract_clause(index: usize, clause: &Value) -> ExtractedClause {
    ExtractedClause {
        id: format!("clause-{index}"),
        clause_type: read_string(clause, &["clause_type", "Clause Type"])
            .unwrap_or_else(|| "Unknown".to_string()),
        content: read_string(clause, &["clause_text", "Clause Text", "content"])
            .unwrap_or_default(),
        page_number: page_from_section(read_string(clause, &["section", "Section"]).as_deref()),
        risk_level: read_string(clause, &["risk_level", "Risk Level"])
            .and_then(|label| RiskLevel::from_label(&label))
            .unwrap_or(RiskLevel::Medium),
        risk_score: read_number(clause, &["risk_score", "Risk Score"]),
        key_concerns: read_string(clause, &["key_concerns", "Key Concerns"]),
        suggested_language: read_string(clause, &["suggested_language", "Suggested Language"]),
    }
}

/// Parse a precedent string of the form `<case name> (<citation>)`.
fn contract_case(index: usize, raw: &str, year: i32) -> PrecedentCase {
    let span = first_parenthetical(raw);
    let citation = span
        .map(|(open, close)| raw[open + 1..close].to_string())
        .unwrap_or_else(|| raw.to_string());
    let case_name = span
        .map(|(open, close)| {
            let joined = format!("{}{}", &raw[..open], &raw[close + 1..]);
            joined.trim().to_string()
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| raw.to_string());

    PrecedentCase {
        id: format!("case-{index}"),
        case_name,
        citation,
        relevance_score: 0.8,
        summary: format!("Relevant precedent: {raw}"),
        jurisdiction: "Unknown".to_string(),
        year,
    }
}

/// Byte span `(open, close)` of the first `( ... )` pair with non-empty
/// contents. Pairs with nothing between them are skipped, matching the lax
/// pattern this format has historically been parsed with.
fn first_parenthetical(raw: &str) -> Option<(usize, usize)> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'(' {
            let rel = bytes[i + 1..].iter().position(|&b| b == b')')?;
            if rel > 0 {
                return Some((i, i + 1 + rel));
            }
        }
        i += 1;
    }
    None
}

// ── Legal-research family ──

fn decode_research(output: &Value) -> AnalysisResult {
    let year = current_year();

    let precedent_cases = read_array(output, &["Case Analysis", "case_analysis"])
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, case)| research_case(i, case, year))
                .collect()
        })
        .unwrap_or_default();

    let mut compliance_flags = Vec::new();
    if let Some(alert) = first_present(output, &["Legislative Alert", "legislative_alert"])
        && alert.is_object()
    {
        let statute = read_string(alert, &["statute", "Statute"]);
        // "UNKNOWN" is the workflow's sentinel for "no alert to report".
        if statute.as_deref() != Some("UNKNOWN") {
            let impact = read_string(alert, &["impact", "Impact"]).unwrap_or_default();
            compliance_flags.push(ComplianceFlag {
                id: "legislative-alert".to_string(),
                category: "Legislative Update".to_string(),
                description: format!("{}: {}", statute.unwrap_or_default(), impact),
                severity: Severity::Warning,
                recommendation: "Review recent legislative changes".to_string(),
            });
        }
    }

    AnalysisResult {
        executive_summary: read_string(output, &["Research Summary", "research_summary"])
            .unwrap_or_else(|| "Legal research completed successfully.".to_string()),
        // The applicability score doubles as the generic risk score for
        // uniform display; it is already on a 1-10 scale.
        risk_score: read_number(output, &["Applicability Score", "applicability_score"])
            .unwrap_or(5.0),
        // This family carries no confidence field.
        confidence_score: 0.85,
        compliance_flags,
        // This family never produces clauses.
        extracted_clauses: Vec::new(),
        precedent_cases,
        recommended_actions: read_string(
            output,
            &["Recommendations", "recommendation", "Recommendation"],
        )
        .map(|action| vec![action])
        .unwrap_or_else(|| vec!["Review the research findings and proceed accordingly".to_string()]),
        processing_time_seconds: 0.0,
    }
}

fn research_case(index: usize, case: &Value, year: i32) -> PrecedentCase {
    let citation = read_string(case, &["citation", "Citation"]);
    let case_name = citation
        .as_deref()
        .map(|c| c.split(',').next().unwrap_or(c).trim().to_string())
        .unwrap_or_else(|| "Unknown Case".to_string());
    let applicability =
        read_number(case, &["Applicability Score", "applicability_score"]).unwrap_or(5.0);

    PrecedentCase {
        id: format!("case-{index}"),
        case_name,
        citation: citation.unwrap_or_else(|| "No citation".to_string()),
        // Remap the 1-10 applicability scale onto [0, 1].
        relevance_score: applicability / 10.0,
        summary: read_string(
            case,
            &[
                "holding",
                "Holding",
                "Applicability to Our Case",
                "applicability_to_our_case",
            ],
        )
        .unwrap_or_else(|| "No summary available".to_string()),
        // Authority level, not a geographic jurisdiction. See PrecedentCase.
        jurisdiction: read_string(case, &["Authority Level", "authority_level"])
            .unwrap_or_else(|| "Unknown".to_string()),
        year,
    }
}

// ── Generic fallback ──

fn decode_fallback(output: &Value) -> AnalysisResult {
    AnalysisResult {
        executive_summary: read_string(
            output,
            &[
                "Research Summary",
                "Analysis Summary",
                "research_summary",
                "analysis_summary",
            ],
        )
        .unwrap_or_else(|| "Analysis completed but results format is unexpected.".to_string()),
        risk_score: read_number(
            output,
            &[
                "Risk Score",
                "Applicability Score",
                "risk_score",
                "applicability_score",
            ],
        )
        .unwrap_or(0.0),
        confidence_score: read_number(output, &["Confidence Score", "confidence_score"])
            .unwrap_or(0.0),
        compliance_flags: Vec::new(),
        extracted_clauses: Vec::new(),
        precedent_cases: Vec::new(),
        recommended_actions: read_string(output, &["Recommendations", "recommendation"])
            .map(|action| vec![action])
            .unwrap_or_else(|| vec!["Please review the analysis".to_string()]),
        processing_time_seconds: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_yields_generic_fallback() {
        let result = normalize(&json!({}));
        assert_eq!(
            result.executive_summary,
            "Analysis completed but results format is unexpected."
        );
        assert_eq!(result.risk_score, 0.0);
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.compliance_flags.is_empty());
        assert!(result.extracted_clauses.is_empty());
        assert!(result.precedent_cases.is_empty());
        assert_eq!(result.recommended_actions, vec!["Please review the analysis"]);
    }

    #[test]
    fn fallback_picks_up_loose_fields() {
        let result = normalize(&json!({
            "Confidence Score": 0.4,
            "recommendation": "Escalate to counsel"
        }));
        assert_eq!(result.confidence_score, 0.4);
        assert_eq!(result.recommended_actions, vec!["Escalate to counsel"]);
    }

    #[test]
    fn research_family_detected_and_decoded() {
        let result = normalize(&json!({"Research Summary": "x", "Applicability Score": 7}));
        assert_eq!(result.executive_summary, "x");
        assert_eq!(result.risk_score, 7.0);
        assert_eq!(result.confidence_score, 0.85);
        assert!(result.extracted_clauses.is_empty());
    }

    #[test]
    fn contract_family_detected_and_decoded() {
        let result = normalize(&json!({
            "Analysis Summary": "y",
            "Risk Score": 4,
            "Compliance Flags": ["Privacy - CRITICAL missing clause"]
        }));
        assert_eq!(result.executive_summary, "y");
        assert_eq!(result.risk_score, 4.0);
        assert_eq!(result.compliance_flags.len(), 1);
        let flag = &result.compliance_flags[0];
        assert_eq!(flag.category, "Privacy");
        assert_eq!(flag.severity, Severity::Critical);
        assert_eq!(flag.description, "CRITICAL missing clause");
    }

    #[test]
    fn research_signature_outranks_contract_signature() {
        // Both families' keys present: the dispatch table's order decides.
        let result = normalize(&json!({"Analysis Summary": "c", "Research Summary": "r"}));
        assert_eq!(result.executive_summary, "r");
        assert_eq!(result.confidence_score, 0.85);
    }

    #[test]
    fn recommendations_key_classifies_as_research() {
        // The Title-Case catch-all belongs to the research family even when
        // nothing else research-shaped is present.
        let result = normalize(&json!({"Recommendations": "File a motion"}));
        assert_eq!(result.confidence_score, 0.85);
        assert_eq!(result.risk_score, 5.0);
        assert_eq!(result.recommended_actions, vec!["File a motion"]);
    }

    #[test]
    fn array_and_envelope_unwrapping_is_sequential() {
        let result = normalize(&json!([
            {"json": {"output": {"Analysis Summary": "nested", "Risk Score": "2.5"}}}
        ]));
        assert_eq!(result.executive_summary, "nested");
        assert_eq!(result.risk_score, 2.5);
    }

    #[test]
    fn empty_array_falls_back() {
        let result = normalize(&json!([]));
        assert_eq!(result.risk_score, 0.0);
        assert!(result.precedent_cases.is_empty());
    }

    #[test]
    fn snake_case_contract_keys_accepted() {
        let result = normalize(&json!({
            "analysis_summary": "s",
            "risk_score": 6,
            "confidence_score": 0.9,
            "processing_time": 12.5
        }));
        assert_eq!(result.executive_summary, "s");
        assert_eq!(result.risk_score, 6.0);
        assert_eq!(result.confidence_score, 0.9);
        assert_eq!(result.processing_time_seconds, 12.5);
    }

    // ── Compliance flag structuring ──

    #[test]
    fn flag_severity_inference() {
        let severities: Vec<Severity> = normalize(&json!({
            "Analysis Summary": "s",
            "Compliance Flags": [
                "GDPR - NON-COMPLIANT data handling",
                "Indemnity - MISSING cap",
                "Insurance - COMPLIANT with policy",
                "Formatting - unusual numbering"
            ]
        }))
        .compliance_flags
        .iter()
        .map(|f| f.severity)
        .collect();
        assert_eq!(
            severities,
            vec![
                Severity::Critical,
                Severity::Warning,
                Severity::Info,
                Severity::Warning
            ]
        );
    }

    #[test]
    fn flag_without_delimiter_keeps_whole_string() {
        let result = normalize(&json!({
            "Analysis Summary": "s",
            "Compliance Flags": ["No governing law clause found"]
        }));
        let flag = &result.compliance_flags[0];
        assert_eq!(flag.category, "No governing law clause found");
        assert_eq!(flag.description, "No governing law clause found");
        assert_eq!(flag.recommendation, "Review and address this compliance issue");
    }

    #[test]
    fn flag_ids_are_positionally_deterministic() {
        let payload = json!({
            "Analysis Summary": "s",
            "Compliance Flags": ["A - one", "B - two", "C - three"]
        });
        let first: Vec<String> = normalize(&payload)
            .compliance_flags
            .into_iter()
            .map(|f| f.id)
            .collect();
        let second: Vec<String> = normalize(&payload)
            .compliance_flags
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(first, vec!["compliance-0", "compliance-1", "compliance-2"]);
        assert_eq!(first, second);
    }

    // ── Clause extraction ──

    #[test]
    fn clause_page_from_section_digits() {
        let result = normalize(&json!({
            "Analysis Summary": "s",
            "Extracted Clauses": [
                {"Clause Type": "Indemnification", "Clause Text": "...", "Section": "Section 14", "Risk Level": "high"},
                {"clause_type": "Termination", "clause_text": "...", "section": "Preamble"}
            ]
        }));
        assert_eq!(result.extracted_clauses.len(), 2);
        assert_eq!(result.extracted_clauses[0].page_number, 14);
        assert_eq!(result.extracted_clauses[0].risk_level, RiskLevel::High);
        assert_eq!(result.extracted_clauses[0].clause_type, "Indemnification");
        assert_eq!(result.extracted_clauses[1].page_number, 1);
        assert_eq!(result.extracted_clauses[1].risk_level, RiskLevel::Medium);
    }

    #[test]
    fn clause_optional_subfields_pass_through() {
        let result = normalize(&json!({
            "Analysis Summary": "s",
            "Extracted Clauses": [{
                "clause_type": "Liability",
                "clause_text": "Cap at fees paid",
                "risk_score": 7.5,
                "key_concerns": "No carve-outs",
                "suggested_language": "Cap at 2x fees"
            }]
        }));
        let clause = &result.extracted_clauses[0];
        assert_eq!(clause.risk_score, Some(7.5));
        assert_eq!(clause.key_concerns.as_deref(), Some("No carve-outs"));
        assert_eq!(clause.suggested_language.as_deref(), Some("Cap at 2x fees"));
    }

    // ── Precedent parsing ──

    #[test]
    fn contract_precedent_splits_name_and_citation() {
        let result = normalize(&json!({
            "Analysis Summary": "s",
            "Precedent Cases": ["Smith v. Jones (123 F.3d 456)", "In re Acme"]
        }));
        let first = &result.precedent_cases[0];
        assert_eq!(first.case_name, "Smith v. Jones");
        assert_eq!(first.citation, "123 F.3d 456");
        assert_eq!(first.relevance_score, 0.8);
        assert_eq!(first.jurisdiction, "Unknown");
        assert_eq!(first.summary, "Relevant precedent: Smith v. Jones (123 F.3d 456)");

        let second = &result.precedent_cases[1];
        assert_eq!(second.case_name, "In re Acme");
        assert_eq!(second.citation, "In re Acme");
        assert_eq!(second.id, "case-1");
    }

    #[test]
    fn empty_parenthetical_is_skipped() {
        assert_eq!(first_parenthetical("a () b (c)"), Some((7, 9)));
        assert_eq!(first_parenthetical("no parens"), None);
        assert_eq!(first_parenthetical("()"), None);
    }

    #[test]
    fn research_case_name_is_citation_before_comma() {
        let result = normalize(&json!({
            "Research Summary": "r",
            "Case Analysis": [{
                "citation": "Roe v. Wade, 410 U.S. 113",
                "Applicability Score": 8,
                "holding": "Landmark holding",
                "authority_level": "BINDING"
            }]
        }));
        let case = &result.precedent_cases[0];
        assert_eq!(case.case_name, "Roe v. Wade");
        assert_eq!(case.citation, "Roe v. Wade, 410 U.S. 113");
        assert_eq!(case.relevance_score, 0.8);
        assert_eq!(case.summary, "Landmark holding");
        assert_eq!(case.jurisdiction, "BINDING");
    }

    #[test]
    fn research_case_defaults_when_citation_absent() {
        let result = normalize(&json!({
            "Research Summary": "r",
            "Case Analysis": [{"Applicability Score": 3}]
        }));
        let case = &result.precedent_cases[0];
        assert_eq!(case.case_name, "Unknown Case");
        assert_eq!(case.citation, "No citation");
        assert_eq!(case.relevance_score, 0.3);
        assert_eq!(case.summary, "No summary available");
    }

    // ── Legislative alerts ──

    #[test]
    fn legislative_alert_synthesizes_single_flag() {
        let result = normalize(&json!({
            "Research Summary": "r",
            "Legislative Alert": {"statute": "GDPR Art. 28", "impact": "processor terms changed"}
        }));
        assert_eq!(result.compliance_flags.len(), 1);
        let flag = &result.compliance_flags[0];
        assert_eq!(flag.id, "legislative-alert");
        assert_eq!(flag.category, "Legislative Update");
        assert_eq!(flag.severity, Severity::Warning);
        assert_eq!(flag.description, "GDPR Art. 28: processor terms changed");
    }

    #[test]
    fn unknown_statute_sentinel_suppresses_flag() {
        let result = normalize(&json!({
            "Research Summary": "r",
            "Legislative Alert": {"statute": "UNKNOWN", "impact": "n/a"}
        }));
        assert!(result.compliance_flags.is_empty());
    }

    #[test]
    fn missing_alert_means_no_flags() {
        let result = normalize(&json!({"Research Summary": "r"}));
        assert!(result.compliance_flags.is_empty());
    }
}
