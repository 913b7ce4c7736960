//! Client-side filtering over decoded documents.
//!
//! Pure predicates only; the list itself is owned elsewhere and replaced
//! wholesale on refresh.

use serde::{Deserialize, Serialize};

use crate::model::{Document, DocumentType};

/// Risk band derived from a numeric risk score with fixed thresholds:
/// ≤3 low, (3, 6] medium, >6 high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score <= 3.0 {
            Self::Low
        } else if score <= 6.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for RiskBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown risk band: {other}")),
        }
    }
}

/// Filter over the decoded document list. `None` fields mean "all".
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Case-insensitive substring over document id, client name, and client
    /// email; a hit on any one includes the document.
    pub search: Option<String>,
    pub document_type: Option<DocumentType>,
    /// Documents without results never match a specific band: there is no
    /// score to compare.
    pub risk_band: Option<RiskBand>,
}

impl DocumentFilter {
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(query) = self.search.as_deref()
            && !query.is_empty()
        {
            let query = query.to_lowercase();
            let hit = doc.document_id.to_lowercase().contains(&query)
                || doc.client_name.to_lowercase().contains(&query)
                || doc.client_email.to_lowercase().contains(&query);
            if !hit {
                return false;
            }
        }

        if let Some(kind) = self.document_type
            && doc.document_type != kind
        {
            return false;
        }

        if let Some(band) = self.risk_band {
            match &doc.results {
                Some(results) => {
                    if RiskBand::from_score(results.risk_score) != band {
                        return false;
                    }
                }
                None => return false,
            }
        }

        true
    }

    pub fn apply<'a>(&self, docs: &'a [Document]) -> Vec<&'a Document> {
        docs.iter().filter(|doc| self.matches(doc)).collect()
    }
}
