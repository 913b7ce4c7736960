pub mod decode;
mod fields;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod rows;

pub use decode::{decode_contract_row, decode_research_row, parse_list_field};
pub use filter::{DocumentFilter, RiskBand};
pub use model::{
    AnalysisKind, AnalysisRequest, AnalysisResult, ComplianceFlag, Document, DocumentType,
    ExtractedClause, FileAttachment, PrecedentCase, ProcessingStatus, RiskLevel, Severity,
};
pub use normalize::normalize;
pub use rows::{CONTRACT_TABLE, ContractRow, RESEARCH_TABLE, ResearchRow};
