//! DuckDB-backed store for the two analysis tables.
//!
//! Supports both in-memory (ephemeral) and persistent (file-backed) modes.
//! Use [`open`](DuckStore::open) for in-memory and
//! [`open_persistent`](DuckStore::open_persistent) for storage that survives
//! across process restarts. Change events are emitted for mutations made
//! through this handle; external writers are invisible to the feed.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use duckdb::{Connection, params};
use tokio::sync::broadcast;
use tracing::info;

use docket_core::rows::{ContractRow, ResearchRow};

use crate::StoreError;
use crate::store::{ChangeEvent, ChangeFeed, DocumentStore, StoreTable};

const CONTRACT_COLUMNS: &str = "id, client_name, client_email, document_type, jurisdiction, \
     comparable_firm_cases, confidence_score, recommendations, risk_level, precedent_cases, \
     analysis_summary, executive_summary, compliance_flags, extracted_clauses, created_at";

const RESEARCH_COLUMNS: &str = "id, client_name, client_email, document_type, jurisdiction, \
     created_at, research_summary, recommendations, applicability_score";

pub struct DuckStore {
    conn: Mutex<Connection>,
    feed: ChangeFeed,
}

impl DuckStore {
    /// Open an in-memory DuckDB database with both tables created.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS contract_analysis (
                id VARCHAR PRIMARY KEY,
                client_name VARCHAR,
                client_email VARCHAR,
                document_type VARCHAR,
                jurisdiction VARCHAR,
                comparable_firm_cases VARCHAR,
                confidence_score VARCHAR,
                recommendations VARCHAR,
                risk_level VARCHAR,
                precedent_cases VARCHAR,
                analysis_summary VARCHAR,
                executive_summary VARCHAR,
                compliance_flags VARCHAR,
                extracted_clauses VARCHAR,
                created_at VARCHAR
            );
            CREATE TABLE IF NOT EXISTS legal_research (
                id BIGINT PRIMARY KEY,
                client_name VARCHAR,
                client_email VARCHAR,
                document_type VARCHAR,
                jurisdiction VARCHAR,
                created_at VARCHAR NOT NULL,
                research_summary VARCHAR,
                recommendations VARCHAR,
                applicability_score DOUBLE
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            feed: ChangeFeed::new(),
        })
    }

    /// Insert a contract-analysis row and notify subscribers.
    pub fn insert_contract(&self, row: &ContractRow) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("connection lock poisoned");
        let sql = format!(
            "INSERT INTO contract_analysis ({CONTRACT_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        conn.execute(
            &sql,
            params![
                row.id,
                row.client_name,
                row.client_email,
                row.document_type,
                row.jurisdiction,
                row.comparable_firm_cases,
                row.confidence_score,
                row.recommendations,
                row.risk_level,
                row.precedent_cases,
                row.analysis_summary,
                row.executive_summary,
                row.compliance_flags,
                row.extracted_clauses,
                row.created_at,
            ],
        )?;
        drop(conn);
        self.feed.notify(StoreTable::ContractAnalysis);
        Ok(())
    }

    /// Insert a legal-research row and notify subscribers.
    pub fn insert_research(&self, row: &ResearchRow) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("connection lock poisoned");
        let sql = format!(
            "INSERT INTO legal_research ({RESEARCH_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        conn.execute(
            &sql,
            params![
                row.id,
                row.client_name,
                row.client_email,
                row.document_type,
                row.jurisdiction,
                row.created_at,
                row.research_summary,
                row.recommendations,
                row.applicability_score,
            ],
        )?;
        drop(conn);
        self.feed.notify(StoreTable::LegalResearch);
        Ok(())
    }

    /// Number of rows in the contract-analysis table.
    pub fn contract_count(&self) -> Result<usize, StoreError> {
        self.count_table("contract_analysis")
    }

    /// Number of rows in the legal-research table.
    pub fn research_count(&self) -> Result<usize, StoreError> {
        self.count_table("legal_research")
    }

    fn count_table(&self, table: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().expect("connection lock poisoned");
        let sql = format!("SELECT count(*) FROM {table}");
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl DocumentStore for DuckStore {
    async fn contract_rows(&self) -> Result<Vec<ContractRow>, StoreError> {
        let conn = self.conn.lock().expect("connection lock poisoned");
        let sql = format!(
            "SELECT {CONTRACT_COLUMNS} FROM contract_analysis ORDER BY created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(ContractRow {
                id: row.get(0)?,
                client_name: row.get(1)?,
                client_email: row.get(2)?,
                document_type: row.get(3)?,
                jurisdiction: row.get(4)?,
                comparable_firm_cases: row.get(5)?,
                confidence_score: row.get(6)?,
                recommendations: row.get(7)?,
                risk_level: row.get(8)?,
                precedent_cases: row.get(9)?,
                analysis_summary: row.get(10)?,
                executive_summary: row.get(11)?,
                compliance_flags: row.get(12)?,
                extracted_clauses: row.get(13)?,
                created_at: row.get(14)?,
            })
        })?;
        let rows: Result<Vec<_>, _> = rows.collect();
        let rows = rows?;
        info!(count = rows.len(), "fetched contract_analysis rows");
        Ok(rows)
    }

    async fn research_rows(&self) -> Result<Vec<ResearchRow>, StoreError> {
        let conn = self.conn.lock().expect("connection lock poisoned");
        let sql = format!("SELECT {RESEARCH_COLUMNS} FROM legal_research ORDER BY created_at DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(ResearchRow {
                id: row.get(0)?,
                client_name: row.get(1)?,
                client_email: row.get(2)?,
                document_type: row.get(3)?,
                jurisdiction: row.get(4)?,
                created_at: row.get(5)?,
                research_summary: row.get(6)?,
                recommendations: row.get(7)?,
                applicability_score: row.get(8)?,
            })
        })?;
        let rows: Result<Vec<_>, _> = rows.collect();
        let rows = rows?;
        info!(count = rows.len(), "fetched legal_research rows");
        Ok(rows)
    }

    async fn delete(&self, table: StoreTable, id: &str) -> Result<(), StoreError> {
        let affected = {
            let conn = self.conn.lock().expect("connection lock poisoned");
            match table {
                StoreTable::ContractAnalysis => conn.execute(
                    "DELETE FROM contract_analysis WHERE id = ?",
                    params![id],
                )?,
                StoreTable::LegalResearch => {
                    let numeric: i64 = id
                        .parse()
                        .map_err(|_| StoreError::NotFound(id.to_string()))?;
                    conn.execute("DELETE FROM legal_research WHERE id = ?", params![numeric])?
                }
            }
        };
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.feed.notify(table);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe()
    }
}
