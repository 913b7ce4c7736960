//! HTTP client for the analysis workflow's inbound webhook.
//!
//! Submission is fire-and-forget: the workflow answers the POST once it has
//! accepted the document, and the actual results land in the backing tables
//! minutes later. Nothing here waits for or parses an analysis payload.

use docket_core::model::{AnalysisKind, AnalysisRequest};
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("workflow returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for the workflow webhook endpoint.
pub struct WebhookClient {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookClient {
    /// Create a client for the given webhook endpoint URL.
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a document for analysis as a multipart form.
    ///
    /// A non-2xx response surfaces the response body text as the failure
    /// detail; the caller owns user notification.
    pub async fn submit(&self, request: &AnalysisRequest) -> Result<(), SubmitError> {
        let mut form = Form::new()
            .text("document_id", request.document_id.clone())
            .text("document_type", request.document_type.webhook_label())
            .text("client_name", request.client_name.clone())
            .text("client_email", request.client_email.clone())
            .text("analysis_type", encode_kinds(&request.analysis_kinds)?);

        if let Some(case_id) = &request.case_id {
            form = form.text("case_id", case_id.clone());
        }
        if let Some(jurisdiction) = &request.jurisdiction {
            form = form.text("jurisdiction", jurisdiction.clone());
        }
        if let Some(file) = &request.file {
            form = form.part(
                "file",
                Part::bytes(file.bytes.clone()).file_name(file.file_name.clone()),
            );
        }
        if let Some(file_url) = &request.file_url {
            form = form.text("file_url", file_url.clone());
        }

        info!(
            url = %self.webhook_url,
            document_id = %request.document_id,
            document_type = request.document_type.as_str(),
            "submitting document for analysis"
        );
        let resp = self
            .client
            .post(&self.webhook_url)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SubmitError::Server {
                status: status.as_u16(),
                body,
            });
        }

        info!(status = status.as_u16(), "submission accepted");
        Ok(())
    }
}

/// JSON-encoded array of kind strings, the shape the workflow expects for
/// the `analysis_type` form field.
fn encode_kinds(kinds: &[AnalysisKind]) -> Result<String, SubmitError> {
    let labels: Vec<&str> = kinds.iter().map(AnalysisKind::as_str).collect();
    Ok(serde_json::to_string(&labels)?)
}
